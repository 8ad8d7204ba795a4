use chrono::{FixedOffset, Offset, Utc};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// How often the scheduling loop scans for due reminders.
pub const DEFAULT_TICK_SECS: u64 = 30;
/// Upper bound on a single delivery attempt, so one unreachable destination
/// cannot stall the whole tick.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;
/// Display/parse timezone of the reference deployment (JST).
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = 9;

/// Top-level config (chime.toml + CHIME_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub time: TimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            delivery_timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

/// Fixed local offset used for parsing ambiguous time text and for display
/// formatting. Stored instants are always UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl TimeConfig {
    /// Offset as a chrono type. An out-of-range configured value falls back
    /// to UTC rather than panicking.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(i32::from(self.utc_offset_hours) * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}
fn default_delivery_timeout_secs() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_SECS
}
fn default_utc_offset_hours() -> i8 {
    DEFAULT_UTC_OFFSET_HOURS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chime/chime.db", home)
}

impl ChimeConfig {
    /// Load config from a TOML file with CHIME_* env var overrides.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ChimeConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CHIME_").split("_"))
            .extract()
            .map_err(|e| crate::error::ChimeError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chime/chime.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = ChimeConfig::default();
        assert_eq!(cfg.scheduler.tick_secs, 30);
        assert_eq!(cfg.time.utc_offset_hours, 9);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let time = TimeConfig {
            utc_offset_hours: 127,
        };
        assert_eq!(time.offset().local_minus_utc(), 0);
    }
}
