//! Time normalizer — turns flexible user-typed date/time text into an
//! absolute UTC instant, and formats instants back for display.
//!
//! All input is interpreted in a fixed local offset (JST in the reference
//! deployment); storage is always UTC.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};

use chime_core::error::{ChimeError, Result};

/// Full date+time patterns, tried in this order. First match wins.
const DATETIME_PATTERNS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M"];
/// Display layout; parseable back via the second entry above, so
/// `parse(format(t))` round-trips to the same minute.
const DISPLAY_PATTERN: &str = "%Y-%m-%d %H:%M";

/// Parse `text` into a UTC instant, resolving missing components against
/// `now` in the given local `offset`.
///
/// Accepted, in priority order:
/// 1. `%Y-%m-%dT%H:%M`
/// 2. `%Y-%m-%d %H:%M`
/// 3. `%Y/%m/%d %H:%M`
/// 4. `%m/%d %H:%M` — year defaults to the current local year
/// 5. `<N>s` / `<N>m` / `<N>h` — relative duration from `now`
/// 6. `%H:%M` — today in the local offset; an instant at or before `now`
///    rolls to tomorrow
pub fn parse(text: &str, now: DateTime<Utc>, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let text = text.trim();
    let local_now = now.with_timezone(&offset);

    for pattern in DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return localize(naive, offset, text);
        }
    }

    // %m/%d %H:%M — prepend the current local year and reuse the slash
    // pattern.
    let with_year = format!("{}/{}", local_now.year(), text);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&with_year, "%Y/%m/%d %H:%M") {
        return localize(naive, offset, text);
    }

    // Relative durations ("10m", "2h", "30s") become an absolute instant
    // anchored to now.
    if let Some(delta) = parse_relative(text) {
        return Ok(now + delta);
    }

    // Bare %H:%M — today, rolling to tomorrow once passed. "Now" counts as
    // already passed.
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M") {
        let today = localize(local_now.date_naive().and_time(time), offset, text)?;
        return Ok(if today <= now {
            today + Duration::days(1)
        } else {
            today
        });
    }

    Err(ChimeError::InvalidTimeFormat {
        input: text.to_string(),
    })
}

/// `<N><unit>` with unit `s`/`m`/`h` and a positive integer count.
fn parse_relative(text: &str) -> Option<Duration> {
    let (digits, to_duration): (&str, fn(i64) -> Duration) =
        if let Some(d) = text.strip_suffix('s') {
            (d, Duration::seconds)
        } else if let Some(d) = text.strip_suffix('m') {
            (d, Duration::minutes)
        } else if let Some(d) = text.strip_suffix('h') {
            (d, Duration::hours)
        } else {
            return None;
        };
    // Bounded so the Duration constructors cannot overflow.
    let count: i64 = digits.parse().ok().filter(|n| (1..=1_000_000).contains(n))?;
    Some(to_duration(count))
}

/// Strict `HH:MM` time-of-day, used by weekly recurrence creation.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| ChimeError::InvalidTimeFormat {
        input: text.trim().to_string(),
    })
}

/// Render an instant in the local offset with the fixed display layout.
pub fn format(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(DISPLAY_PATTERN)
        .to_string()
}

fn localize(naive: NaiveDateTime, offset: FixedOffset, original: &str) -> Result<DateTime<Utc>> {
    naive
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ChimeError::InvalidTimeFormat {
            input: original.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    /// 2026-08-27 12:00 JST == 03:00 UTC.
    fn noon_jst() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 3, 0, 0).unwrap()
    }

    fn parse_at_noon(text: &str) -> DateTime<Utc> {
        parse(text, noon_jst(), jst()).unwrap()
    }

    #[test]
    fn full_datetime_with_t_separator() {
        let dt = parse_at_noon("2026-11-08T09:30");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 11, 8, 0, 30, 0).unwrap());
    }

    #[test]
    fn full_datetime_with_space_separator() {
        let dt = parse_at_noon("2026-11-08 09:30");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 11, 8, 0, 30, 0).unwrap());
    }

    #[test]
    fn slash_delimited_datetime() {
        let dt = parse_at_noon("2026/11/08 09:30");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 11, 8, 0, 30, 0).unwrap());
    }

    #[test]
    fn month_day_defaults_to_current_local_year() {
        let dt = parse_at_noon("11/08 09:30");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 11, 8, 0, 30, 0).unwrap());
    }

    #[test]
    fn bare_time_later_today_stays_today() {
        // Local now is 12:00; 23:00 JST == 14:00 UTC the same day.
        let dt = parse_at_noon("23:00");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 8, 27, 14, 0, 0).unwrap());
    }

    #[test]
    fn bare_time_already_passed_rolls_to_tomorrow() {
        let dt = parse_at_noon("09:00");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 8, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn bare_time_equal_to_now_rolls_to_tomorrow() {
        // Exactly "now" counts as already passed.
        let dt = parse_at_noon("12:00");
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 8, 28, 3, 0, 0).unwrap());
    }

    #[test]
    fn relative_duration_is_anchored_to_now() {
        assert_eq!(parse_at_noon("30s"), noon_jst() + Duration::seconds(30));
        assert_eq!(parse_at_noon("10m"), noon_jst() + Duration::minutes(10));
        assert_eq!(parse_at_noon("2h"), noon_jst() + Duration::hours(2));
    }

    #[test]
    fn relative_duration_rejects_nonpositive_and_unknown_units() {
        for text in ["0m", "-5m", "10d", "m", "2.5h"] {
            assert!(
                parse(text, noon_jst(), jst()).is_err(),
                "{text} should not parse"
            );
        }
    }

    #[test]
    fn relative_duration_round_trips_to_same_minute() {
        for text in ["10m", "2h", "90m"] {
            let instant = parse_at_noon(text);
            let rendered = format(instant, jst());
            let reparsed = parse(&rendered, noon_jst(), jst()).unwrap();
            assert_eq!(reparsed.timestamp() / 60, instant.timestamp() / 60);
        }
    }

    #[test]
    fn unparseable_input_is_echoed_back() {
        let err = parse("next tuesday-ish", noon_jst(), jst()).unwrap_err();
        match err {
            ChimeError::InvalidTimeFormat { input } => assert_eq!(input, "next tuesday-ish"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            parse("nope", noon_jst(), jst()).unwrap_err().code(),
            "INVALID_TIME_FORMAT"
        );
    }

    #[test]
    fn parse_format_round_trips_to_same_minute() {
        for text in [
            "2026-11-08T09:30",
            "2026-11-08 09:30",
            "2026/11/08 09:30",
            "11/08 09:30",
            "23:00",
        ] {
            let instant = parse_at_noon(text);
            let rendered = format(instant, jst());
            assert_eq!(parse(&rendered, noon_jst(), jst()).unwrap(), instant);
        }
    }

    #[test]
    fn time_of_day_accepts_only_hh_mm() {
        assert_eq!(
            parse_time_of_day("14:30").unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
        assert!(parse_time_of_day("2:3:4").is_err());
        assert!(parse_time_of_day("half past two").is_err());
    }
}
