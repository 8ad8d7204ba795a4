use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a fired reminder is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// The owner's private inbox, resolved at delivery time.
    DirectMessage,
    /// A shared channel; `mention_target` (e.g. a role handle) is prepended
    /// to the outbound message when set.
    Channel {
        channel_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mention_target: Option<String>,
    },
}

impl Destination {
    /// Channel destinations are validated against the platform at creation;
    /// DM inboxes only at delivery time.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Destination::DirectMessage => None,
            Destination::Channel { channel_id, .. } => Some(channel_id),
        }
    }
}

/// How often a reminder fires after its first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Fire once, then retire.
    #[default]
    None,
    /// Fire every 24 hours, anchored to the instant that just fired.
    Daily,
    /// Fire on a specific weekday (0 = Monday … 6 = Sunday) at the same
    /// local time-of-day.
    Weekly { day: u8 },
    /// Fire on the same local day-of-month, clamped to the last valid day
    /// of shorter months.
    Monthly,
}

impl Recurrence {
    pub fn is_none(&self) -> bool {
        matches!(self, Recurrence::None)
    }
}

/// A persisted reminder record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// UUID v4 string — primary key, never reused.
    pub id: String,
    /// Identity of the requester. Immutable after creation.
    pub owner_id: String,
    /// Delivery target. Immutable after creation.
    pub destination: Destination,
    /// Next firing instant (UTC). Advanced only by the recurrence
    /// calculator, never mutated directly.
    pub due_at: DateTime<Utc>,
    /// Free-form payload text. Immutable after creation.
    pub message: String,
    pub recurrence: Recurrence,
    /// Soft-delete flag; a deleted reminder is excluded from every scan and
    /// listing but kept in storage for audit.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input to `ReminderStore::create` — everything except the store-assigned
/// id and bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub owner_id: String,
    pub destination: Destination,
    pub due_at: DateTime<Utc>,
    pub message: String,
    pub recurrence: Recurrence,
}

/// A fully-resolved creation request as handed over by the command front
/// end. Multi-step UI flows are the front end's concern; by the time a
/// request reaches the engine the destination and recurrence are final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub owner_id: String,
    /// Raw user-typed time text, e.g. `"2026-11-08T09:30"` or `"14:00"`.
    pub raw_time_text: String,
    pub message: String,
    pub destination: Destination,
    #[serde(default)]
    pub recurrence: Recurrence,
}
