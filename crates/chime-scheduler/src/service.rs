//! Reminder lifecycle service — the create/list/cancel surface consumed by
//! the command front end.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use tracing::info;

use chime_core::config::ChimeConfig;
use chime_core::error::{ChimeError, Result};
use chime_core::types::{NewReminder, Recurrence, Reminder, ReminderRequest};
use chime_store::ReminderStore;

use crate::port::ChatPort;
use crate::{recurrence, timeparse};

pub struct ReminderService {
    store: ReminderStore,
    port: Arc<dyn ChatPort>,
    offset: FixedOffset,
}

impl ReminderService {
    pub fn new(store: ReminderStore, port: Arc<dyn ChatPort>, config: &ChimeConfig) -> Self {
        Self {
            store,
            port,
            offset: config.time.offset(),
        }
    }

    /// Validate and persist a new reminder.
    ///
    /// Channel destinations are resolved against the platform here, so an
    /// unreachable channel is surfaced to the requester immediately; DM
    /// inboxes are only resolved at delivery time. Weekly recurrence takes
    /// a bare `HH:MM` time-of-day; everything else goes through the full
    /// time normalizer.
    pub async fn create(&self, request: ReminderRequest) -> Result<Reminder> {
        if request.message.trim().is_empty() {
            return Err(ChimeError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        if let Some(channel_id) = request.destination.channel_id() {
            self.port
                .resolve_channel(channel_id)
                .await
                .map_err(|_| ChimeError::DestinationUnresolvable {
                    target: channel_id.to_string(),
                })?;
        }

        let now = Utc::now();
        let due_at = match request.recurrence {
            Recurrence::Weekly { day } => {
                if day > 6 {
                    return Err(ChimeError::InvalidRequest(format!(
                        "weekday must be 0-6 (Monday-Sunday), got {day}"
                    )));
                }
                let time_of_day = timeparse::parse_time_of_day(&request.raw_time_text)?;
                recurrence::first_weekly(day, time_of_day, now, self.offset).ok_or_else(|| {
                    ChimeError::InvalidRequest(
                        "could not compute first weekly occurrence".to_string(),
                    )
                })?
            }
            _ => timeparse::parse(&request.raw_time_text, now, self.offset)?,
        };

        let reminder = self.store.create(NewReminder {
            owner_id: request.owner_id,
            destination: request.destination,
            due_at,
            message: request.message,
            recurrence: request.recurrence,
        })?;

        info!(
            reminder_id = %reminder.id,
            owner_id = %reminder.owner_id,
            due_at = %reminder.due_at,
            "reminder scheduled"
        );
        Ok(reminder)
    }

    /// The owner's active reminders, soonest first.
    pub fn list(&self, owner_id: &str) -> Result<Vec<Reminder>> {
        Ok(self.store.list_active(owner_id)?)
    }

    /// Cancel by id. Ownership is enforced in the store's conditional
    /// update, so of two concurrent cancels exactly one returns `true`.
    /// `false` for not-found/already-cancelled is a normal outcome, not an
    /// error.
    pub fn cancel(&self, owner_id: &str, id: &str) -> Result<bool> {
        let cancelled = self.store.soft_delete(id, owner_id)?;
        if cancelled {
            info!(reminder_id = %id, owner_id = %owner_id, "reminder cancelled");
        }
        Ok(cancelled)
    }
}
