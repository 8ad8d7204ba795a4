//! Delivery dispatcher — resolves a reminder's destination, builds the
//! outbound text, and sends it through the [`ChatPort`].
//!
//! Every failure (unresolvable destination, send error, timeout) is
//! classified into [`DeliveryOutcome::Failed`] and never propagated: a
//! broken destination is reminder-local and must not abort the tick for
//! the other reminders due in it.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use tracing::{debug, info, warn};

use chime_core::types::{Destination, Reminder};

use crate::port::{ChatPort, PortError};
use crate::timeparse;

/// Classification of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

pub struct Dispatcher {
    port: Arc<dyn ChatPort>,
    /// Local offset used for the human-readable due time in the message.
    offset: FixedOffset,
    /// Upper bound per attempt so one dead destination cannot stall a tick.
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(port: Arc<dyn ChatPort>, offset: FixedOffset, timeout: Duration) -> Self {
        Self {
            port,
            offset,
            timeout,
        }
    }

    /// Attempt delivery of one fired reminder.
    pub async fn deliver(&self, reminder: &Reminder) -> DeliveryOutcome {
        debug!(reminder_id = %reminder.id, "dispatching reminder");

        let outcome = match tokio::time::timeout(self.timeout, self.attempt(reminder)).await {
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
            Err(_) => DeliveryOutcome::Failed(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            )),
        };

        match &outcome {
            DeliveryOutcome::Delivered => {
                info!(reminder_id = %reminder.id, "reminder delivered");
            }
            DeliveryOutcome::Failed(reason) => {
                warn!(reminder_id = %reminder.id, %reason, "reminder delivery FAILED");
            }
        }
        outcome
    }

    async fn attempt(&self, reminder: &Reminder) -> Result<(), PortError> {
        let target = match &reminder.destination {
            Destination::DirectMessage => {
                self.port.resolve_user_inbox(&reminder.owner_id).await?
            }
            Destination::Channel { channel_id, .. } => {
                self.port.resolve_channel(channel_id).await?
            }
        };
        let text = compose(reminder, self.offset);
        self.port.send(&target, &text).await
    }
}

/// Outbound text: optional mention prefix, bell line with the payload, and
/// the display-formatted due time.
fn compose(reminder: &Reminder, offset: FixedOffset) -> String {
    let when = timeparse::format(reminder.due_at, offset);
    let body = format!("\u{1f514} {}\n\u{1f552} {}", reminder.message, when);
    match &reminder.destination {
        Destination::Channel {
            mention_target: Some(mention),
            ..
        } => format!("{mention}\n{body}"),
        _ => body,
    }
}
