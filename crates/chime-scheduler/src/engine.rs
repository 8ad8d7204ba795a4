//! Scheduling loop — a single perpetual timer that scans the store for due
//! reminders and drives delivery.
//!
//! Nothing in a tick is fatal: a failed store read degrades to an empty
//! tick, a failed delivery leaves the reminder active for the next tick,
//! and a failed store write is re-derived on the next scan because the due
//! query is idempotent over unmodified records.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use chime_core::config::ChimeConfig;
use chime_core::types::Reminder;
use chime_store::ReminderStore;

use crate::dispatch::{DeliveryOutcome, Dispatcher};
use crate::port::ChatPort;
use crate::recurrence;

/// Tick-driven reminder engine. One instance per store; see DESIGN.md for
/// the multi-instance caveat.
pub struct SchedulerEngine {
    store: ReminderStore,
    dispatcher: Dispatcher,
    offset: FixedOffset,
    tick_interval: Duration,
}

impl SchedulerEngine {
    pub fn new(store: ReminderStore, port: Arc<dyn ChatPort>, config: &ChimeConfig) -> Self {
        let offset = config.time.offset();
        Self {
            dispatcher: Dispatcher::new(
                port,
                offset,
                Duration::from_secs(config.scheduler.delivery_timeout_secs),
            ),
            store,
            offset,
            tick_interval: Duration::from_secs(config.scheduler.tick_secs),
        }
    }

    /// Main loop. Scans every tick interval until `shutdown` broadcasts
    /// `true`; an in-flight tick completes before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_secs = self.tick_interval.as_secs(),
            "scheduler engine started"
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(Utc::now()).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One due-scan pass at the captured instant `now`. `run` calls this on
    /// every interval tick; it is public so embedders and tests can drive
    /// ticks manually.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let due = match self.store.due_before(now) {
            Ok(due) => due,
            Err(e) => {
                // Degrade to an empty tick; the same records are re-scanned
                // next time.
                warn!(error = %e, "due scan failed, skipping tick");
                return;
            }
        };
        if due.is_empty() {
            return;
        }

        debug!(count = due.len(), "processing due reminders");
        for reminder in due {
            self.process(reminder, now).await;
        }
    }

    /// Dispatch one due reminder and persist its outcome. Failures are
    /// reminder-local.
    async fn process(&self, reminder: Reminder, now: DateTime<Utc>) {
        match self.dispatcher.deliver(&reminder).await {
            DeliveryOutcome::Delivered => self.advance(&reminder, now),
            DeliveryOutcome::Failed(_) => {
                // Leave the record active: it re-enters the due set every
                // tick until it succeeds or the owner cancels. Eventual
                // delivery is preferred over at-most-once here.
                debug!(reminder_id = %reminder.id, "reminder left active for retry");
            }
        }
    }

    /// After a successful delivery: reschedule recurring reminders,
    /// retire one-shots.
    fn advance(&self, reminder: &Reminder, now: DateTime<Utc>) {
        let next = recurrence::next_occurrence(&reminder.recurrence, reminder.due_at, now, self.offset);

        match next {
            Some(next_due) => match self.store.reschedule(&reminder.id, next_due) {
                Ok(true) => {
                    info!(reminder_id = %reminder.id, next_due = %next_due, "recurring reminder rescheduled");
                }
                Ok(false) => {
                    debug!(reminder_id = %reminder.id, "reminder cancelled mid-tick, not rescheduled");
                }
                Err(e) => {
                    warn!(reminder_id = %reminder.id, error = %e, "reschedule write failed, will re-derive next tick");
                }
            },
            None => {
                if !reminder.recurrence.is_none() {
                    // Calendar arithmetic had no representable result;
                    // retiring beats refiring every tick forever.
                    error!(reminder_id = %reminder.id, "no next occurrence computable, retiring");
                }
                match self.store.retire(&reminder.id) {
                    Ok(_) => {
                        info!(reminder_id = %reminder.id, "reminder retired after delivery");
                    }
                    Err(e) => {
                        warn!(reminder_id = %reminder.id, error = %e, "retire write failed, will re-deliver next tick");
                    }
                }
            }
        }
    }
}
