//! `chime-store` — durable reminder storage over SQLite.
//!
//! Reminders are rows in a single `reminders` table. All mutations are
//! single-statement atomic updates, so the store is safe to share between
//! the scheduling loop and concurrent lifecycle (create/list/cancel) calls.
//! Rows that fail to decode are skipped with a warning rather than aborting
//! a scan: a corrupt record must never stop the remaining reminders from
//! firing.

pub mod db;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::ReminderStore;
