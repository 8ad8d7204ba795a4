//! `chime-core` — shared types, errors, and configuration for the Chime
//! reminder engine.
//!
//! Everything here is platform-agnostic: the chat platform itself (Discord,
//! Slack, …) lives behind the `ChatPort` trait in `chime-scheduler`.

pub mod config;
pub mod error;
pub mod types;

pub use config::ChimeConfig;
pub use error::{ChimeError, Result};
pub use types::{Destination, NewReminder, Recurrence, Reminder, ReminderRequest};
