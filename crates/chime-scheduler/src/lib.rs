//! `chime-scheduler` — reminder scheduling and delivery engine.
//!
//! # Overview
//!
//! Reminders are persisted through [`chime_store::ReminderStore`]. The
//! [`engine::SchedulerEngine`] polls the store on a fixed tick (30 s by
//! default) and hands every due reminder to the [`dispatch::Dispatcher`],
//! which resolves the destination through the [`port::ChatPort`] boundary
//! and sends. One-shot reminders are retired after a successful delivery;
//! recurring ones are rescheduled to their next occurrence. A failed
//! delivery leaves the reminder active so the next tick retries it.
//!
//! # Recurrence variants
//!
//! | Variant   | Behaviour                                                 |
//! |-----------|-----------------------------------------------------------|
//! | `None`    | Single fire, then retired                                 |
//! | `Daily`   | Next fire is exactly 24 h after the fire that just ran    |
//! | `Weekly`  | Next local date matching the weekday, strictly after now  |
//! | `Monthly` | Local month + 1, day clamped to the target month's length |

pub mod dispatch;
pub mod engine;
pub mod port;
pub mod recurrence;
pub mod service;
pub mod timeparse;

pub use dispatch::{DeliveryOutcome, Dispatcher};
pub use engine::SchedulerEngine;
pub use port::{ChatPort, PortError, SendTarget};
pub use service::ReminderService;
