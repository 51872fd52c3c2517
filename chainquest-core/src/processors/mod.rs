//! Processors of the event-driven core.
//!
//! - `ProgressionEngine`: Receives `Event`, commits transitions, emits `Notification`
//! - `NotificationLogger`: Receives `Notification`, logs it

pub mod engine;
pub mod notification_logger;

pub use engine::{EventOutcome, ProgressionEngine};
pub use notification_logger::NotificationLogger;
