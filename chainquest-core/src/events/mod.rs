//! Event system.
//!
//! # Event Flow
//!
//! 1. A verified webhook payload becomes an [`Event`] ([`ingress`])
//! 2. `ProgressionEngine` evaluates it and commits one transition
//! 3. The engine emits [`Notification`]s on a broadcast channel
//! 4. `NotificationLogger` (and any other subscriber) consumes them
//!
//! Every state-changing event is applied at most once, keyed by its id.

pub mod channels;
pub mod ingress;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, NotificationReceiver, NotificationSender, notification_channel,
};
pub use ingress::{
    IngressError, IntoEvent, choose_event_id, is_player_address, normalize_address,
};
pub use types::{Event, EventKind, EventPayload, Notification, TournamentEvent};
