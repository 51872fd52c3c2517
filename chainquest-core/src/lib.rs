#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod processors;
pub mod rules;
pub mod store;
pub mod utils;

pub use error::EngineError;
pub use store::MemoryStore;
