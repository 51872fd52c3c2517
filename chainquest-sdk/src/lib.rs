//! Shared types for ChainQuest: wire objects, the Kwala webhook signature
//! scheme, and (with the `client` feature) HTTP clients.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
