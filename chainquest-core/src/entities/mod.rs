//! Stored entities and the store queries that read and write them.

pub mod character;
pub mod ledger;
pub mod player;
pub mod quest;
pub mod reward;
pub mod tournament;
