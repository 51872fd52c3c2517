//! Player ledger views.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Item;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardGrantView {
    pub recipient: String,
    pub tokens: u64,
    pub items: Vec<Item>,
    pub cause_event_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub granted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletionView {
    pub quest_id: String,
    pub xp: u64,
    pub event_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

/// Everything the ledger holds for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub address: String,
    pub wins: u32,
    pub losses: u32,
    pub prize_tokens: u64,
    pub quests_completed: u32,
    pub quest_xp: u64,
    pub achievements: Vec<String>,
    pub rewards: Vec<RewardGrantView>,
    pub quests: Vec<QuestCompletionView>,
}
