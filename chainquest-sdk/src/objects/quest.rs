//! Quest request and response types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestKind {
    Daily,
    Weekly,
    Achievement,
}

/// Fixed reward of a quest template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestReward {
    pub tokens: u64,
    pub xp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTemplateView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward: QuestReward,
    #[serde(rename = "type")]
    pub kind: QuestKind,
}

/// A quest offered to a player for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward: QuestReward,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub progress: u32,
    pub target: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuestsResponse {
    pub player: String,
    pub quests: Vec<DailyQuest>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Result of a processed quest-completed webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletionResult {
    pub quest_id: String,
    pub quest_name: String,
    pub player: String,
    pub rewards: QuestReward,
    /// Quests unlocked by this completion.
    pub unlocked: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

/// Body of `POST /api/quests/complete`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuestRequest {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub quest_id: Option<String>,
}
