//! Webhook payload types delivered by the Kwala workflow service.
//!
//! Every payload may carry an `eventId`. When it is absent the server falls
//! back to the `x-kwala-event-id` header, then to a digest of the raw body.

use serde::{Deserialize, Deserializer, Serialize};

use super::ResponseStatus;

/// Accepts ids sent either as JSON strings or as JSON integers
/// (token ids frequently arrive as numbers).
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => Ok(s),
        Raw::Int(n) => Ok(n.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub player: String,
    pub quest_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionCheckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub token_id: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub token_id: String,
    pub owner: String,
    pub old_level: u32,
    pub new_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentCreatedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub tournament_id: String,
    #[serde(rename = "type")]
    pub tournament_type: String,
    /// Overrides the tournament type's default pool when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize_pool: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResultPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub battle_id: String,
    pub winner: String,
    pub loser: String,
    #[serde(deserialize_with = "string_or_number")]
    pub tournament_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentCompletedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub tournament_id: String,
    /// Finishing order, first place first.
    pub winners: Vec<String>,
    /// Falls back to the tournament's prize pool when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_prizes: Option<u64>,
}

/// NFT transfer notification. Logged, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftActivityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<serde_json::Value>,
}

/// Acknowledgement returned to the webhook sender.
///
/// A replayed event id is acknowledged with `processed: false` and
/// `duplicate: true` so the sender stops retrying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck<T> {
    pub status: ResponseStatus,
    pub processed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> WebhookAck<T> {
    pub fn processed(event_id: String, result: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            processed: true,
            duplicate: false,
            event_id,
            result: Some(result),
        }
    }

    pub fn duplicate(event_id: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            processed: false,
            duplicate: true,
            event_id,
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_token_id() {
        let payload: EvolutionPayload = serde_json::from_str(
            r#"{"tokenId":42,"owner":"0xabc","oldLevel":1,"newLevel":2,"chain":"polygon"}"#,
        )
        .unwrap();
        assert_eq!(payload.token_id, "42");
        assert_eq!(payload.event_id, None);
    }

    #[test]
    fn test_tournament_type_field_is_named_type() {
        let payload: TournamentCreatedPayload = serde_json::from_str(
            r#"{"eventId":"evt-1","tournamentId":"t1","type":"daily_skirmish"}"#,
        )
        .unwrap();
        assert_eq!(payload.tournament_type, "daily_skirmish");
        assert_eq!(payload.prize_pool, None);
        assert_eq!(payload.event_id.as_deref(), Some("evt-1"));
    }

    #[test]
    fn test_duplicate_ack_shape() {
        let ack: WebhookAck<()> = WebhookAck::duplicate("evt-9".to_string());
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["processed"], false);
        assert_eq!(json["duplicate"], true);
        assert!(json.get("result").is_none());
    }
}
