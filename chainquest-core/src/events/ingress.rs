//! Conversion of verified webhook payloads into [`Event`]s.
//!
//! Signature verification happens before this point, on the raw body. Here
//! the payload is checked for shape only: required ids present and player
//! addresses well formed. Levels and subjects are the engine's call.
//!
//! Every address leaves ingress lowercased, so the ledger keys one wallet
//! once however the sender cased it.

use chainquest_sdk::objects::webhook::{
    BattleResultPayload, EvolutionCheckPayload, EvolutionPayload, QuestCompletedPayload,
    TournamentCompletedPayload, TournamentCreatedPayload,
};
use thiserror::Error;
use time::OffsetDateTime;

use super::types::{Event, EventPayload, TournamentEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngressError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid player address: {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    Invalid(String),
}

/// `0x` followed by 40 hex digits.
pub fn is_player_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Canonical form of a wallet address: trimmed and lowercased.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// The payload's own event id when present and non-blank, else `fallback`.
pub fn choose_event_id(payload_id: Option<&str>, fallback: &str) -> String {
    payload_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn required(value: String, field: &'static str) -> Result<String, IngressError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IngressError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn required_address(value: String, field: &'static str) -> Result<String, IngressError> {
    required(value, field).map(|address| normalize_address(&address))
}

/// A webhook payload that can become an [`Event`].
///
/// `fallback_id` is used when the payload carries no `eventId`.
pub trait IntoEvent {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError>;
}

impl IntoEvent for EvolutionCheckPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::EvolutionCheck {
                token_id: required(self.token_id, "tokenId")?,
                owner: required_address(self.owner, "owner")?,
            },
            timestamp: received_at,
        })
    }
}

impl IntoEvent for EvolutionPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::EvolutionApply {
                token_id: required(self.token_id, "tokenId")?,
                owner: required_address(self.owner, "owner")?,
                old_level: self.old_level,
                new_level: self.new_level,
                chain: self.chain,
            },
            timestamp: received_at,
        })
    }
}

impl IntoEvent for QuestCompletedPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        let player = required_address(self.player, "player")?;
        if !is_player_address(&player) {
            return Err(IngressError::InvalidAddress(player));
        }
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::QuestComplete {
                player,
                quest_id: required(self.quest_id, "questId")?,
                chain: self.chain,
            },
            timestamp: received_at,
        })
    }
}

impl IntoEvent for TournamentCreatedPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::Tournament(TournamentEvent::Created {
                tournament_id: required(self.tournament_id, "tournamentId")?,
                tournament_type: required(self.tournament_type, "type")?,
                prize_pool: self.prize_pool,
                registration_deadline: self.registration_deadline,
            }),
            timestamp: received_at,
        })
    }
}

impl IntoEvent for BattleResultPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        let winner = required_address(self.winner, "winner")?;
        let loser = required_address(self.loser, "loser")?;
        if winner == loser {
            return Err(IngressError::Invalid(
                "winner and loser must differ".to_string(),
            ));
        }
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::Tournament(TournamentEvent::BattleResult {
                tournament_id: required(self.tournament_id, "tournamentId")?,
                battle_id: required(self.battle_id, "battleId")?,
                winner,
                loser,
            }),
            timestamp: received_at,
        })
    }
}

impl IntoEvent for TournamentCompletedPayload {
    fn into_event(
        self,
        fallback_id: &str,
        received_at: OffsetDateTime,
    ) -> Result<Event, IngressError> {
        let winners = self
            .winners
            .into_iter()
            .map(|w| required_address(w, "winners"))
            .collect::<Result<Vec<_>, _>>()?;
        if winners.is_empty() {
            return Err(IngressError::MissingField("winners"));
        }
        Ok(Event {
            id: choose_event_id(self.event_id.as_deref(), fallback_id),
            payload: EventPayload::Tournament(TournamentEvent::Completed {
                tournament_id: required(self.tournament_id, "tournamentId")?,
                winners,
                total_prizes: self.total_prizes,
            }),
            timestamp: received_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: &str = "0x1234567890abcdef1234567890ABCDEF12345678";

    #[test]
    fn test_player_address_format() {
        assert!(is_player_address(PLAYER));
        assert!(!is_player_address("0x123"));
        assert!(!is_player_address("1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_player_address("0x1234567890abcdef1234567890abcdef1234567g"));
    }

    #[test]
    fn test_payload_id_wins_over_fallback() {
        assert_eq!(choose_event_id(Some("evt-7"), "digest"), "evt-7");
        assert_eq!(choose_event_id(Some("  "), "digest"), "digest");
        assert_eq!(choose_event_id(None, "digest"), "digest");
    }

    #[test]
    fn test_quest_payload_rejects_bad_address() {
        let payload = QuestCompletedPayload {
            event_id: None,
            player: "alice".to_string(),
            quest_id: "daily_login".to_string(),
            chain: None,
        };
        assert_eq!(
            payload.into_event("digest", OffsetDateTime::UNIX_EPOCH),
            Err(IngressError::InvalidAddress("alice".to_string()))
        );
    }

    #[test]
    fn test_addresses_are_lowercased() {
        let quest = QuestCompletedPayload {
            event_id: None,
            player: format!(" {PLAYER} "),
            quest_id: "daily_login".to_string(),
            chain: None,
        }
        .into_event("digest", OffsetDateTime::UNIX_EPOCH)
        .unwrap();
        let EventPayload::QuestComplete { player, .. } = quest.payload else {
            panic!("expected a quest event");
        };
        assert_eq!(player, PLAYER.to_ascii_lowercase());

        let battle = BattleResultPayload {
            event_id: None,
            battle_id: "b1".to_string(),
            winner: "0xAA".to_string(),
            loser: "0xaa".to_string(),
            tournament_id: "t1".to_string(),
        };
        assert_eq!(
            battle.into_event("digest", OffsetDateTime::UNIX_EPOCH),
            Err(IngressError::Invalid("winner and loser must differ".to_string()))
        );
    }

    #[test]
    fn test_evolution_payload_requires_owner() {
        let payload = EvolutionPayload {
            event_id: Some("evt-1".to_string()),
            token_id: "1".to_string(),
            owner: " ".to_string(),
            old_level: 1,
            new_level: 2,
            chain: None,
        };
        assert_eq!(
            payload.into_event("digest", OffsetDateTime::UNIX_EPOCH),
            Err(IngressError::MissingField("owner"))
        );
    }

    #[test]
    fn test_completed_requires_winners() {
        let payload = TournamentCompletedPayload {
            event_id: None,
            tournament_id: "t1".to_string(),
            winners: vec![],
            total_prizes: Some(100),
        };
        assert_eq!(
            payload.into_event("digest", OffsetDateTime::UNIX_EPOCH),
            Err(IngressError::MissingField("winners"))
        );
    }

    #[test]
    fn test_battle_event_shape() {
        let payload = BattleResultPayload {
            event_id: None,
            battle_id: "b1".to_string(),
            winner: "0xa".to_string(),
            loser: "0xb".to_string(),
            tournament_id: "t1".to_string(),
        };
        let event = payload
            .into_event("digest", OffsetDateTime::UNIX_EPOCH)
            .unwrap();
        assert_eq!(event.id, "digest");
        assert_eq!(event.subject_id(), "t1");
    }
}
