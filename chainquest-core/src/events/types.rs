//! Event and notification type definitions.
//!
//! An [`Event`] is one inbound webhook after ingress: its idempotency key
//! plus a typed payload. A [`Notification`] is what the engine emits after
//! an event has been committed.

use chainquest_sdk::objects::Item;
use time::OffsetDateTime;

/// Kind of an inbound event, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EvolutionCheck,
    EvolutionApply,
    QuestComplete,
    TournamentCreated,
    BattleResult,
    TournamentComplete,
    /// Local tournament registration; never arrives as a webhook.
    Registration,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::EvolutionCheck => "evolution-check",
            EventKind::EvolutionApply => "evolution-apply",
            EventKind::QuestComplete => "quest-complete",
            EventKind::TournamentCreated => "tournament-created",
            EventKind::BattleResult => "battle-result",
            EventKind::TournamentComplete => "tournament-complete",
            EventKind::Registration => "registration",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tournament lifecycle events, in lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TournamentEvent {
    Created {
        tournament_id: String,
        tournament_type: String,
        prize_pool: Option<u64>,
        registration_deadline: Option<String>,
    },
    BattleResult {
        tournament_id: String,
        battle_id: String,
        winner: String,
        loser: String,
    },
    Completed {
        tournament_id: String,
        /// Finishing order, first place first.
        winners: Vec<String>,
        total_prizes: Option<u64>,
    },
}

impl TournamentEvent {
    pub fn tournament_id(&self) -> &str {
        match self {
            TournamentEvent::Created { tournament_id, .. }
            | TournamentEvent::BattleResult { tournament_id, .. }
            | TournamentEvent::Completed { tournament_id, .. } => tournament_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    EvolutionCheck {
        token_id: String,
        owner: String,
    },
    EvolutionApply {
        token_id: String,
        owner: String,
        old_level: u32,
        new_level: u32,
        chain: Option<String>,
    },
    QuestComplete {
        player: String,
        quest_id: String,
        chain: Option<String>,
    },
    Tournament(TournamentEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Idempotency key.
    pub id: String,
    pub payload: EventPayload,
    pub timestamp: OffsetDateTime,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match &self.payload {
            EventPayload::EvolutionCheck { .. } => EventKind::EvolutionCheck,
            EventPayload::EvolutionApply { .. } => EventKind::EvolutionApply,
            EventPayload::QuestComplete { .. } => EventKind::QuestComplete,
            EventPayload::Tournament(TournamentEvent::Created { .. }) => {
                EventKind::TournamentCreated
            }
            EventPayload::Tournament(TournamentEvent::BattleResult { .. }) => {
                EventKind::BattleResult
            }
            EventPayload::Tournament(TournamentEvent::Completed { .. }) => {
                EventKind::TournamentComplete
            }
        }
    }

    /// Id of the entity this event is about.
    pub fn subject_id(&self) -> &str {
        match &self.payload {
            EventPayload::EvolutionCheck { token_id, .. }
            | EventPayload::EvolutionApply { token_id, .. } => token_id,
            EventPayload::QuestComplete { player, .. } => player,
            EventPayload::Tournament(event) => event.tournament_id(),
        }
    }

    /// Key under which events touching the same subject are serialized.
    pub fn lock_key(&self) -> String {
        let scope = match &self.payload {
            EventPayload::EvolutionCheck { .. } | EventPayload::EvolutionApply { .. } => {
                "character"
            }
            EventPayload::QuestComplete { .. } => "player",
            EventPayload::Tournament(_) => "tournament",
        };
        format!("{scope}:{}", self.subject_id())
    }

    /// Read-only events are never recorded in the ledger.
    pub fn is_read_only(&self) -> bool {
        matches!(self.payload, EventPayload::EvolutionCheck { .. })
    }
}

/// Emitted after a commit, one per observable change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    CharacterEvolved {
        character_id: String,
        owner: String,
        from_level: u32,
        to_level: u32,
        evolution_name: String,
    },
    RewardGranted {
        recipient: String,
        tokens: u64,
        items: Vec<Item>,
        cause_event_id: String,
    },
    AchievementUnlocked {
        player: String,
        achievement: String,
    },
    QuestUnlocked {
        player: String,
        quest_id: String,
    },
    TournamentCreated {
        tournament_id: String,
        tournament_type: String,
    },
    TournamentAdvanced {
        tournament_id: String,
        round: u32,
    },
    TournamentCompleted {
        tournament_id: String,
        winners: Vec<String>,
    },
    /// Prize totals of these players changed.
    LeaderboardUpdated {
        players: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_lock_key() {
        let event = Event {
            id: "evt-1".to_string(),
            payload: EventPayload::Tournament(TournamentEvent::BattleResult {
                tournament_id: "t1".to_string(),
                battle_id: "b1".to_string(),
                winner: "0xa".to_string(),
                loser: "0xb".to_string(),
            }),
            timestamp: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(event.kind(), EventKind::BattleResult);
        assert_eq!(event.kind().to_string(), "battle-result");
        assert_eq!(event.lock_key(), "tournament:t1");
        assert!(!event.is_read_only());
    }
}
