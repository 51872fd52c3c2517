//! Idempotency ledger and the atomic transition commit.

use std::convert::Infallible;

use chainquest_sdk::objects::tournament::{AchievementAward, TournamentStatus};
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::entities::character::Character;
use crate::entities::player::{PlayerDelta, PlayerRecord};
use crate::entities::quest::QuestCompletion;
use crate::entities::reward::RewardGrant;
use crate::entities::tournament::{BattleRecord, TournamentRecord};
use crate::events::EventKind;
use crate::store::{MemoryStore, StoreData, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEvent {
    pub kind: EventKind,
    pub applied_at: OffsetDateTime,
}

/// Every state change produced by one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Full replacement rows.
    pub characters: Vec<Character>,
    /// Full replacement row.
    pub tournament: Option<TournamentRecord>,
    pub battle: Option<BattleRecord>,
    pub grants: Vec<RewardGrant>,
    pub players: Vec<PlayerDelta>,
    pub quest_completion: Option<QuestCompletion>,
    pub achievements: Vec<AchievementAward>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsEventApplied {
    pub event_id: String,
}

impl Processor<IsEventApplied> for MemoryStore {
    type Output = bool;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:IsEventApplied")]
    async fn process(&self, query: IsEventApplied) -> Result<bool, Infallible> {
        Ok(self.read().await.applied_events.contains_key(&query.event_id))
    }
}

/// Record `event_id` as applied and store `transition`, all or nothing.
///
/// Fails without writing anything if the event id was already applied, if
/// a character row would lower its level, experience or history length, or
/// if the tournament row is already completed.
#[derive(Debug, Clone)]
pub struct CommitTransition {
    pub event_id: String,
    pub kind: EventKind,
    pub at: OffsetDateTime,
    pub transition: Transition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Achievements the recipient did not hold before this commit.
    pub new_achievements: Vec<AchievementAward>,
}

fn check_transition(data: &StoreData, query: &CommitTransition) -> Result<(), StoreError> {
    if data.applied_events.contains_key(&query.event_id) {
        return Err(StoreError::DuplicateEvent(query.event_id.clone()));
    }
    for next in &query.transition.characters {
        let Some(stored) = data.characters.get(&next.id) else {
            continue;
        };
        let regression = if next.level < stored.level {
            Some("level")
        } else if next.experience < stored.experience {
            Some("experience")
        } else if next.evolution_history.len() < stored.evolution_history.len() {
            Some("evolution history")
        } else {
            None
        };
        if let Some(detail) = regression {
            return Err(StoreError::NonMonotonic {
                id: next.id.clone(),
                detail,
            });
        }
    }
    let closed = query.transition.tournament.as_ref().filter(|next| {
        data.tournaments
            .get(&next.id)
            .is_some_and(|t| t.status == TournamentStatus::Completed)
    });
    if let Some(next) = closed {
        return Err(StoreError::TournamentClosed(next.id.clone()));
    }
    Ok(())
}

impl Processor<CommitTransition> for MemoryStore {
    type Output = CommitReceipt;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "STORE:CommitTransition")]
    async fn process(&self, query: CommitTransition) -> Result<CommitReceipt, StoreError> {
        let mut data = self.write().await;
        check_transition(&data, &query)?;

        let CommitTransition {
            event_id,
            kind,
            at,
            transition,
        } = query;

        for character in transition.characters {
            data.characters.insert(character.id.clone(), character);
        }
        if let Some(tournament) = transition.tournament {
            data.tournaments.insert(tournament.id.clone(), tournament);
        }
        data.battles.extend(transition.battle);
        data.grants.extend(transition.grants);
        data.quest_completions.extend(transition.quest_completion);

        for delta in &transition.players {
            let record = data
                .players
                .entry(delta.address.clone())
                .or_insert_with(|| PlayerRecord::new(delta.address.clone()));
            delta.apply(record);
        }

        let mut receipt = CommitReceipt::default();
        for award in transition.achievements {
            let record = data
                .players
                .entry(award.player.clone())
                .or_insert_with(|| PlayerRecord::new(award.player.clone()));
            if record.achievements.insert(award.achievement.clone()) {
                receipt.new_achievements.push(award);
            }
        }

        data.applied_events.insert(
            event_id,
            AppliedEvent {
                kind,
                applied_at: at,
            },
        );
        Ok(receipt)
    }
}
