//! ProgressionEngine.
//!
//! The engine is responsible for:
//! - Serializing work per subject (character, player, tournament)
//! - Rejecting replayed event ids before evaluation
//! - Reading current state and asking the rule evaluator for an outcome
//! - Committing the outcome as one ledger transition
//! - Emitting notifications once the commit succeeded
//!
//! It never retries. Every failure is returned to the caller untouched.

use std::time::Duration;

use chainquest_sdk::objects::character::{
    CharacterView, EligibilityResponse, EvolutionResult, EvolutionRewards,
};
use chainquest_sdk::objects::player::PlayerView;
use chainquest_sdk::objects::quest::{DailyQuestsResponse, QuestCompletionResult};
use chainquest_sdk::objects::tournament::{
    AchievementAward, BattleResultView, MatchmakingRequest, MatchmakingResponse,
    RegisterPlayerRequest, TournamentCompletionResult, TournamentStatus, TournamentView,
};
use kanau::processor::Processor;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::entities::character::{Character, GetCharacter, ListCharactersByOwner};
use crate::entities::ledger::{CommitReceipt, CommitTransition, IsEventApplied, Transition};
use crate::entities::player::{GetPlayer, PlayerDelta, PlayerRecord};
use crate::entities::quest::{ListQuestCompletions, QuestCompletion};
use crate::entities::reward::{ListRewardGrants, RewardGrant};
use crate::entities::tournament::{
    BattleRecord, CountBattlesInRound, GetTournament, RegisteredPlayer, TournamentRecord,
};
use crate::error::EngineError;
use crate::events::{
    Event, EventKind, EventPayload, Notification, NotificationReceiver, NotificationSender,
    TournamentEvent, is_player_address, normalize_address,
};
use crate::rules::tables::{
    CHAMPION_ACHIEVEMENT, TOURNAMENT_WINNER_ACHIEVEMENT, level_threshold, tournament_type,
};
use crate::rules::{
    RuleError, check_evolution_eligibility, daily_quests, evaluate_evolution,
    evaluate_prize_distribution, evaluate_quest_completion, find_best_match,
    generate_tournament_id, round_quota, undistributed,
};
use crate::store::{EntityStore, LedgerStore};
use crate::utils::subject_locks::SubjectLocks;

/// Delay between a match being found and the battle starting.
const MATCH_BATTLE_DELAY: Duration = Duration::from_secs(5 * 60);

/// What an applied event produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventOutcome {
    EvolutionChecked(EligibilityResponse),
    Evolved(EvolutionResult),
    QuestCompleted(QuestCompletionResult),
    TournamentCreated(TournamentView),
    BattleRecorded(BattleResultView),
    TournamentCompleted(TournamentCompletionResult),
}

pub struct ProgressionEngine<S> {
    store: S,
    locks: SubjectLocks,
    notifications: NotificationSender,
}

impl<S> ProgressionEngine<S>
where
    S: EntityStore + LedgerStore,
{
    pub fn new(store: S, notifications: NotificationSender) -> Self {
        Self {
            store,
            locks: SubjectLocks::new(),
            notifications,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&self) -> NotificationReceiver {
        self.notifications.subscribe()
    }

    fn emit(&self, notification: Notification) {
        // No subscriber is not an error.
        let _ = self.notifications.send(notification);
    }

    fn emit_achievements(&self, receipt: &CommitReceipt) {
        for award in &receipt.new_achievements {
            self.emit(Notification::AchievementUnlocked {
                player: award.player.clone(),
                achievement: award.achievement.clone(),
            });
        }
    }

    fn emit_grant(&self, grant: &RewardGrant) {
        self.emit(Notification::RewardGranted {
            recipient: grant.recipient.clone(),
            tokens: grant.tokens,
            items: grant.items.clone(),
            cause_event_id: grant.cause_event_id.clone(),
        });
    }

    async fn commit(
        &self,
        event_id: &str,
        kind: EventKind,
        at: OffsetDateTime,
        transition: Transition,
    ) -> Result<CommitReceipt, EngineError> {
        let receipt = self
            .store
            .process(CommitTransition {
                event_id: event_id.to_string(),
                kind,
                at,
                transition,
            })
            .await?;
        Ok(receipt)
    }

    async fn load_character(&self, id: &str) -> Result<Character, EngineError> {
        self.store
            .process(GetCharacter { id: id.to_string() })
            .await?
            .ok_or_else(|| EngineError::not_found("character", id))
    }

    async fn load_tournament(&self, id: &str) -> Result<TournamentRecord, EngineError> {
        self.store
            .process(GetTournament { id: id.to_string() })
            .await?
            .ok_or_else(|| EngineError::not_found("tournament", id))
    }

    /// Apply one event.
    ///
    /// Events for the same subject are applied one at a time. A replayed id
    /// fails with [`EngineError::Duplicate`] and changes nothing.
    #[tracing::instrument(skip_all, fields(event_id = %event.id, kind = %event.kind()))]
    pub async fn handle(&self, event: Event) -> Result<EventOutcome, EngineError> {
        let _guard = self.locks.lock(&event.lock_key()).await;

        if !event.is_read_only() {
            let applied = self
                .store
                .process(IsEventApplied {
                    event_id: event.id.clone(),
                })
                .await?;
            if applied {
                debug!("Event already applied");
                return Err(EngineError::Duplicate(event.id));
            }
        }

        let Event {
            id,
            payload,
            timestamp,
        } = event;
        match payload {
            EventPayload::EvolutionCheck { token_id, owner } => self
                .check_evolution(&token_id, &owner, timestamp)
                .await
                .map(EventOutcome::EvolutionChecked),
            EventPayload::EvolutionApply {
                token_id,
                owner,
                old_level,
                new_level,
                chain,
            } => self
                .apply_evolution(&id, &token_id, &owner, old_level, new_level, chain, timestamp)
                .await
                .map(EventOutcome::Evolved),
            EventPayload::QuestComplete {
                player,
                quest_id,
                chain,
            } => self
                .complete_quest(&id, player, &quest_id, chain, timestamp)
                .await
                .map(EventOutcome::QuestCompleted),
            EventPayload::Tournament(event) => self.handle_tournament(&id, event, timestamp).await,
        }
    }

    async fn handle_tournament(
        &self,
        event_id: &str,
        event: TournamentEvent,
        at: OffsetDateTime,
    ) -> Result<EventOutcome, EngineError> {
        match event {
            TournamentEvent::Created {
                tournament_id,
                tournament_type,
                prize_pool,
                registration_deadline,
            } => self
                .create_tournament_record(
                    event_id,
                    &tournament_id,
                    &tournament_type,
                    prize_pool,
                    registration_deadline,
                    at,
                )
                .await
                .map(EventOutcome::TournamentCreated),
            TournamentEvent::BattleResult {
                tournament_id,
                battle_id,
                winner,
                loser,
            } => self
                .record_battle(event_id, &tournament_id, battle_id, winner, loser, at)
                .await
                .map(EventOutcome::BattleRecorded),
            TournamentEvent::Completed {
                tournament_id,
                winners,
                total_prizes,
            } => self
                .complete_tournament(event_id, &tournament_id, winners, total_prizes, at)
                .await
                .map(EventOutcome::TournamentCompleted),
        }
    }

    // -------------------------------------------------------------------
    // Characters
    // -------------------------------------------------------------------

    pub async fn character(&self, id: &str) -> Result<CharacterView, EngineError> {
        Ok(self.load_character(id).await?.to_view())
    }

    /// Eligibility of `token_id` for its next level. Reads only.
    pub async fn check_evolution(
        &self,
        token_id: &str,
        owner: &str,
        at: OffsetDateTime,
    ) -> Result<EligibilityResponse, EngineError> {
        let character = self.load_character(token_id).await?;
        if !character.is_owned_by(owner) {
            return Err(EngineError::Validation(format!(
                "character {token_id} is not owned by {owner}"
            )));
        }
        let eligibility = check_evolution_eligibility(&character);
        debug!(character_id = %token_id, eligible = eligibility.is_eligible(), "Checked evolution");
        Ok(EligibilityResponse {
            token_id: character.id,
            owner: character.owner,
            eligibility: eligibility.to_view(),
            timestamp: at,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply_evolution(
        &self,
        event_id: &str,
        token_id: &str,
        owner: &str,
        old_level: u32,
        new_level: u32,
        chain: Option<String>,
        at: OffsetDateTime,
    ) -> Result<EvolutionResult, EngineError> {
        let character = self.load_character(token_id).await?;
        if !character.is_owned_by(owner) {
            return Err(EngineError::Validation(format!(
                "character {token_id} is not owned by {owner}"
            )));
        }
        if character.level != old_level {
            return Err(EngineError::Validation(format!(
                "stale transition: character {token_id} is at level {}, not {old_level}",
                character.level
            )));
        }

        let outcome = evaluate_evolution(&character, old_level, new_level)?;
        let required = level_threshold(new_level)
            .ok_or(RuleError::InvalidLevel {
                from: old_level,
                to: new_level,
            })?
            .xp_required;
        if character.experience < required {
            return Err(EngineError::Validation(format!(
                "character {token_id} has {} xp, level {new_level} requires {required}",
                character.experience
            )));
        }

        let evolved = character.evolved(&outcome, at);
        let grant = RewardGrant {
            recipient: character.owner.clone(),
            tokens: outcome.tokens,
            items: outcome.items.clone(),
            cause_event_id: event_id.to_string(),
            granted_at: at,
        };
        let achievements = outcome
            .achievements
            .iter()
            .map(|name| AchievementAward {
                player: character.owner.clone(),
                achievement: name.to_string(),
            })
            .collect();

        let receipt = self
            .commit(
                event_id,
                EventKind::EvolutionApply,
                at,
                Transition {
                    characters: vec![evolved],
                    grants: vec![grant.clone()],
                    achievements,
                    ..Default::default()
                },
            )
            .await?;

        info!(
            character_id = %token_id,
            from_level = old_level,
            to_level = new_level,
            tokens = outcome.tokens,
            "Character evolved"
        );
        self.emit(Notification::CharacterEvolved {
            character_id: character.id.clone(),
            owner: character.owner.clone(),
            from_level: old_level,
            to_level: new_level,
            evolution_name: outcome.evolution_name.to_string(),
        });
        self.emit_grant(&grant);
        self.emit_achievements(&receipt);

        Ok(EvolutionResult {
            token_id: character.id,
            owner: character.owner,
            old_level,
            new_level,
            old_stats: character.stats,
            new_stats: outcome.new_stats,
            rewards: EvolutionRewards {
                tokens: outcome.tokens,
                xp: 0,
                items: outcome.items,
            },
            evolution_name: outcome.evolution_name.to_string(),
            achievements: receipt
                .new_achievements
                .into_iter()
                .map(|a| a.achievement)
                .collect(),
            timestamp: at,
            chain,
        })
    }

    // -------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------

    /// Ledger totals, grants and quest completions of `address`.
    ///
    /// An address the ledger has never credited is not found.
    pub async fn player(&self, address: &str) -> Result<PlayerView, EngineError> {
        let address = normalize_address(address);
        let address = address.as_str();
        let record = self
            .store
            .process(GetPlayer {
                address: address.to_string(),
            })
            .await?;
        let rewards = self
            .store
            .process(ListRewardGrants {
                recipient: Some(address.to_string()),
            })
            .await?;
        if record.is_none() && rewards.is_empty() {
            return Err(EngineError::not_found("player", address));
        }
        let quests = self
            .store
            .process(ListQuestCompletions {
                player: address.to_string(),
            })
            .await?;

        let record = record.unwrap_or_else(|| PlayerRecord::new(address));
        Ok(PlayerView {
            address: record.address,
            wins: record.wins,
            losses: record.losses,
            prize_tokens: record.prize_tokens,
            quests_completed: record.quests_completed,
            quest_xp: record.quest_xp,
            achievements: record.achievements.into_iter().collect(),
            rewards: rewards.iter().map(RewardGrant::to_view).collect(),
            quests: quests.iter().map(QuestCompletion::to_view).collect(),
        })
    }

    // -------------------------------------------------------------------
    // Quests
    // -------------------------------------------------------------------

    /// Quests offered to `player` today. The player's level is the highest
    /// level among the characters they own, or 1.
    pub async fn daily_quests(
        &self,
        player: &str,
        now: OffsetDateTime,
    ) -> Result<DailyQuestsResponse, EngineError> {
        let player = normalize_address(player);
        if !is_player_address(&player) {
            return Err(EngineError::Validation(format!(
                "invalid player address: {player}"
            )));
        }
        let owned = self
            .store
            .process(ListCharactersByOwner {
                owner: player.clone(),
            })
            .await?;
        let level = owned.iter().map(|c| c.level).max().unwrap_or(1);
        Ok(DailyQuestsResponse {
            player,
            quests: daily_quests(level, now),
            timestamp: now,
        })
    }

    async fn complete_quest(
        &self,
        event_id: &str,
        player: String,
        quest_id: &str,
        chain: Option<String>,
        at: OffsetDateTime,
    ) -> Result<QuestCompletionResult, EngineError> {
        let evaluation = evaluate_quest_completion(quest_id)?;
        let grant = RewardGrant {
            recipient: player.clone(),
            tokens: evaluation.reward.tokens,
            items: Vec::new(),
            cause_event_id: event_id.to_string(),
            granted_at: at,
        };

        self.commit(
            event_id,
            EventKind::QuestComplete,
            at,
            Transition {
                grants: vec![grant.clone()],
                players: vec![PlayerDelta {
                    quests_completed: 1,
                    quest_xp: evaluation.reward.xp,
                    ..PlayerDelta::new(player.clone())
                }],
                quest_completion: Some(QuestCompletion {
                    player: player.clone(),
                    quest_id: quest_id.to_string(),
                    xp: evaluation.reward.xp,
                    event_id: event_id.to_string(),
                    completed_at: at,
                }),
                ..Default::default()
            },
        )
        .await?;

        info!(player = %player, quest_id = %quest_id, tokens = grant.tokens, "Quest completed");
        self.emit_grant(&grant);
        for unlocked in evaluation.unlocks {
            self.emit(Notification::QuestUnlocked {
                player: player.clone(),
                quest_id: unlocked.to_string(),
            });
        }

        Ok(QuestCompletionResult {
            quest_id: quest_id.to_string(),
            quest_name: evaluation.template.name.to_string(),
            player,
            rewards: evaluation.reward,
            unlocked: evaluation.unlocks.iter().map(|q| q.to_string()).collect(),
            completed_at: at,
            chain,
        })
    }

    // -------------------------------------------------------------------
    // Tournaments
    // -------------------------------------------------------------------

    pub async fn tournament(&self, id: &str) -> Result<TournamentView, EngineError> {
        Ok(self.load_tournament(id).await?.to_view())
    }

    /// Create a tournament of `kind` under a freshly generated id.
    pub async fn create_tournament(
        &self,
        kind: &str,
        now: OffsetDateTime,
    ) -> Result<TournamentView, EngineError> {
        let tournament_id = generate_tournament_id(now, &mut rand::rng());
        let event = Event {
            id: format!("create:{tournament_id}"),
            payload: EventPayload::Tournament(TournamentEvent::Created {
                tournament_id,
                tournament_type: kind.to_string(),
                prize_pool: None,
                registration_deadline: None,
            }),
            timestamp: now,
        };
        match self.handle(event).await? {
            EventOutcome::TournamentCreated(view) => Ok(view),
            _ => Err(EngineError::Validation(
                "unexpected outcome for tournament creation".to_string(),
            )),
        }
    }

    async fn create_tournament_record(
        &self,
        event_id: &str,
        tournament_id: &str,
        kind: &str,
        prize_pool: Option<u64>,
        registration_deadline: Option<String>,
        at: OffsetDateTime,
    ) -> Result<TournamentView, EngineError> {
        let config = tournament_type(kind)
            .ok_or_else(|| RuleError::UnknownTournamentType(kind.to_string()))?;
        let existing = self
            .store
            .process(GetTournament {
                id: tournament_id.to_string(),
            })
            .await?;
        if existing.is_some() {
            return Err(EngineError::Validation(format!(
                "tournament {tournament_id} already exists"
            )));
        }

        let record =
            TournamentRecord::open(tournament_id, config, prize_pool, registration_deadline, at);
        let view = record.to_view();
        self.commit(
            event_id,
            EventKind::TournamentCreated,
            at,
            Transition {
                tournament: Some(record),
                ..Default::default()
            },
        )
        .await?;

        info!(
            tournament_id = %tournament_id,
            kind = %kind,
            prize_pool = view.prize_pool,
            "Tournament created"
        );
        self.emit(Notification::TournamentCreated {
            tournament_id: tournament_id.to_string(),
            tournament_type: kind.to_string(),
        });
        Ok(view)
    }

    async fn record_battle(
        &self,
        event_id: &str,
        tournament_id: &str,
        battle_id: String,
        winner: String,
        loser: String,
        at: OffsetDateTime,
    ) -> Result<BattleResultView, EngineError> {
        let mut tournament = self.load_tournament(tournament_id).await?;
        if tournament.status == TournamentStatus::Completed {
            return Err(EngineError::Conflict(format!(
                "tournament {tournament_id} is already completed"
            )));
        }
        if tournament.status == TournamentStatus::Open {
            tournament.status = TournamentStatus::InProgress;
            tournament.current_round = 1;
        }

        let round = tournament.current_round;
        tournament.add_participant(&winner);
        tournament.add_participant(&loser);

        let recorded = self
            .store
            .process(CountBattlesInRound {
                tournament_id: tournament_id.to_string(),
                round,
            })
            .await?;
        let round_complete = recorded + 1 >= round_quota(tournament.participants.len());
        let new_round = round_complete.then(|| {
            tournament.current_round += 1;
            tournament.current_round
        });

        let battle = BattleRecord {
            id: battle_id.clone(),
            tournament_id: tournament_id.to_string(),
            winner: winner.clone(),
            loser: loser.clone(),
            round,
            recorded_at: at,
        };
        self.commit(
            event_id,
            EventKind::BattleResult,
            at,
            Transition {
                tournament: Some(tournament),
                battle: Some(battle),
                players: vec![
                    PlayerDelta {
                        wins: 1,
                        ..PlayerDelta::new(winner.clone())
                    },
                    PlayerDelta {
                        losses: 1,
                        ..PlayerDelta::new(loser.clone())
                    },
                ],
                ..Default::default()
            },
        )
        .await?;

        info!(
            tournament_id = %tournament_id,
            battle_id = %battle_id,
            round,
            round_complete,
            "Battle recorded"
        );
        if let Some(next) = new_round {
            self.emit(Notification::TournamentAdvanced {
                tournament_id: tournament_id.to_string(),
                round: next,
            });
        }

        Ok(BattleResultView {
            battle_id,
            tournament_id: tournament_id.to_string(),
            winner,
            loser,
            round,
            round_complete,
            new_round,
        })
    }

    async fn complete_tournament(
        &self,
        event_id: &str,
        tournament_id: &str,
        winners: Vec<String>,
        total_prizes: Option<u64>,
        at: OffsetDateTime,
    ) -> Result<TournamentCompletionResult, EngineError> {
        let mut tournament = self.load_tournament(tournament_id).await?;
        if tournament.status == TournamentStatus::Completed {
            return Err(EngineError::Conflict(format!(
                "tournament {tournament_id} is already completed"
            )));
        }

        let total = total_prizes.unwrap_or(tournament.prize_pool);
        let shares = evaluate_prize_distribution(&winners, total);
        let remainder = undistributed(total, &shares);

        let grants: Vec<RewardGrant> = shares
            .iter()
            .filter(|s| s.amount > 0)
            .map(|s| RewardGrant {
                recipient: s.recipient.clone(),
                tokens: s.amount,
                items: Vec::new(),
                cause_event_id: event_id.to_string(),
                granted_at: at,
            })
            .collect();
        let players = shares
            .iter()
            .map(|s| PlayerDelta {
                prize_tokens: s.amount,
                ..PlayerDelta::new(s.recipient.clone())
            })
            .collect();
        let achievements = shares
            .iter()
            .flat_map(|s| {
                let winner = (s.place == 1).then(|| AchievementAward {
                    player: s.recipient.clone(),
                    achievement: TOURNAMENT_WINNER_ACHIEVEMENT.to_string(),
                });
                let champion = AchievementAward {
                    player: s.recipient.clone(),
                    achievement: CHAMPION_ACHIEVEMENT.to_string(),
                };
                winner.into_iter().chain(std::iter::once(champion))
            })
            .collect();

        tournament.status = TournamentStatus::Completed;
        tournament.completed_at = Some(at);

        let receipt = self
            .commit(
                event_id,
                EventKind::TournamentComplete,
                at,
                Transition {
                    tournament: Some(tournament),
                    grants: grants.clone(),
                    players,
                    achievements,
                    ..Default::default()
                },
            )
            .await?;

        info!(
            tournament_id = %tournament_id,
            total,
            undistributed = remainder,
            "Tournament completed"
        );
        for grant in &grants {
            self.emit_grant(grant);
        }
        self.emit_achievements(&receipt);
        self.emit(Notification::TournamentCompleted {
            tournament_id: tournament_id.to_string(),
            winners: winners.clone(),
        });
        self.emit(Notification::LeaderboardUpdated {
            players: shares.iter().map(|s| s.recipient.clone()).collect(),
        });

        Ok(TournamentCompletionResult {
            tournament_id: tournament_id.to_string(),
            status: TournamentStatus::Completed,
            winners,
            prize_distribution: shares,
            undistributed: remainder,
            achievements: receipt.new_achievements,
            completed_at: at,
        })
    }

    /// Register a player for matchmaking while the tournament is open.
    pub async fn register_player(
        &self,
        tournament_id: &str,
        request: RegisterPlayerRequest,
        at: OffsetDateTime,
    ) -> Result<TournamentView, EngineError> {
        let address = normalize_address(&request.address);
        let chain = request.chain.trim().to_string();
        if address.is_empty() || chain.is_empty() {
            return Err(EngineError::Validation(
                "address and chain are required".to_string(),
            ));
        }

        let _guard = self.locks.lock(&format!("tournament:{tournament_id}")).await;
        let mut tournament = self.load_tournament(tournament_id).await?;
        if tournament.status != TournamentStatus::Open {
            return Err(EngineError::Conflict(format!(
                "registration for tournament {tournament_id} is closed ({})",
                tournament.status
            )));
        }
        if tournament.registered.iter().any(|p| p.address == address) {
            return Err(EngineError::Conflict(format!(
                "{address} is already registered for {tournament_id}"
            )));
        }
        if tournament.is_full() {
            return Err(EngineError::Conflict(format!(
                "tournament {tournament_id} is full"
            )));
        }

        tournament.registered.push(RegisteredPlayer {
            address: address.clone(),
            chain,
            stats: request.stats,
        });
        let view = tournament.to_view();
        self.commit(
            &format!("register:{tournament_id}:{address}"),
            EventKind::Registration,
            at,
            Transition {
                tournament: Some(tournament),
                ..Default::default()
            },
        )
        .await?;

        info!(tournament_id = %tournament_id, player = %address, "Player registered");
        Ok(view)
    }

    /// Find the registered opponent on another chain with the closest stat
    /// total. Reads only.
    pub async fn matchmake(
        &self,
        tournament_id: &str,
        request: MatchmakingRequest,
        now: OffsetDateTime,
    ) -> Result<MatchmakingResponse, EngineError> {
        let tournament = self.load_tournament(tournament_id).await?;
        let response = match find_best_match(&request.chain, &request.stats, &tournament.registered)
        {
            Some(opponent) => MatchmakingResponse {
                matched: true,
                opponent: Some(opponent.to_view()),
                estimated_battle_time: Some(now + MATCH_BATTLE_DELAY),
                reason: None,
                waiting_players: None,
            },
            None => MatchmakingResponse {
                matched: false,
                opponent: None,
                estimated_battle_time: None,
                reason: Some("No suitable opponents found".to_string()),
                waiting_players: Some(tournament.registered.len()),
            },
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chainquest_sdk::objects::{CharacterClass, Rarity};

    use crate::entities::character::InsertCharacter;
    use crate::entities::player::GetLeaderboard;
    use crate::events::notification_channel;
    use crate::store::MemoryStore;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";
    const PLAYER: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_772_000_000).unwrap()
    }

    async fn engine_with(characters: Vec<Character>) -> ProgressionEngine<MemoryStore> {
        let store = MemoryStore::new();
        for character in characters {
            store.process(InsertCharacter { character }).await.unwrap();
        }
        let (tx, _rx) = notification_channel();
        ProgressionEngine::new(store, tx)
    }

    fn evolution(id: &str, token_id: &str, old_level: u32, new_level: u32) -> Event {
        Event {
            id: id.to_string(),
            payload: EventPayload::EvolutionApply {
                token_id: token_id.to_string(),
                owner: OWNER.to_string(),
                old_level,
                new_level,
                chain: Some("polygon".to_string()),
            },
            timestamp: now(),
        }
    }

    fn tournament_event(id: &str, event: TournamentEvent) -> Event {
        Event {
            id: id.to_string(),
            payload: EventPayload::Tournament(event),
            timestamp: now(),
        }
    }

    fn battle(id: &str, winner: &str, loser: &str) -> Event {
        tournament_event(
            id,
            TournamentEvent::BattleResult {
                tournament_id: "t1".to_string(),
                battle_id: format!("battle-{id}"),
                winner: winner.to_string(),
                loser: loser.to_string(),
            },
        )
    }

    async fn grants_for(engine: &ProgressionEngine<MemoryStore>, who: &str) -> Vec<RewardGrant> {
        engine
            .store()
            .process(ListRewardGrants {
                recipient: Some(who.to_string()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_evolution_applies_and_appends_history() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Warrior,
            1,
            12_000,
        )])
        .await;
        let mut notifications = engine.subscribe();

        let outcome = engine.handle(evolution("evt-1", "1", 1, 5)).await.unwrap();
        let EventOutcome::Evolved(result) = outcome else {
            panic!("expected an evolution result");
        };
        assert_eq!(result.rewards.tokens, 400);
        assert_eq!(result.rewards.items.len(), 1);
        assert_eq!(result.rewards.items[0].rarity, Rarity::Rare);
        assert_eq!(result.achievements, vec!["Master Trainer"]);
        assert_eq!(result.evolution_name, "Master");

        let character = engine.character("1").await.unwrap();
        assert_eq!(character.level, 5);
        assert_eq!(character.experience, 12_000);
        assert_eq!(character.evolution_history.len(), 1);
        assert_eq!(character.evolution_history[0].from_level, 1);
        assert_eq!(character.stats.attack, 148);

        assert!(matches!(
            notifications.recv().await.unwrap(),
            Notification::CharacterEvolved { to_level: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_replay_does_not_double_grant() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Mage,
            1,
            5_000,
        )])
        .await;
        engine.handle(evolution("evt-1", "1", 1, 2)).await.unwrap();
        let replay = engine.handle(evolution("evt-1", "1", 1, 2)).await;
        assert_eq!(replay, Err(EngineError::Duplicate("evt-1".to_string())));

        let grants = grants_for(&engine, OWNER).await;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].tokens, 100);
        assert_eq!(engine.character("1").await.unwrap().level, 2);
    }

    #[tokio::test]
    async fn test_stale_old_level_is_rejected() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Archer,
            3,
            50_000,
        )])
        .await;
        let result = engine.handle(evolution("evt-1", "1", 2, 4)).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert!(grants_for(&engine, OWNER).await.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_experience_is_rejected() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Archer,
            1,
            500,
        )])
        .await;
        let result = engine.handle(evolution("evt-1", "1", 1, 2)).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(engine.character("1").await.unwrap().level, 1);
    }

    #[tokio::test]
    async fn test_invalid_level_is_a_rule_error() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Warrior,
            9,
            200_000,
        )])
        .await;
        let result = engine.handle(evolution("evt-1", "1", 9, 11)).await;
        assert_eq!(
            result,
            Err(EngineError::Rule(RuleError::InvalidLevel { from: 9, to: 11 }))
        );
    }

    #[tokio::test]
    async fn test_unknown_character_is_not_found() {
        let engine = engine_with(vec![]).await;
        let result = engine.handle(evolution("evt-1", "404", 1, 2)).await;
        assert!(matches!(
            result,
            Err(EngineError::NotFound { kind: "character", .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_same_character_evolutions_apply_once() {
        let engine = Arc::new(
            engine_with(vec![Character::seeded(
                "1",
                OWNER,
                CharacterClass::Warrior,
                1,
                5_000,
            )])
            .await,
        );
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    engine
                        .handle(evolution(&format!("evt-{i}"), "1", 1, 2))
                        .await
                })
            })
            .collect();

        let mut applied = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(engine.character("1").await.unwrap().evolution_history.len(), 1);
        assert_eq!(grants_for(&engine, OWNER).await.len(), 1);
    }

    #[tokio::test]
    async fn test_evolution_check_is_read_only_and_repeatable() {
        let engine = engine_with(vec![Character::seeded(
            "1",
            OWNER,
            CharacterClass::Warrior,
            1,
            1_500,
        )])
        .await;
        let check = || Event {
            id: "evt-check".to_string(),
            payload: EventPayload::EvolutionCheck {
                token_id: "1".to_string(),
                owner: OWNER.to_string(),
            },
            timestamp: now(),
        };
        for _ in 0..2 {
            let EventOutcome::EvolutionChecked(response) = engine.handle(check()).await.unwrap()
            else {
                panic!("expected an eligibility response");
            };
            assert!(response.eligibility.eligible);
            assert_eq!(response.eligibility.new_level, Some(2));
        }
        assert_eq!(engine.character("1").await.unwrap().level, 1);
    }

    #[tokio::test]
    async fn test_quest_completion_grants_tokens_and_records_xp() {
        let engine = engine_with(vec![]).await;
        let mut notifications = engine.subscribe();
        let event = Event {
            id: "evt-q".to_string(),
            payload: EventPayload::QuestComplete {
                player: PLAYER.to_string(),
                quest_id: "mint_character".to_string(),
                chain: None,
            },
            timestamp: now(),
        };
        let EventOutcome::QuestCompleted(result) = engine.handle(event).await.unwrap() else {
            panic!("expected a quest result");
        };
        assert_eq!(result.rewards.tokens, 500);
        assert_eq!(result.unlocked, vec!["play_first_game"]);

        let player = engine
            .store()
            .process(GetPlayer {
                address: PLAYER.to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(player.quest_xp, 250);
        assert_eq!(player.quests_completed, 1);

        assert!(matches!(
            notifications.recv().await.unwrap(),
            Notification::RewardGranted { tokens: 500, .. }
        ));
        assert_eq!(
            notifications.recv().await.unwrap(),
            Notification::QuestUnlocked {
                player: PLAYER.to_string(),
                quest_id: "play_first_game".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_player_view_collects_ledger_rows() {
        let engine = engine_with(vec![]).await;
        assert!(matches!(
            engine.player(PLAYER).await,
            Err(EngineError::NotFound { kind: "player", .. })
        ));

        for (id, quest) in [("evt-a", "daily_login"), ("evt-b", "play_5_games")] {
            engine
                .handle(Event {
                    id: id.to_string(),
                    payload: EventPayload::QuestComplete {
                        player: PLAYER.to_string(),
                        quest_id: quest.to_string(),
                        chain: None,
                    },
                    timestamp: now(),
                })
                .await
                .unwrap();
        }
        let view = engine.player(PLAYER).await.unwrap();
        assert_eq!(view.quests_completed, 2);
        assert_eq!(view.quest_xp, 125);
        assert_eq!(view.rewards.iter().map(|r| r.tokens).sum::<u64>(), 250);
        assert_eq!(view.quests[1].quest_id, "play_5_games");
    }

    #[tokio::test]
    async fn test_mixed_case_addresses_share_one_ledger_entry() {
        use crate::events::IntoEvent;
        use chainquest_sdk::objects::webhook::{EvolutionPayload, QuestCompletedPayload};

        let checksummed = "0xAbCd00000000000000000000000000000000EF01";
        let engine = engine_with(vec![Character::seeded(
            "1",
            checksummed,
            CharacterClass::Mage,
            1,
            12_000,
        )])
        .await;

        let evolve = EvolutionPayload {
            event_id: Some("evt-e".to_string()),
            token_id: "1".to_string(),
            owner: checksummed.to_string(),
            old_level: 1,
            new_level: 5,
            chain: None,
        }
        .into_event("digest-e", now())
        .unwrap();
        engine.handle(evolve).await.unwrap();

        let quest = QuestCompletedPayload {
            event_id: Some("evt-q".to_string()),
            player: checksummed.to_ascii_lowercase(),
            quest_id: "daily_login".to_string(),
            chain: None,
        }
        .into_event("digest-q", now())
        .unwrap();
        engine.handle(quest).await.unwrap();

        let upper = engine.player(checksummed).await.unwrap();
        let lower = engine.player(&checksummed.to_ascii_lowercase()).await.unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.address, checksummed.to_ascii_lowercase());
        assert_eq!(upper.rewards.len(), 2);
        assert_eq!(upper.quests_completed, 1);
        assert_eq!(upper.achievements, vec!["Master Trainer"]);

        let daily = engine.daily_quests(checksummed, now()).await.unwrap();
        assert_eq!(daily.quests.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_quest_is_rule_error() {
        let engine = engine_with(vec![]).await;
        let event = Event {
            id: "evt-q".to_string(),
            payload: EventPayload::QuestComplete {
                player: PLAYER.to_string(),
                quest_id: "slay_dragon".to_string(),
                chain: None,
            },
            timestamp: now(),
        };
        assert_eq!(
            engine.handle(event).await,
            Err(EngineError::Rule(RuleError::UnknownQuest(
                "slay_dragon".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_daily_quests_use_highest_owned_level() {
        let engine = engine_with(vec![
            Character::seeded("1", PLAYER, CharacterClass::Mage, 2, 1_000),
            Character::seeded("2", PLAYER, CharacterClass::Mage, 4, 6_000),
        ])
        .await;
        let response = engine.daily_quests(PLAYER, now()).await.unwrap();
        assert_eq!(response.quests.len(), 3);

        let newcomer = engine
            .daily_quests("0x00000000000000000000000000000000000000bb", now())
            .await
            .unwrap();
        assert_eq!(newcomer.quests.len(), 2);

        assert!(matches!(
            engine.daily_quests("bob", now()).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_tournament_lifecycle() {
        let engine = engine_with(vec![]).await;
        engine
            .handle(tournament_event(
                "evt-create",
                TournamentEvent::Created {
                    tournament_id: "t1".to_string(),
                    tournament_type: "daily_skirmish".to_string(),
                    prize_pool: Some(1_000),
                    registration_deadline: None,
                },
            ))
            .await
            .unwrap();

        // Two participants: quota of one battle per round.
        let EventOutcome::BattleRecorded(first) =
            engine.handle(battle("b1", "0xa", "0xb")).await.unwrap()
        else {
            panic!("expected a battle result");
        };
        assert_eq!(first.round, 1);
        assert!(first.round_complete);
        assert_eq!(first.new_round, Some(2));

        // Four participants now: round 2 needs two battles.
        let EventOutcome::BattleRecorded(second) =
            engine.handle(battle("b2", "0xc", "0xd")).await.unwrap()
        else {
            panic!("expected a battle result");
        };
        assert_eq!(second.round, 2);
        assert!(!second.round_complete);

        let view = engine.tournament("t1").await.unwrap();
        assert_eq!(view.status, TournamentStatus::InProgress);
        assert_eq!(view.participants, ["0xa", "0xb", "0xc", "0xd"]);

        let EventOutcome::TournamentCompleted(done) = engine
            .handle(tournament_event(
                "evt-done",
                TournamentEvent::Completed {
                    tournament_id: "t1".to_string(),
                    winners: vec!["0xa".to_string(), "0xc".to_string()],
                    total_prizes: None,
                },
            ))
            .await
            .unwrap()
        else {
            panic!("expected a completion result");
        };
        let amounts: Vec<u64> = done.prize_distribution.iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![500, 250]);
        assert_eq!(done.undistributed, 250);
        assert_eq!(done.achievements.len(), 3);

        let board = engine
            .store()
            .process(GetLeaderboard { limit: 10 })
            .await
            .unwrap();
        assert_eq!(board[0].player, "0xa");
        assert_eq!(board[0].prize_tokens, 500);
        assert_eq!(board[0].wins, 1);

        let late = engine.handle(battle("b3", "0xa", "0xc")).await;
        assert!(matches!(late, Err(EngineError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_battle_for_unknown_tournament() {
        let engine = engine_with(vec![]).await;
        let result = engine.handle(battle("b1", "0xa", "0xb")).await;
        assert!(matches!(
            result,
            Err(EngineError::NotFound { kind: "tournament", .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_tournament_type() {
        let engine = engine_with(vec![]).await;
        assert_eq!(
            engine.create_tournament("mega_bowl", now()).await,
            Err(EngineError::Rule(RuleError::UnknownTournamentType(
                "mega_bowl".to_string()
            )))
        );
        let created = engine.create_tournament("weekly_championship", now()).await.unwrap();
        assert!(created.id.starts_with("tournament_"));
        assert_eq!(created.prize_pool, 1_000);
    }

    #[tokio::test]
    async fn test_registration_and_matchmaking() {
        let engine = engine_with(vec![]).await;
        let tournament = engine.create_tournament("daily_skirmish", now()).await.unwrap();
        let register = |address: &str, chain: &str, attack: u64| RegisterPlayerRequest {
            address: address.to_string(),
            chain: chain.to_string(),
            stats: BTreeMap::from([("attack".to_string(), attack)]),
        };

        engine
            .register_player(&tournament.id, register("0xa", "polygon", 100), now())
            .await
            .unwrap();
        let again = engine
            .register_player(&tournament.id, register("0xa", "polygon", 100), now())
            .await;
        assert!(matches!(again, Err(EngineError::Conflict(_))));

        let lonely = engine
            .matchmake(
                &tournament.id,
                MatchmakingRequest {
                    chain: "polygon".to_string(),
                    stats: BTreeMap::new(),
                },
                now(),
            )
            .await
            .unwrap();
        assert!(!lonely.matched);
        assert_eq!(lonely.waiting_players, Some(1));

        engine
            .register_player(&tournament.id, register("0xb", "arbitrum", 120), now())
            .await
            .unwrap();
        let matched = engine
            .matchmake(
                &tournament.id,
                MatchmakingRequest {
                    chain: "polygon".to_string(),
                    stats: BTreeMap::from([("attack".to_string(), 110)]),
                },
                now(),
            )
            .await
            .unwrap();
        assert!(matched.matched);
        assert_eq!(matched.opponent.map(|o| o.address).as_deref(), Some("0xb"));
        assert_eq!(
            matched.estimated_battle_time,
            Some(now() + Duration::from_secs(300))
        );
    }

    #[tokio::test]
    async fn test_registration_closes_once_in_progress() {
        let engine = engine_with(vec![]).await;
        engine
            .handle(tournament_event(
                "evt-create",
                TournamentEvent::Created {
                    tournament_id: "t1".to_string(),
                    tournament_type: "daily_skirmish".to_string(),
                    prize_pool: None,
                    registration_deadline: None,
                },
            ))
            .await
            .unwrap();
        engine.handle(battle("b1", "0xa", "0xb")).await.unwrap();
        let result = engine
            .register_player(
                "t1",
                RegisterPlayerRequest {
                    address: "0xc".to_string(),
                    chain: "polygon".to_string(),
                    stats: BTreeMap::new(),
                },
                now(),
            )
            .await;
        assert!(matches!(result, Err(EngineError::Conflict(_))));
    }
}
