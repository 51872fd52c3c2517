//! In-memory entity and ledger store.
//!
//! Queries are plain structs; each is answered by a
//! `kanau::processor::Processor` impl on [`MemoryStore`] living next to the
//! entity it reads or writes (see `crate::entities`). The engine only sees
//! the [`EntityStore`] and [`LedgerStore`] bundles, so another backend can
//! stand in by implementing the same queries.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use kanau::processor::Processor;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entities::character::{Character, GetCharacter, ListCharactersByOwner};
use crate::entities::ledger::{AppliedEvent, CommitReceipt, CommitTransition, IsEventApplied};
use crate::entities::player::{GetPlayer, PlayerRecord};
use crate::entities::quest::{ListQuestCompletions, QuestCompletion};
use crate::entities::reward::{ListRewardGrants, RewardGrant};
use crate::entities::tournament::{
    BattleRecord, CountBattlesInRound, GetTournament, TournamentRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("event already applied: {0}")]
    DuplicateEvent(String),
    #[error("character {id} would regress: {detail}")]
    NonMonotonic { id: String, detail: &'static str },
    #[error("tournament already completed: {0}")]
    TournamentClosed(String),
    #[error("character already exists: {0}")]
    CharacterExists(String),
}

#[derive(Debug, Default)]
pub(crate) struct StoreData {
    pub(crate) characters: HashMap<String, Character>,
    pub(crate) tournaments: HashMap<String, TournamentRecord>,
    pub(crate) battles: Vec<BattleRecord>,
    pub(crate) grants: Vec<RewardGrant>,
    pub(crate) players: HashMap<String, PlayerRecord>,
    pub(crate) quest_completions: Vec<QuestCompletion>,
    pub(crate) applied_events: HashMap<String, AppliedEvent>,
}

/// Cloneable handle; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.data.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.data.write().await
    }
}

/// Entity reads the engine depends on.
pub trait EntityStore:
    Processor<GetCharacter, Output = Option<Character>, Error = Infallible>
    + Processor<ListCharactersByOwner, Output = Vec<Character>, Error = Infallible>
    + Processor<GetTournament, Output = Option<TournamentRecord>, Error = Infallible>
    + Processor<CountBattlesInRound, Output = usize, Error = Infallible>
    + Send
    + Sync
{
}

impl<T> EntityStore for T where
    T: Processor<GetCharacter, Output = Option<Character>, Error = Infallible>
        + Processor<ListCharactersByOwner, Output = Vec<Character>, Error = Infallible>
        + Processor<GetTournament, Output = Option<TournamentRecord>, Error = Infallible>
        + Processor<CountBattlesInRound, Output = usize, Error = Infallible>
        + Send
        + Sync
{
}

/// Idempotency ledger, atomic commit, and the per-player ledger reads.
pub trait LedgerStore:
    Processor<IsEventApplied, Output = bool, Error = Infallible>
    + Processor<CommitTransition, Output = CommitReceipt, Error = StoreError>
    + Processor<GetPlayer, Output = Option<PlayerRecord>, Error = Infallible>
    + Processor<ListRewardGrants, Output = Vec<RewardGrant>, Error = Infallible>
    + Processor<ListQuestCompletions, Output = Vec<QuestCompletion>, Error = Infallible>
    + Send
    + Sync
{
}

impl<T> LedgerStore for T where
    T: Processor<IsEventApplied, Output = bool, Error = Infallible>
        + Processor<CommitTransition, Output = CommitReceipt, Error = StoreError>
        + Processor<GetPlayer, Output = Option<PlayerRecord>, Error = Infallible>
        + Processor<ListRewardGrants, Output = Vec<RewardGrant>, Error = Infallible>
        + Processor<ListQuestCompletions, Output = Vec<QuestCompletion>, Error = Infallible>
        + Send
        + Sync
{
}
