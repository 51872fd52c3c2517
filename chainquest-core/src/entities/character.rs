use std::convert::Infallible;

use chainquest_sdk::objects::character::{CharacterView, EvolutionRecord};
use chainquest_sdk::objects::{CharacterClass, Stats};
use itertools::Itertools;
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::events::normalize_address;
use crate::rules::tables::class_profile;
use crate::rules::{EvolutionOutcome, stat_delta};
use crate::store::{MemoryStore, StoreError};

/// A game character (an NFT on chain).
///
/// `level` and `experience` never decrease and `evolution_history` is only
/// appended to; the ledger commit enforces both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: String,
    pub owner: String,
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u64,
    pub stats: Stats,
    pub evolution_history: Vec<EvolutionRecord>,
}

impl Character {
    /// A fresh level 1 character with its class's base stats.
    pub fn new(id: impl Into<String>, owner: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            id: id.into(),
            owner: normalize_address(&owner.into()),
            class,
            level: 1,
            experience: 0,
            stats: class_profile(class).base_stats,
            evolution_history: Vec::new(),
        }
    }

    /// A character already at `level`, with stats grown from the base as if
    /// it had evolved there in one step. No history is recorded.
    pub fn seeded(
        id: impl Into<String>,
        owner: impl Into<String>,
        class: CharacterClass,
        level: u32,
        experience: u64,
    ) -> Self {
        let profile = class_profile(class);
        let gained = stat_delta(level.saturating_sub(1), &profile.growth);
        let base = profile.base_stats;
        Self {
            level,
            experience,
            stats: Stats::new(
                base.attack + gained.attack,
                base.defense + gained.defense,
                base.speed + gained.speed,
                base.magic + gained.magic,
            ),
            ..Self::new(id, owner, class)
        }
    }

    /// The character after applying `outcome`.
    pub fn evolved(&self, outcome: &EvolutionOutcome, at: OffsetDateTime) -> Character {
        let mut next = self.clone();
        next.level = outcome.to_level;
        next.stats = outcome.new_stats;
        next.evolution_history.push(EvolutionRecord {
            from_level: outcome.from_level,
            to_level: outcome.to_level,
            timestamp: at,
            stats_gained: outcome.stats_gained,
        });
        next
    }

    pub fn is_owned_by(&self, address: &str) -> bool {
        self.owner == normalize_address(address)
    }

    pub fn to_view(&self) -> CharacterView {
        CharacterView {
            token_id: self.id.clone(),
            owner: self.owner.clone(),
            class: self.class,
            level: self.level,
            experience: self.experience,
            stats: self.stats,
            evolution_history: self.evolution_history.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetCharacter {
    pub id: String,
}

impl Processor<GetCharacter> for MemoryStore {
    type Output = Option<Character>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:GetCharacter")]
    async fn process(&self, query: GetCharacter) -> Result<Option<Character>, Infallible> {
        Ok(self.read().await.characters.get(&query.id).cloned())
    }
}

/// Characters owned by an address, ordered by id.
#[derive(Debug, Clone)]
pub struct ListCharactersByOwner {
    pub owner: String,
}

impl Processor<ListCharactersByOwner> for MemoryStore {
    type Output = Vec<Character>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:ListCharactersByOwner")]
    async fn process(&self, query: ListCharactersByOwner) -> Result<Vec<Character>, Infallible> {
        let data = self.read().await;
        Ok(data
            .characters
            .values()
            .filter(|c| c.is_owned_by(&query.owner))
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .cloned()
            .collect())
    }
}

/// Insert a new character. Fails if the id is taken. The owner is stored
/// normalized.
#[derive(Debug, Clone)]
pub struct InsertCharacter {
    pub character: Character,
}

impl Processor<InsertCharacter> for MemoryStore {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "STORE:InsertCharacter")]
    async fn process(&self, query: InsertCharacter) -> Result<(), StoreError> {
        let mut data = self.write().await;
        let id = query.character.id.clone();
        if data.characters.contains_key(&id) {
            return Err(StoreError::CharacterExists(id));
        }
        let mut character = query.character;
        character.owner = normalize_address(&character.owner);
        data.characters.insert(id, character);
        Ok(())
    }
}
