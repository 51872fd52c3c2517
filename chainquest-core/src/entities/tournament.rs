use std::collections::BTreeMap;
use std::convert::Infallible;

use chainquest_sdk::objects::tournament::{
    BattleView, RegisteredPlayerView, TournamentFormat, TournamentStatus, TournamentView,
};
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::rules::tables::TournamentType;
use crate::store::MemoryStore;

/// A player waiting for cross-chain matchmaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPlayer {
    pub address: String,
    pub chain: String,
    pub stats: BTreeMap<String, u64>,
}

impl RegisteredPlayer {
    pub fn to_view(&self) -> RegisteredPlayerView {
        RegisteredPlayerView {
            address: self.address.clone(),
            chain: self.chain.clone(),
            stats: self.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentRecord {
    pub id: String,
    pub tournament_type: String,
    pub name: String,
    pub status: TournamentStatus,
    pub prize_pool: u64,
    pub max_participants: u32,
    pub entry_fee: u64,
    pub format: TournamentFormat,
    pub registration_deadline: Option<String>,
    pub created_at: OffsetDateTime,
    /// Players seen in battles, in order of first appearance.
    pub participants: Vec<String>,
    pub registered: Vec<RegisteredPlayer>,
    /// 0 until the first battle.
    pub current_round: u32,
    pub completed_at: Option<OffsetDateTime>,
}

impl TournamentRecord {
    /// An open tournament configured from `kind`. `prize_pool` overrides the
    /// type's default pool.
    pub fn open(
        id: impl Into<String>,
        kind: &TournamentType,
        prize_pool: Option<u64>,
        registration_deadline: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            tournament_type: kind.id.to_string(),
            name: kind.name.to_string(),
            status: TournamentStatus::Open,
            prize_pool: prize_pool.unwrap_or(kind.prize_pool),
            max_participants: kind.max_participants,
            entry_fee: kind.entry_fee,
            format: kind.format,
            registration_deadline,
            created_at,
            participants: Vec::new(),
            registered: Vec::new(),
            current_round: 0,
            completed_at: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.registered.len() >= self.max_participants as usize
    }

    /// Add `address` to the participants unless already present.
    pub fn add_participant(&mut self, address: &str) {
        if !self.participants.iter().any(|p| p == address) {
            self.participants.push(address.to_string());
        }
    }

    pub fn to_view(&self) -> TournamentView {
        TournamentView {
            id: self.id.clone(),
            tournament_type: self.tournament_type.clone(),
            name: self.name.clone(),
            status: self.status,
            prize_pool: self.prize_pool,
            max_participants: self.max_participants,
            entry_fee: self.entry_fee,
            format: self.format,
            registration_deadline: self.registration_deadline.clone(),
            created_at: self.created_at,
            participants: self.participants.clone(),
            registered: self.registered.iter().map(RegisteredPlayer::to_view).collect(),
            current_round: self.current_round,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleRecord {
    pub id: String,
    pub tournament_id: String,
    pub winner: String,
    pub loser: String,
    pub round: u32,
    pub recorded_at: OffsetDateTime,
}

impl BattleRecord {
    pub fn to_view(&self) -> BattleView {
        BattleView {
            battle_id: self.id.clone(),
            winner: self.winner.clone(),
            loser: self.loser.clone(),
            round: self.round,
            recorded_at: self.recorded_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetTournament {
    pub id: String,
}

impl Processor<GetTournament> for MemoryStore {
    type Output = Option<TournamentRecord>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:GetTournament")]
    async fn process(&self, query: GetTournament) -> Result<Option<TournamentRecord>, Infallible> {
        Ok(self.read().await.tournaments.get(&query.id).cloned())
    }
}

/// All tournaments, newest first.
#[derive(Debug, Clone, Default)]
pub struct ListTournaments;

impl Processor<ListTournaments> for MemoryStore {
    type Output = Vec<TournamentRecord>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:ListTournaments")]
    async fn process(&self, _: ListTournaments) -> Result<Vec<TournamentRecord>, Infallible> {
        let data = self.read().await;
        let mut all: Vec<_> = data.tournaments.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[derive(Debug, Clone)]
pub struct CountBattlesInRound {
    pub tournament_id: String,
    pub round: u32,
}

impl Processor<CountBattlesInRound> for MemoryStore {
    type Output = usize;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:CountBattlesInRound")]
    async fn process(&self, query: CountBattlesInRound) -> Result<usize, Infallible> {
        let data = self.read().await;
        Ok(data
            .battles
            .iter()
            .filter(|b| b.tournament_id == query.tournament_id && b.round == query.round)
            .count())
    }
}

#[derive(Debug, Clone)]
pub struct ListBattles {
    pub tournament_id: String,
}

impl Processor<ListBattles> for MemoryStore {
    type Output = Vec<BattleRecord>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:ListBattles")]
    async fn process(&self, query: ListBattles) -> Result<Vec<BattleRecord>, Infallible> {
        let data = self.read().await;
        Ok(data
            .battles
            .iter()
            .filter(|b| b.tournament_id == query.tournament_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tables::tournament_type;

    #[test]
    fn test_open_uses_type_defaults_and_override() {
        let kind = tournament_type("weekly_championship").unwrap();
        let now = OffsetDateTime::UNIX_EPOCH;
        let default = TournamentRecord::open("t1", kind, None, None, now);
        assert_eq!(default.prize_pool, 1_000);
        assert_eq!(default.status, TournamentStatus::Open);
        assert_eq!(default.current_round, 0);
        let custom = TournamentRecord::open("t2", kind, Some(5_000), None, now);
        assert_eq!(custom.prize_pool, 5_000);
    }

    #[test]
    fn test_add_participant_dedupes() {
        let kind = tournament_type("daily_skirmish").unwrap();
        let mut t = TournamentRecord::open("t1", kind, None, None, OffsetDateTime::UNIX_EPOCH);
        t.add_participant("0xa");
        t.add_participant("0xb");
        t.add_participant("0xa");
        assert_eq!(t.participants, ["0xa", "0xb"]);
    }
}
