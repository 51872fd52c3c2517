use std::collections::BTreeSet;
use std::convert::Infallible;

use chainquest_sdk::objects::tournament::LeaderboardEntry;
use itertools::Itertools;
use kanau::processor::Processor;

use crate::store::MemoryStore;

/// Per-address ledger totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub address: String,
    pub wins: u32,
    pub losses: u32,
    /// Tokens won from tournament prizes.
    pub prize_tokens: u64,
    pub quests_completed: u32,
    /// Experience recorded from quest completions.
    pub quest_xp: u64,
    pub achievements: BTreeSet<String>,
}

impl PlayerRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }
}

/// Additive change to a player's record. Applied inside a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDelta {
    pub address: String,
    pub wins: u32,
    pub losses: u32,
    pub prize_tokens: u64,
    pub quests_completed: u32,
    pub quest_xp: u64,
}

impl PlayerDelta {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub(crate) fn apply(&self, record: &mut PlayerRecord) {
        record.wins = record.wins.saturating_add(self.wins);
        record.losses = record.losses.saturating_add(self.losses);
        record.prize_tokens = record.prize_tokens.saturating_add(self.prize_tokens);
        record.quests_completed = record.quests_completed.saturating_add(self.quests_completed);
        record.quest_xp = record.quest_xp.saturating_add(self.quest_xp);
    }
}

#[derive(Debug, Clone)]
pub struct GetPlayer {
    pub address: String,
}

impl Processor<GetPlayer> for MemoryStore {
    type Output = Option<PlayerRecord>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:GetPlayer")]
    async fn process(&self, query: GetPlayer) -> Result<Option<PlayerRecord>, Infallible> {
        Ok(self.read().await.players.get(&query.address).cloned())
    }
}

/// Players ranked by prize tokens, then wins; address breaks ties.
#[derive(Debug, Clone)]
pub struct GetLeaderboard {
    pub limit: usize,
}

impl Processor<GetLeaderboard> for MemoryStore {
    type Output = Vec<LeaderboardEntry>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:GetLeaderboard")]
    async fn process(&self, query: GetLeaderboard) -> Result<Vec<LeaderboardEntry>, Infallible> {
        let data = self.read().await;
        Ok(data
            .players
            .values()
            .sorted_by(|a, b| {
                b.prize_tokens
                    .cmp(&a.prize_tokens)
                    .then(b.wins.cmp(&a.wins))
                    .then(a.address.cmp(&b.address))
            })
            .take(query.limit)
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i as u32 + 1,
                player: p.address.clone(),
                prize_tokens: p.prize_tokens,
                wins: p.wins,
                losses: p.losses,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_leaderboard_orders_by_prize_then_wins() {
        let store = MemoryStore::new();
        {
            let mut data = store.write().await;
            for (address, prize, wins) in [("0xa", 100, 1), ("0xb", 500, 0), ("0xc", 100, 3)] {
                let mut record = PlayerRecord::new(address);
                PlayerDelta {
                    prize_tokens: prize,
                    wins,
                    ..PlayerDelta::new(address)
                }
                .apply(&mut record);
                data.players.insert(address.to_string(), record);
            }
        }
        let board = store.process(GetLeaderboard { limit: 10 }).await.unwrap();
        let order: Vec<&str> = board.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(order, ["0xb", "0xc", "0xa"]);
        assert_eq!(board[0].rank, 1);

        let top = store.process(GetLeaderboard { limit: 1 }).await.unwrap();
        assert_eq!(top.len(), 1);
    }
}
