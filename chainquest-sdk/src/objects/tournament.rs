//! Tournament, matchmaking and leaderboard types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Open,
    InProgress,
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Open => write!(f, "open"),
            TournamentStatus::InProgress => write!(f, "in_progress"),
            TournamentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    Elimination,
    RoundRobin,
    Swiss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentTypeView {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub max_participants: u32,
    pub entry_fee: u64,
    pub prize_pool: u64,
    pub format: TournamentFormat,
}

/// A player registered for matchmaking.
///
/// `stats` is an open attribute map; matchmaking compares attribute totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredPlayerView {
    pub address: String,
    pub chain: String,
    pub stats: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentView {
    pub id: String,
    #[serde(rename = "type")]
    pub tournament_type: String,
    pub name: String,
    pub status: TournamentStatus,
    pub prize_pool: u64,
    pub max_participants: u32,
    pub entry_fee: u64,
    pub format: TournamentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub participants: Vec<String>,
    pub registered: Vec<RegisteredPlayerView>,
    pub current_round: u32,
}

/// Result of a processed battle-result webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResultView {
    pub battle_id: String,
    pub tournament_id: String,
    pub winner: String,
    pub loser: String,
    pub round: u32,
    pub round_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_round: Option<u32>,
}

/// A recorded battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleView {
    pub battle_id: String,
    pub winner: String,
    pub loser: String,
    pub round: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// One winner's share of a prize pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeShare {
    pub recipient: String,
    pub place: u32,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AchievementAward {
    pub player: String,
    pub achievement: String,
}

/// Result of a processed tournament-completed webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentCompletionResult {
    pub tournament_id: String,
    pub status: TournamentStatus,
    pub winners: Vec<String>,
    pub prize_distribution: Vec<PrizeShare>,
    /// Tokens lost to floor rounding; never redistributed.
    pub undistributed: u64,
    pub achievements: Vec<AchievementAward>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

/// Body of `POST /api/tournaments/create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTournamentRequest {
    #[serde(rename = "type", default)]
    pub tournament_type: Option<String>,
}

/// Body of `POST /api/tournaments/{id}/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPlayerRequest {
    pub address: String,
    pub chain: String,
    #[serde(default)]
    pub stats: BTreeMap<String, u64>,
}

/// Body of `POST /api/tournaments/{id}/matchmaking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchmakingRequest {
    pub chain: String,
    #[serde(default)]
    pub stats: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingResponse {
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<RegisteredPlayerView>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_battle_time: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_players: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player: String,
    pub prize_tokens: u64,
    pub wins: u32,
    pub losses: u32,
}
