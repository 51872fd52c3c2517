//! Rule evaluator.
//!
//! Pure functions over the static rule tables. Nothing in here touches a
//! store: the engine reads state, asks the evaluator for an outcome, and
//! commits the outcome as a whole or not at all.

mod evolution;
mod quest;
pub mod tables;
mod tournament;

pub use evolution::{
    Eligibility, EvolutionOutcome, check_evolution_eligibility, evaluate_evolution, stat_delta,
};
pub use quest::{QuestEvaluation, daily_quests, end_of_day, end_of_week, evaluate_quest_completion};
pub use tournament::{
    evaluate_prize_distribution, find_best_match, generate_tournament_id, round_quota,
    undistributed,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid level transition {from} -> {to}")]
    InvalidLevel { from: u32, to: u32 },
    #[error("unknown quest: {0}")]
    UnknownQuest(String),
    #[error("unknown tournament type: {0}")]
    UnknownTournamentType(String),
}
