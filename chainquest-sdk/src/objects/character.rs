//! Character progression request and response types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{CharacterClass, Item, Stats};

/// One applied level transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRecord {
    pub from_level: u32,
    pub to_level: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub stats_gained: Stats,
}

/// Current state of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub token_id: String,
    pub owner: String,
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u64,
    pub stats: Stats,
    pub evolution_history: Vec<EvolutionRecord>,
}

/// Rewards granted for an evolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRewards {
    pub tokens: u64,
    pub xp: u64,
    pub items: Vec<Item>,
}

/// Result of an applied evolution webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionResult {
    pub token_id: String,
    pub owner: String,
    pub old_level: u32,
    pub new_level: u32,
    pub old_stats: Stats,
    pub new_stats: Stats,
    pub rewards: EvolutionRewards,
    pub evolution_name: String,
    pub achievements: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    MaxLevelReached,
    InsufficientExperience,
}

/// Evolution eligibility as reported to callers.
///
/// Flat on the wire: `eligible` decides which optional fields are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionEligibility {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibleReason>,
    pub current_level: u32,
    #[serde(rename = "currentXP")]
    pub current_xp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(rename = "requiredXP", default, skip_serializing_if = "Option::is_none")]
    pub required_xp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_needed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_name: Option<String>,
}

/// Query string of `GET /api/characters/{id}/evolution/check`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EligibilityQuery {
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub token_id: String,
    pub owner: String,
    pub eligibility: EvolutionEligibility,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Body of `POST /api/characters/{id}/evolve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolveRequest {
    #[serde(default)]
    pub owner: Option<String>,
}

/// A row of the level threshold table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelThresholdView {
    pub level: u32,
    pub xp_required: u64,
    pub name: String,
}

/// Per-attribute growth multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthRatesView {
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub magic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProfileView {
    pub class: CharacterClass,
    pub base_stats: Stats,
    pub growth_rates: GrowthRatesView,
}
