use chainquest_sdk::objects::character::{EvolutionEligibility, IneligibleReason};
use chainquest_sdk::objects::{Item, Stats};

use super::RuleError;
use super::tables::{
    EVOLUTION_ACHIEVEMENTS, GrowthRates, MILESTONE_ITEMS, TOKENS_PER_LEVEL, class_profile,
    level_threshold,
};
use crate::entities::character::Character;

/// Everything an evolution produces, computed before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionOutcome {
    pub from_level: u32,
    pub to_level: u32,
    pub new_stats: Stats,
    pub stats_gained: Stats,
    pub tokens: u64,
    pub items: Vec<Item>,
    pub achievements: Vec<&'static str>,
    pub evolution_name: &'static str,
}

/// Stat gain for `levels` levels at the given growth rates.
///
/// Per attribute `floor(levels * 10 * rate)`; with rates held in tenths the
/// product is already integral.
pub fn stat_delta(levels: u32, growth: &GrowthRates) -> Stats {
    let gain = |tenths: u32| levels.saturating_mul(10).saturating_mul(tenths) / 10;
    Stats::new(
        gain(growth.attack),
        gain(growth.defense),
        gain(growth.speed),
        gain(growth.magic),
    )
}

fn add_stats(a: &Stats, b: &Stats) -> Stats {
    Stats::new(
        a.attack.saturating_add(b.attack),
        a.defense.saturating_add(b.defense),
        a.speed.saturating_add(b.speed),
        a.magic.saturating_add(b.magic),
    )
}

/// Compute the outcome of moving `character` from `from_level` to `to_level`.
///
/// Requires `1 <= from_level < to_level` with `to_level` in the threshold
/// table. Does not look at experience: eligibility is a separate check.
pub fn evaluate_evolution(
    character: &Character,
    from_level: u32,
    to_level: u32,
) -> Result<EvolutionOutcome, RuleError> {
    let invalid = RuleError::InvalidLevel {
        from: from_level,
        to: to_level,
    };
    if from_level < 1 || to_level <= from_level {
        return Err(invalid);
    }
    let target = level_threshold(to_level).ok_or(invalid)?;

    let levels = to_level - from_level;
    let stats_gained = stat_delta(levels, &class_profile(character.class).growth);

    let items = MILESTONE_ITEMS
        .iter()
        .filter(|m| m.level == to_level)
        .map(|m| Item {
            name: m.name.to_string(),
            rarity: m.rarity,
        })
        .collect();
    let achievements = EVOLUTION_ACHIEVEMENTS
        .iter()
        .filter(|(level, _)| *level == to_level)
        .map(|(_, name)| *name)
        .collect();

    Ok(EvolutionOutcome {
        from_level,
        to_level,
        new_stats: add_stats(&character.stats, &stats_gained),
        stats_gained,
        tokens: u64::from(levels) * TOKENS_PER_LEVEL,
        items,
        achievements,
        evolution_name: target.name,
    })
}

/// Whether a character can move to the next level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible {
        current_level: u32,
        current_xp: u64,
        new_level: u32,
        required_xp: u64,
        new_stats: Stats,
        evolution_name: &'static str,
    },
    MaxLevelReached {
        current_level: u32,
        current_xp: u64,
    },
    InsufficientExperience {
        current_level: u32,
        current_xp: u64,
        required_xp: u64,
        xp_needed: u64,
    },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }

    pub fn to_view(&self) -> EvolutionEligibility {
        match *self {
            Eligibility::Eligible {
                current_level,
                current_xp,
                new_level,
                required_xp,
                new_stats,
                evolution_name,
            } => EvolutionEligibility {
                eligible: true,
                reason: None,
                current_level,
                current_xp,
                new_level: Some(new_level),
                required_xp: Some(required_xp),
                xp_needed: None,
                new_stats: Some(new_stats),
                evolution_name: Some(evolution_name.to_string()),
            },
            Eligibility::MaxLevelReached {
                current_level,
                current_xp,
            } => EvolutionEligibility {
                eligible: false,
                reason: Some(IneligibleReason::MaxLevelReached),
                current_level,
                current_xp,
                new_level: None,
                required_xp: None,
                xp_needed: None,
                new_stats: None,
                evolution_name: None,
            },
            Eligibility::InsufficientExperience {
                current_level,
                current_xp,
                required_xp,
                xp_needed,
            } => EvolutionEligibility {
                eligible: false,
                reason: Some(IneligibleReason::InsufficientExperience),
                current_level,
                current_xp,
                new_level: None,
                required_xp: Some(required_xp),
                xp_needed: Some(xp_needed),
                new_stats: None,
                evolution_name: None,
            },
        }
    }
}

/// Read-only check against the next level's threshold.
pub fn check_evolution_eligibility(character: &Character) -> Eligibility {
    let current_level = character.level;
    let current_xp = character.experience;
    let next_level = current_level.saturating_add(1);

    let Some(next) = level_threshold(next_level) else {
        return Eligibility::MaxLevelReached {
            current_level,
            current_xp,
        };
    };

    if current_xp < next.xp_required {
        return Eligibility::InsufficientExperience {
            current_level,
            current_xp,
            required_xp: next.xp_required,
            xp_needed: next.xp_required - current_xp,
        };
    }

    let gained = stat_delta(1, &class_profile(character.class).growth);
    Eligibility::Eligible {
        current_level,
        current_xp,
        new_level: next_level,
        required_xp: next.xp_required,
        new_stats: add_stats(&character.stats, &gained),
        evolution_name: next.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainquest_sdk::objects::{CharacterClass, Rarity};

    fn warrior() -> Character {
        Character::new("1", "0xowner", CharacterClass::Warrior)
    }

    #[test]
    fn test_warrior_one_to_three_attack() {
        let outcome = evaluate_evolution(&warrior(), 1, 3).unwrap();
        assert_eq!(outcome.stats_gained.attack, 24);
        assert_eq!(outcome.new_stats.attack, 124);
        assert_eq!(outcome.stats_gained, Stats::new(24, 26, 20, 16));
        assert_eq!(outcome.tokens, 200);
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.evolution_name, "Journeyman");
    }

    #[test]
    fn test_stat_delta_matches_decimal_formula() {
        for class in CharacterClass::ALL {
            let growth = class_profile(class).growth;
            let view = growth.to_view();
            for levels in 1..=9u32 {
                let delta = stat_delta(levels, &growth);
                let expected = (f64::from(levels) * 10.0 * view.attack + 1e-9).floor() as u32;
                assert_eq!(delta.attack, expected, "{class} {levels}");
                let expected = (f64::from(levels) * 10.0 * view.magic + 1e-9).floor() as u32;
                assert_eq!(delta.magic, expected, "{class} {levels}");
            }
        }
    }

    #[test]
    fn test_one_to_five_grants_only_masters_emblem() {
        let outcome = evaluate_evolution(&warrior(), 1, 5).unwrap();
        assert_eq!(outcome.tokens, 400);
        assert_eq!(
            outcome.items,
            vec![Item {
                name: "Master's Emblem".to_string(),
                rarity: Rarity::Rare
            }]
        );
        assert_eq!(outcome.achievements, vec!["Master Trainer"]);
    }

    #[test]
    fn test_skipped_milestones_are_not_retroactive() {
        let mut character = warrior();
        character.level = 4;
        let outcome = evaluate_evolution(&character, 4, 8).unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.achievements.is_empty());
    }

    #[test]
    fn test_eternal_crown_at_ten() {
        let outcome = evaluate_evolution(&warrior(), 9, 10).unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].rarity, Rarity::Mythic);
        assert_eq!(outcome.achievements, vec!["Eternal Champion"]);
    }

    #[test]
    fn test_invalid_levels() {
        let c = warrior();
        assert_eq!(
            evaluate_evolution(&c, 3, 3),
            Err(RuleError::InvalidLevel { from: 3, to: 3 })
        );
        assert_eq!(
            evaluate_evolution(&c, 3, 2),
            Err(RuleError::InvalidLevel { from: 3, to: 2 })
        );
        assert_eq!(
            evaluate_evolution(&c, 0, 2),
            Err(RuleError::InvalidLevel { from: 0, to: 2 })
        );
        assert_eq!(
            evaluate_evolution(&c, 9, 11),
            Err(RuleError::InvalidLevel { from: 9, to: 11 })
        );
    }

    #[test]
    fn test_eligibility_at_1500_xp() {
        let mut c = warrior();
        c.experience = 1_500;
        let eligibility = check_evolution_eligibility(&c);
        assert!(eligibility.is_eligible());
        let view = eligibility.to_view();
        assert_eq!(view.new_level, Some(2));
        assert_eq!(view.evolution_name.as_deref(), Some("Apprentice"));
        assert_eq!(view.new_stats.map(|s| s.attack), Some(112));
    }

    #[test]
    fn test_ineligible_at_500_xp() {
        let mut c = warrior();
        c.experience = 500;
        assert_eq!(
            check_evolution_eligibility(&c),
            Eligibility::InsufficientExperience {
                current_level: 1,
                current_xp: 500,
                required_xp: 1_000,
                xp_needed: 500,
            }
        );
    }

    #[test]
    fn test_max_level_is_not_an_error() {
        let mut c = warrior();
        c.level = 10;
        c.experience = 1_000_000;
        let eligibility = check_evolution_eligibility(&c);
        assert!(matches!(eligibility, Eligibility::MaxLevelReached { .. }));
        assert_eq!(
            eligibility.to_view().reason,
            Some(IneligibleReason::MaxLevelReached)
        );
    }
}
