//! Static rule tables.

use chainquest_sdk::objects::character::{ClassProfileView, GrowthRatesView, LevelThresholdView};
use chainquest_sdk::objects::quest::{QuestKind, QuestReward, QuestTemplateView};
use chainquest_sdk::objects::tournament::{TournamentFormat, TournamentTypeView};
use chainquest_sdk::objects::{CharacterClass, Rarity, Stats};

/// Tokens granted per level gained.
pub const TOKENS_PER_LEVEL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThreshold {
    pub level: u32,
    pub xp_required: u64,
    pub name: &'static str,
}

impl LevelThreshold {
    pub const fn new(level: u32, xp_required: u64, name: &'static str) -> Self {
        Self {
            level,
            xp_required,
            name,
        }
    }

    pub fn to_view(&self) -> LevelThresholdView {
        LevelThresholdView {
            level: self.level,
            xp_required: self.xp_required,
            name: self.name.to_string(),
        }
    }
}

/// Ordered by level; levels are contiguous from 1.
pub const LEVEL_THRESHOLDS: [LevelThreshold; 10] = [
    LevelThreshold::new(1, 0, "Novice"),
    LevelThreshold::new(2, 1_000, "Apprentice"),
    LevelThreshold::new(3, 3_000, "Journeyman"),
    LevelThreshold::new(4, 6_000, "Expert"),
    LevelThreshold::new(5, 10_000, "Master"),
    LevelThreshold::new(6, 15_000, "Grandmaster"),
    LevelThreshold::new(7, 25_000, "Legend"),
    LevelThreshold::new(8, 40_000, "Mythic"),
    LevelThreshold::new(9, 60_000, "Transcendent"),
    LevelThreshold::new(10, 100_000, "Eternal"),
];

pub const MAX_LEVEL: u32 = 10;

pub fn level_threshold(level: u32) -> Option<&'static LevelThreshold> {
    LEVEL_THRESHOLDS.iter().find(|t| t.level == level)
}

/// Growth multipliers stored in tenths: `12` is a rate of 1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthRates {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub magic: u32,
}

impl GrowthRates {
    pub const fn new(attack: u32, defense: u32, speed: u32, magic: u32) -> Self {
        Self {
            attack,
            defense,
            speed,
            magic,
        }
    }

    pub fn to_view(&self) -> GrowthRatesView {
        let rate = |tenths: u32| f64::from(tenths) / 10.0;
        GrowthRatesView {
            attack: rate(self.attack),
            defense: rate(self.defense),
            speed: rate(self.speed),
            magic: rate(self.magic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassProfile {
    pub class: CharacterClass,
    pub base_stats: Stats,
    pub growth: GrowthRates,
}

impl ClassProfile {
    pub fn to_view(&self) -> ClassProfileView {
        ClassProfileView {
            class: self.class,
            base_stats: self.base_stats,
            growth_rates: self.growth.to_view(),
        }
    }
}

pub const CLASS_PROFILES: [ClassProfile; 3] = [
    ClassProfile {
        class: CharacterClass::Warrior,
        base_stats: Stats::new(100, 120, 80, 60),
        growth: GrowthRates::new(12, 13, 10, 8),
    },
    ClassProfile {
        class: CharacterClass::Mage,
        base_stats: Stats::new(70, 80, 90, 140),
        growth: GrowthRates::new(9, 8, 11, 14),
    },
    ClassProfile {
        class: CharacterClass::Archer,
        base_stats: Stats::new(110, 90, 130, 70),
        growth: GrowthRates::new(13, 9, 13, 9),
    },
];

pub fn class_profile(class: CharacterClass) -> &'static ClassProfile {
    match class {
        CharacterClass::Warrior => &CLASS_PROFILES[0],
        CharacterClass::Mage => &CLASS_PROFILES[1],
        CharacterClass::Archer => &CLASS_PROFILES[2],
    }
}

/// Items granted on reaching exactly `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneItem {
    pub level: u32,
    pub name: &'static str,
    pub rarity: Rarity,
}

impl MilestoneItem {
    pub const fn new(level: u32, name: &'static str, rarity: Rarity) -> Self {
        Self {
            level,
            name,
            rarity,
        }
    }
}

pub const MILESTONE_ITEMS: [MilestoneItem; 3] = [
    MilestoneItem::new(5, "Master's Emblem", Rarity::Rare),
    MilestoneItem::new(7, "Legendary Crest", Rarity::Legendary),
    MilestoneItem::new(10, "Eternal Crown", Rarity::Mythic),
];

/// Achievements granted to the owner on reaching exactly `level`.
pub const EVOLUTION_ACHIEVEMENTS: [(u32, &str); 2] =
    [(5, "Master Trainer"), (10, "Eternal Champion")];

pub const TOURNAMENT_WINNER_ACHIEVEMENT: &str = "Tournament Winner";
pub const CHAMPION_ACHIEVEMENT: &str = "Champion";

/// When an offered quest expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestExpiry {
    EndOfDay,
    EndOfWeek,
}

/// How a template is offered in a player's quest list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestOffer {
    pub target: u32,
    pub min_level: u32,
    pub expiry: QuestExpiry,
}

impl QuestOffer {
    pub const fn new(target: u32, min_level: u32, expiry: QuestExpiry) -> Self {
        Self {
            target,
            min_level,
            expiry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub reward: QuestReward,
    pub kind: QuestKind,
    /// `None` for quests that are never listed, only completed.
    pub offer: Option<QuestOffer>,
    /// Quest ids unlocked by completing this one.
    pub unlocks: &'static [&'static str],
}

impl QuestTemplate {
    pub fn to_view(&self) -> QuestTemplateView {
        QuestTemplateView {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            reward: self.reward,
            kind: self.kind,
        }
    }
}

pub const QUEST_TEMPLATES: [QuestTemplate; 4] = [
    QuestTemplate {
        id: "daily_login",
        name: "Daily Login",
        description: "Log in to the game",
        reward: QuestReward {
            tokens: 50,
            xp: 25,
        },
        kind: QuestKind::Daily,
        offer: Some(QuestOffer::new(1, 1, QuestExpiry::EndOfDay)),
        unlocks: &[],
    },
    QuestTemplate {
        id: "play_5_games",
        name: "Game Master",
        description: "Play 5 games",
        reward: QuestReward {
            tokens: 200,
            xp: 100,
        },
        kind: QuestKind::Daily,
        offer: Some(QuestOffer::new(5, 1, QuestExpiry::EndOfDay)),
        unlocks: &[],
    },
    QuestTemplate {
        id: "win_3_battles",
        name: "Victory Streak",
        description: "Win 3 battles in a row",
        reward: QuestReward {
            tokens: 300,
            xp: 150,
        },
        kind: QuestKind::Weekly,
        offer: Some(QuestOffer::new(3, 3, QuestExpiry::EndOfWeek)),
        unlocks: &[],
    },
    QuestTemplate {
        id: "mint_character",
        name: "Character Creator",
        description: "Mint your first character",
        reward: QuestReward {
            tokens: 500,
            xp: 250,
        },
        kind: QuestKind::Achievement,
        offer: None,
        unlocks: &["play_first_game"],
    },
];

pub fn quest_template(id: &str) -> Option<&'static QuestTemplate> {
    QUEST_TEMPLATES.iter().find(|q| q.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentType {
    pub id: &'static str,
    pub name: &'static str,
    pub duration: &'static str,
    pub max_participants: u32,
    pub entry_fee: u64,
    pub prize_pool: u64,
    pub format: TournamentFormat,
}

impl TournamentType {
    pub fn to_view(&self) -> TournamentTypeView {
        TournamentTypeView {
            id: self.id.to_string(),
            name: self.name.to_string(),
            duration: self.duration.to_string(),
            max_participants: self.max_participants,
            entry_fee: self.entry_fee,
            prize_pool: self.prize_pool,
            format: self.format,
        }
    }
}

pub const TOURNAMENT_TYPES: [TournamentType; 3] = [
    TournamentType {
        id: "weekly_championship",
        name: "Weekly Championship",
        duration: "7d",
        max_participants: 64,
        entry_fee: 50,
        prize_pool: 1_000,
        format: TournamentFormat::Elimination,
    },
    TournamentType {
        id: "daily_skirmish",
        name: "Daily Skirmish",
        duration: "4h",
        max_participants: 16,
        entry_fee: 10,
        prize_pool: 100,
        format: TournamentFormat::RoundRobin,
    },
    TournamentType {
        id: "cross_chain_grand_prix",
        name: "Cross-Chain Grand Prix",
        duration: "30d",
        max_participants: 256,
        entry_fee: 200,
        prize_pool: 10_000,
        format: TournamentFormat::Swiss,
    },
];

pub fn tournament_type(id: &str) -> Option<&'static TournamentType> {
    TOURNAMENT_TYPES.iter().find(|t| t.id == id)
}

/// Prize share per finishing place, in basis points. Places past the end
/// of the table receive nothing.
pub const PRIZE_SPLIT_BPS: [u64; 4] = [5_000, 2_500, 1_500, 1_000];
