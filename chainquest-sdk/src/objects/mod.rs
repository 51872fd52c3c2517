pub mod character;
pub mod player;
pub mod quest;
pub mod tournament;
pub mod webhook;
pub mod workflow;

use serde::{Deserialize, Serialize};

/// Character classes.
///
/// `rogue` is accepted on input as an alias of `archer`; the frontend used
/// both names for the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Warrior,
    Mage,
    #[serde(alias = "rogue")]
    Archer,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 3] = [
        CharacterClass::Warrior,
        CharacterClass::Mage,
        CharacterClass::Archer,
    ];
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterClass::Warrior => write!(f, "warrior"),
            CharacterClass::Mage => write!(f, "mage"),
            CharacterClass::Archer => write!(f, "archer"),
        }
    }
}

/// Combat attributes of a character. Unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub magic: u32,
}

impl Stats {
    pub const fn new(attack: u32, defense: u32, speed: u32, magic: u32) -> Self {
        Self {
            attack,
            defense,
            speed,
            magic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
    Mythic,
}

/// A reward item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub rarity: Rarity,
}

/// `status` field shared by webhook acks and error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rogue_alias() {
        let class: CharacterClass = serde_json::from_str(r#""rogue""#).unwrap();
        assert_eq!(class, CharacterClass::Archer);
        assert_eq!(serde_json::to_string(&class).unwrap(), r#""archer""#);
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ErrorResponse::new("player not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "error", "message": "player not found" })
        );
    }
}
