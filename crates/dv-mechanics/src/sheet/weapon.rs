//! Weapon descriptors.

use serde::{Deserialize, Serialize};

/// What kind of harm a wound represents, for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Fists, clubs, falling masonry.
    #[default]
    Blunt,
    /// Swords and axes.
    Slashing,
    /// Spears, arrows, fangs.
    Piercing,
    /// Spells and curses.
    Arcane,
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blunt => write!(f, "blunt"),
            Self::Slashing => write!(f, "slashing"),
            Self::Piercing => write!(f, "piercing"),
            Self::Arcane => write!(f, "arcane"),
        }
    }
}

/// The weapon an attack is made with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Display name.
    pub name: String,
    /// Added to the card value of attacks made with it.
    pub bonus: i32,
    /// Whether it can strike targets in other zones.
    pub ranged: bool,
    /// The kind of wound it inflicts.
    pub damage_type: DamageType,
}

impl Weapon {
    /// A melee weapon with a bonus.
    pub fn new(name: impl Into<String>, bonus: i32, damage_type: DamageType) -> Self {
        Self {
            name: name.into(),
            bonus,
            ranged: false,
            damage_type,
        }
    }

    /// Bare hands.
    pub fn unarmed() -> Self {
        Self::new("Fists", 0, DamageType::Blunt)
    }

    /// Make this a ranged weapon.
    pub fn ranged(mut self) -> Self {
        self.ranged = true;
        self
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self::unarmed()
    }
}
