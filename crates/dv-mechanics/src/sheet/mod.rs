//! Combatant sheets.
//!
//! Player characters and antagonists share one [`Combatant`] shape but
//! carry different health models: player characters walk down a
//! [`WoundTrack`] of named stages, antagonists lose points from numeric
//! health and defense pools. The [`Vitality`] variant keeps each kind to
//! the fields that make sense for it.

pub mod roster;
pub mod track;
pub mod weapon;
pub mod wounds;

pub use roster::Roster;
pub use track::Track;
pub use weapon::{DamageType, Weapon};
pub use wounds::{WoundStage, WoundTrack};

use std::collections::BTreeSet;

use dv_core::{CombatantId, ZoneId};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Hand};

/// Which side of the table controls a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatantKind {
    /// A player character.
    Pc,
    /// A GM-controlled antagonist.
    Npc,
}

impl std::fmt::Display for CombatantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pc => write!(f, "PC"),
            Self::Npc => write!(f, "NPC"),
        }
    }
}

/// Status flags shown on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Out of the fight for good.
    Dead,
    /// Shaken by a wound.
    Staggered,
    /// Badly hurt; checks suffer a penalty.
    Injured,
    /// One more wound is fatal.
    DeathsDoor,
    /// Left the encounter.
    Fled,
    /// Braced against attacks until the next activation.
    Guarded,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dead => write!(f, "dead"),
            Self::Staggered => write!(f, "staggered"),
            Self::Injured => write!(f, "injured"),
            Self::DeathsDoor => write!(f, "deaths_door"),
            Self::Fled => write!(f, "fled"),
            Self::Guarded => write!(f, "guarded"),
        }
    }
}

/// Health and defense pools of an antagonist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcVitals {
    /// Hits it can take before it falls.
    pub health: Track,
    /// Added to the difficulty of attacks against it; notched by glancing blows.
    pub defense: Track,
    /// Whether a strong enough hit destroys it outright.
    pub instant_destruction: bool,
    /// Willingness to keep fighting. It flees when this runs out while badly hurt.
    pub morale: i32,
}

/// The health model of a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vitality {
    /// Player-character wound track.
    Pc(WoundTrack),
    /// Antagonist pools.
    Npc(NpcVitals),
}

/// A participant in a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    /// Unique identifier.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// The zone the combatant stands in.
    pub zone: ZoneId,
    /// Wounds or pools.
    pub vitality: Vitality,
    /// Equipped weapon.
    pub weapon: Weapon,
    /// Cards held (player characters).
    pub hand: Hand,
    /// Names of carried items, for display.
    pub inventory: Vec<String>,
    conditions: BTreeSet<Condition>,
}

impl Combatant {
    /// Create an unhurt, unarmored player character.
    pub fn pc(name: impl Into<String>, zone: impl Into<ZoneId>) -> Self {
        Self::with_vitality(name, zone, Vitality::Pc(WoundTrack::default()))
    }

    /// Create an antagonist with the given health and defense pools.
    pub fn npc(name: impl Into<String>, zone: impl Into<ZoneId>, health: u32, defense: u32) -> Self {
        Self::with_vitality(
            name,
            zone,
            Vitality::Npc(NpcVitals {
                health: Track::new("Health", health),
                defense: Track::new("Defense", defense),
                instant_destruction: false,
                morale: 1,
            }),
        )
    }

    fn with_vitality(name: impl Into<String>, zone: impl Into<ZoneId>, vitality: Vitality) -> Self {
        Self {
            id: CombatantId::new(),
            name: name.into(),
            zone: zone.into(),
            vitality,
            weapon: Weapon::unarmed(),
            hand: Hand::new(),
            inventory: Vec::new(),
            conditions: BTreeSet::new(),
        }
    }

    /// Equip a weapon.
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = weapon;
        self
    }

    /// Set a player character's armor. Ignored for antagonists.
    pub fn with_armor(mut self, armor: u32) -> Self {
        if let Vitality::Pc(track) = &mut self.vitality {
            track.armor = armor;
        }
        self
    }

    /// Give the combatant cards to hold.
    pub fn with_hand(mut self, cards: Vec<Card>) -> Self {
        self.hand = Hand::from_cards(cards);
        self
    }

    /// Set an antagonist's morale. Ignored for player characters.
    pub fn with_morale(mut self, morale: i32) -> Self {
        if let Vitality::Npc(vitals) = &mut self.vitality {
            vitals.morale = morale;
        }
        self
    }

    /// Let strong hits destroy this antagonist outright.
    pub fn with_instant_destruction(mut self) -> Self {
        if let Vitality::Npc(vitals) = &mut self.vitality {
            vitals.instant_destruction = true;
        }
        self
    }

    /// Add an inventory entry.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.inventory.push(item.into());
        self
    }

    /// Which side controls this combatant.
    pub fn kind(&self) -> CombatantKind {
        match self.vitality {
            Vitality::Pc(_) => CombatantKind::Pc,
            Vitality::Npc(_) => CombatantKind::Npc,
        }
    }

    /// Returns true for player characters.
    pub fn is_pc(&self) -> bool {
        self.kind() == CombatantKind::Pc
    }

    /// Returns true for antagonists.
    pub fn is_npc(&self) -> bool {
        self.kind() == CombatantKind::Npc
    }

    /// Returns true if both are on the same side.
    pub fn is_ally_of(&self, other: &Combatant) -> bool {
        self.kind() == other.kind()
    }

    /// Current conditions.
    pub fn conditions(&self) -> &BTreeSet<Condition> {
        &self.conditions
    }

    /// Returns true if the condition is set.
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Set a condition.
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.insert(condition);
    }

    /// Clear a condition. Returns true if it was set.
    pub fn remove_condition(&mut self, condition: Condition) -> bool {
        self.conditions.remove(&condition)
    }

    /// Returns true if dead.
    pub fn is_dead(&self) -> bool {
        self.has(Condition::Dead)
    }

    /// Returns true if the combatant left the encounter.
    pub fn has_fled(&self) -> bool {
        self.has(Condition::Fled)
    }

    /// Dead, or (for player characters) at death's door.
    pub fn is_incapacitated(&self) -> bool {
        match &self.vitality {
            Vitality::Pc(track) => track.is_incapacitated(),
            Vitality::Npc(vitals) => vitals.health.is_depleted(),
        }
    }

    /// Able to take actions this round.
    pub fn can_act(&self) -> bool {
        !self.is_dead() && !self.is_incapacitated() && !self.has_fled()
    }

    /// Still present and alive, so it can be the target of an action.
    pub fn is_targetable(&self) -> bool {
        !self.is_dead() && !self.has_fled()
    }

    /// The current wound stage of a player character.
    pub fn wound_stage(&self) -> Option<WoundStage> {
        match &self.vitality {
            Vitality::Pc(track) => Some(track.stage),
            Vitality::Npc(_) => None,
        }
    }

    /// The health pool of an antagonist.
    pub fn health(&self) -> Option<&Track> {
        match &self.vitality {
            Vitality::Pc(_) => None,
            Vitality::Npc(vitals) => Some(&vitals.health),
        }
    }

    /// An antagonist's morale.
    pub fn morale(&self) -> Option<i32> {
        match &self.vitality {
            Vitality::Pc(_) => None,
            Vitality::Npc(vitals) => Some(vitals.morale),
        }
    }

    /// Armor (player characters) or remaining defense (antagonists).
    pub fn defense(&self) -> u32 {
        match &self.vitality {
            Vitality::Pc(track) => track.armor,
            Vitality::Npc(vitals) => vitals.defense.current,
        }
    }

    /// Modifier applied to this combatant's own checks.
    pub fn check_penalty(&self) -> i32 {
        if self.has(Condition::Injured) { -1 } else { 0 }
    }

    /// Recompute the wound conditions from the health model.
    pub fn sync_conditions(&mut self) {
        for c in [
            Condition::Dead,
            Condition::Staggered,
            Condition::Injured,
            Condition::DeathsDoor,
        ] {
            self.conditions.remove(&c);
        }
        let derived = match &self.vitality {
            Vitality::Pc(track) => match track.stage {
                WoundStage::Unhurt => None,
                WoundStage::Staggered => Some(Condition::Staggered),
                WoundStage::Injured => Some(Condition::Injured),
                WoundStage::DeathsDoor => Some(Condition::DeathsDoor),
                WoundStage::Dead => Some(Condition::Dead),
            },
            Vitality::Npc(vitals) => {
                if vitals.health.is_depleted() {
                    Some(Condition::Dead)
                } else if vitals.health.fraction() <= 0.5 {
                    Some(Condition::Staggered)
                } else {
                    None
                }
            }
        };
        if let Some(c) = derived {
            self.conditions.insert(c);
        }
    }

    /// One-line status for logs and tables.
    pub fn status_line(&self) -> String {
        let health = match &self.vitality {
            Vitality::Pc(track) => format!("{} (armor {})", track.stage, track.armor),
            Vitality::Npc(vitals) => format!("{}, {}", vitals.health, vitals.defense),
        };
        if self.has_fled() {
            format!("{} [{}] fled", self.name, self.kind())
        } else {
            format!("{} [{}] in {}: {health}", self.name, self.kind(), self.zone)
        }
    }
}
