//! Grading a margin into a wound.

use serde::{Deserialize, Serialize};

use crate::rules::ResolutionPolicy;
use crate::sheet::{Combatant, Vitality, WoundStage};

/// What an offensive action did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoundResult {
    /// No effect.
    Miss,
    /// Glancing blow; armor or defense lost a point.
    ArmorNotched,
    /// An antagonist lost health but is still standing.
    Wounded {
        /// Health removed.
        amount: u32,
    },
    /// A player character is now staggered.
    Staggered,
    /// A player character is now injured.
    Injured,
    /// A player character is now at death's door.
    DeathsDoor,
    /// The target died.
    Slain,
}

impl WoundResult {
    /// Whether the blow landed at all.
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss | Self::ArmorNotched)
    }
}

impl std::fmt::Display for WoundResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::ArmorNotched => write!(f, "armor notched"),
            Self::Wounded { amount } => write!(f, "wounded ({amount})"),
            Self::Staggered => write!(f, "staggered"),
            Self::Injured => write!(f, "injured"),
            Self::DeathsDoor => write!(f, "at death's door"),
            Self::Slain => write!(f, "slain"),
        }
    }
}

/// Apply a graded margin to the target and report the result.
pub fn apply_margin(policy: &ResolutionPolicy, margin: i32, target: &mut Combatant) -> WoundResult {
    if margin < 0 {
        return WoundResult::Miss;
    }
    let result = if margin < policy.hit_margin {
        match &mut target.vitality {
            Vitality::Pc(track) => {
                track.notch_armor();
            }
            Vitality::Npc(vitals) => {
                vitals.defense.reduce(1);
            }
        }
        WoundResult::ArmorNotched
    } else {
        match &mut target.vitality {
            Vitality::Pc(track) => match track.wound(policy.wound_stages(margin)) {
                WoundStage::Unhurt | WoundStage::Staggered => WoundResult::Staggered,
                WoundStage::Injured => WoundResult::Injured,
                WoundStage::DeathsDoor => WoundResult::DeathsDoor,
                WoundStage::Dead => WoundResult::Slain,
            },
            Vitality::Npc(vitals) => {
                let destroyed = vitals.instant_destruction
                    && policy.destroy_margin.is_some_and(|d| margin >= d);
                if destroyed {
                    vitals.health.deplete();
                    WoundResult::Slain
                } else {
                    let amount = vitals.health.reduce(margin.unsigned_abs());
                    if vitals.health.is_depleted() {
                        WoundResult::Slain
                    } else {
                        WoundResult::Wounded { amount }
                    }
                }
            }
        }
    };
    target.sync_conditions();
    result
}
