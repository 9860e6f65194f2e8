//! The player-character wound track.

use serde::{Deserialize, Serialize};

/// How badly a player character is hurt, from unhurt to dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoundStage {
    /// No wounds.
    Unhurt,
    /// Rattled but fighting.
    Staggered,
    /// Bleeding; checks suffer a penalty.
    Injured,
    /// One more wound is fatal. Cannot act.
    DeathsDoor,
    /// Dead.
    Dead,
}

impl WoundStage {
    /// All stages in order of severity.
    pub fn all() -> &'static [Self] {
        &[
            Self::Unhurt,
            Self::Staggered,
            Self::Injured,
            Self::DeathsDoor,
            Self::Dead,
        ]
    }

    fn index(self) -> usize {
        match self {
            Self::Unhurt => 0,
            Self::Staggered => 1,
            Self::Injured => 2,
            Self::DeathsDoor => 3,
            Self::Dead => 4,
        }
    }

    /// The stage `steps` worse than this one, stopping at `Dead`.
    pub fn worsen(self, steps: u32) -> Self {
        let all = Self::all();
        let index = (self.index() + steps as usize).min(all.len() - 1);
        all[index]
    }

    /// The stage `steps` better than this one, stopping at `Unhurt`.
    /// The dead stay dead.
    pub fn improve(self, steps: u32) -> Self {
        if self == Self::Dead {
            return self;
        }
        Self::all()[self.index().saturating_sub(steps as usize)]
    }
}

impl std::fmt::Display for WoundStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unhurt => write!(f, "unhurt"),
            Self::Staggered => write!(f, "staggered"),
            Self::Injured => write!(f, "injured"),
            Self::DeathsDoor => write!(f, "at death's door"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

/// A player character's wounds and armor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundTrack {
    /// Current wound stage.
    pub stage: WoundStage,
    /// Armor rating, added to the difficulty of attacks against the wearer.
    pub armor: u32,
}

impl WoundTrack {
    /// An unhurt track with the given armor.
    pub fn new(armor: u32) -> Self {
        Self {
            stage: WoundStage::Unhurt,
            armor,
        }
    }

    /// Take `steps` wounds. Returns the new stage.
    pub fn wound(&mut self, steps: u32) -> WoundStage {
        self.stage = self.stage.worsen(steps);
        self.stage
    }

    /// Recover `steps` stages. Returns how many were actually recovered.
    pub fn mend(&mut self, steps: u32) -> u32 {
        let before = self.stage;
        self.stage = self.stage.improve(steps);
        (before.index() - self.stage.index()) as u32
    }

    /// Lose one point of armor. Returns false if there was none left.
    pub fn notch_armor(&mut self) -> bool {
        if self.armor == 0 {
            return false;
        }
        self.armor -= 1;
        true
    }

    /// At death's door or dead.
    pub fn is_incapacitated(&self) -> bool {
        self.stage >= WoundStage::DeathsDoor
    }
}

impl Default for WoundTrack {
    fn default() -> Self {
        Self::new(0)
    }
}
