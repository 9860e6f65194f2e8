//! Numeric pools (health, defense) for antagonists.
//!
//! A track counts down from its maximum as it absorbs harm and never
//! drops below zero or rises above its maximum.

use serde::{Deserialize, Serialize};

/// A named pool clamped to `0..=max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name of the track.
    pub name: String,
    /// Current value.
    pub current: u32,
    /// Maximum value.
    pub max: u32,
}

impl Track {
    /// Create a full track.
    pub fn new(name: impl Into<String>, max: u32) -> Self {
        Self {
            name: name.into(),
            current: max,
            max,
        }
    }

    /// Remove up to `amount`. Returns how much was actually removed.
    pub fn reduce(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }

    /// Add up to `amount` without exceeding the maximum. Returns how much
    /// was actually restored.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let given = amount.min(self.max - self.current);
        self.current += given;
        given
    }

    /// Empty the track.
    pub fn deplete(&mut self) {
        self.current = 0;
    }

    /// Returns true if nothing is left.
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Returns the fraction of the track that is filled (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.max)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{}", self.name, self.current, self.max)
    }
}
