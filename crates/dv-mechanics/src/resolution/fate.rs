//! Tests of Fate.
//!
//! Some actions are too uncertain for a single card. They pause after
//! validation until a second card, the fate card, is turned over. A high
//! fate card pushes the margin up, a low one pushes it down, and The Fool
//! spoils the attempt outright.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::rules::ResolutionPolicy;

/// How a fate card fell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FateOutcome {
    /// At or above the threshold.
    Favorable,
    /// Below the threshold.
    Unfavorable,
    /// The Fool: automatic failure.
    Doomed,
}

impl FateOutcome {
    /// Read a fate card against a policy.
    pub fn read(policy: &ResolutionPolicy, card: &Card) -> Self {
        if card.is_fool() {
            Self::Doomed
        } else if card.value() >= policy.fate_threshold {
            Self::Favorable
        } else {
            Self::Unfavorable
        }
    }

    /// Margin adjustment, or `None` when the attempt fails regardless.
    pub fn adjustment(self, policy: &ResolutionPolicy) -> Option<i32> {
        match self {
            Self::Favorable => Some(policy.fate_swing),
            Self::Unfavorable => Some(-policy.fate_swing),
            Self::Doomed => None,
        }
    }
}

impl std::fmt::Display for FateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Favorable => write!(f, "favorable"),
            Self::Unfavorable => write!(f, "unfavorable"),
            Self::Doomed => write!(f, "doomed"),
        }
    }
}
