//! Journal entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{ChallengeEvent, Outcome};

/// A single entry in the challenge journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum JournalEntry {
    /// A challenge began.
    Opening {
        /// Who faces whom.
        text: String,
        /// When it began.
        timestamp: DateTime<Utc>,
    },
    /// A round's initiative order.
    Initiative {
        /// Round number.
        round: u32,
        /// The order, described.
        text: String,
        /// When revealed.
        timestamp: DateTime<Utc>,
    },
    /// Something a combatant did, or had done to them.
    Beat {
        /// Round number.
        round: u32,
        /// What happened.
        text: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A round finished.
    RoundEnd {
        /// Round number.
        round: u32,
        /// When it finished.
        timestamp: DateTime<Utc>,
    },
    /// The challenge ended.
    Closing {
        /// How it ended.
        outcome: Outcome,
        /// The final round.
        round: u32,
        /// Description.
        text: String,
        /// When it ended.
        timestamp: DateTime<Utc>,
    },
    /// A note from the table.
    Note {
        /// The note text.
        text: String,
        /// When recorded.
        timestamp: DateTime<Utc>,
    },
}

impl JournalEntry {
    /// When the entry was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Opening { timestamp, .. }
            | Self::Initiative { timestamp, .. }
            | Self::Beat { timestamp, .. }
            | Self::RoundEnd { timestamp, .. }
            | Self::Closing { timestamp, .. }
            | Self::Note { timestamp, .. } => *timestamp,
        }
    }

    /// Whether an event is worth a journal line. Phase changes and deck
    /// bookkeeping are left out.
    pub fn is_notable(event: &ChallengeEvent) -> bool {
        !matches!(
            event,
            ChallengeEvent::PhaseChanged { .. }
                | ChallengeEvent::DeckReshuffled { .. }
                | ChallengeEvent::Activated { .. }
        )
    }
}
