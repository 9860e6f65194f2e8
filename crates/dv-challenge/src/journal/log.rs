//! Journal storage and export.

use chrono::Utc;
use dv_mechanics::Roster;
use serde::{Deserialize, Serialize};

use super::entry::JournalEntry;
use crate::events::ChallengeEvent;

/// A chronological log of a challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    round: u32,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the journal.
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Record a challenge event, naming combatants from the roster.
    /// Returns false if the event was not worth an entry.
    pub fn record(&mut self, event: &ChallengeEvent, roster: &Roster) -> bool {
        if !JournalEntry::is_notable(event) {
            return false;
        }
        let timestamp = Utc::now();
        let text = event.describe(roster);
        let entry = match event {
            ChallengeEvent::Started { .. } => {
                self.round = 1;
                JournalEntry::Opening { text, timestamp }
            }
            ChallengeEvent::InitiativeRevealed { round, .. } => {
                self.round = *round;
                JournalEntry::Initiative {
                    round: *round,
                    text,
                    timestamp,
                }
            }
            ChallengeEvent::RoundEnded { round } => JournalEntry::RoundEnd {
                round: *round,
                timestamp,
            },
            ChallengeEvent::Ended { outcome, round, .. } => JournalEntry::Closing {
                outcome: *outcome,
                round: *round,
                text,
                timestamp,
            },
            _ => JournalEntry::Beat {
                round: self.round,
                text,
                timestamp,
            },
        };
        self.entries.push(entry);
        true
    }

    /// Add a note from the table.
    pub fn note(&mut self, text: impl Into<String>) {
        self.entries.push(JournalEntry::Note {
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Get all entries.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the journal as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = String::from("# Challenge Journal\n\n");
        for entry in &self.entries {
            match entry {
                JournalEntry::Opening { text, .. } => {
                    out.push_str(&format!("**{text}**\n\n"));
                }
                JournalEntry::Initiative { round, text, .. } => {
                    out.push_str(&format!("## Round {round}\n\n"));
                    out.push_str(&format!("*{text}*\n\n"));
                }
                JournalEntry::Beat { text, .. } => {
                    out.push_str(&format!("- {text}\n"));
                }
                JournalEntry::RoundEnd { round, .. } => {
                    out.push_str(&format!("\n*End of round {round}*\n\n"));
                }
                JournalEntry::Closing { outcome, text, .. } => {
                    out.push_str(&format!("## Outcome: {outcome}\n\n{text}\n\n"));
                }
                JournalEntry::Note { text, .. } => {
                    out.push_str(&format!("> {text}\n\n"));
                }
            }
        }
        out
    }

    /// Export the journal as pretty-printed JSON.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
