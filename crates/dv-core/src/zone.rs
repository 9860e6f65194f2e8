use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::ZoneId;

/// A coarse region of an arena used for range and engagement checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Stable identifier of the zone.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Narrative description shown by the presentation layer.
    #[serde(default)]
    pub description: String,
    /// Zones reachable with a single move.
    #[serde(default)]
    pub adjacent: BTreeSet<ZoneId>,
    /// Whether combatants can leave the encounter from here.
    #[serde(default)]
    pub exit: bool,
}

impl Zone {
    /// Create a zone with no neighbors.
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            adjacent: BTreeSet::new(),
            exit: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare a neighbor. Adjacency is made symmetric on registration.
    pub fn adjacent_to(mut self, neighbor: impl Into<ZoneId>) -> Self {
        self.adjacent.insert(neighbor.into());
        self
    }

    /// Mark this zone as an exit.
    pub fn as_exit(mut self) -> Self {
        self.exit = true;
        self
    }
}

/// The fallback arena used when a room defines no zones of its own:
/// three zones in a line, `near`, `center`, `far`, with the exit near
/// the party.
pub fn default_arena() -> Vec<Zone> {
    vec![
        Zone::new("near", "Near")
            .with_description("The threshold the party came through.")
            .adjacent_to("center")
            .as_exit(),
        Zone::new("center", "Center")
            .with_description("Open floor between the two sides.")
            .adjacent_to("near")
            .adjacent_to("far"),
        Zone::new("far", "Far")
            .with_description("The back of the chamber.")
            .adjacent_to("center"),
    ]
}
