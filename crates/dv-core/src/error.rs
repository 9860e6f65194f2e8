use crate::id::{CombatantId, ZoneId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or querying an arena.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The requested zone does not exist in the arena.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// Two zones were registered under the same ID.
    #[error("zone already registered: \"{0}\"")]
    DuplicateZone(ZoneId),

    /// A zone lists a neighbor that is not part of the arena.
    #[error("zone \"{zone}\" is adjacent to unknown zone \"{neighbor}\"")]
    UnknownNeighbor {
        /// The zone declaring the adjacency.
        zone: ZoneId,
        /// The neighbor that could not be found.
        neighbor: ZoneId,
    },

    /// An arena must contain at least one zone.
    #[error("arena has no zones")]
    EmptyArena,

    /// A combatant cannot be engaged with itself.
    #[error("combatant {0} cannot engage itself")]
    SelfEngagement(CombatantId),
}
