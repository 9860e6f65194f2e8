//! Core types for Delve: identifiers, arena zones, and the event bus.
//!
//! This crate knows nothing about cards or rules. It describes *where*
//! combatants stand during a challenge and provides the session-scoped
//! publish/subscribe bus that higher layers use to announce what happened.

/// Session-scoped publish/subscribe event bus.
pub mod bus;
/// Error types used throughout the crate.
pub mod error;
/// Combatant and zone identifiers.
pub mod id;
/// Zone registry: arena layout, adjacency, and engagements.
pub mod registry;
/// Zone definitions and the default fallback arena.
pub mod zone;

/// Re-export bus types.
pub use bus::{EventBus, ListenerId};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export identifier types.
pub use id::{CombatantId, ZoneId};
/// Re-export the zone registry.
pub use registry::ZoneRegistry;
/// Re-export zone types.
pub use zone::{Zone, default_arena};
