//! The challenge controller for Delve.
//!
//! A [`Challenge`] runs one encounter as a state machine: every combatant
//! commits an initiative card, the count climbs and activates combatants
//! in card order, player characters declare actions while antagonists are
//! driven by an [`NpcPolicy`], and a minor-action window closes each
//! round. Everything that happens is published as a [`ChallengeEvent`] on
//! the challenge's own bus, and a [`Journal`] can turn those events into a
//! readable log.

pub mod challenge;
pub mod config;
pub mod error;
pub mod events;
pub mod initiative;
pub mod journal;
pub mod npc;

pub use challenge::{ActionId, Challenge, ChallengeSetup, MinorAction, MinorDeclaration, PendingAction};
pub use config::ChallengeConfig;
pub use error::{ChallengeError, ChallengeResult};
pub use events::{ChallengeEvent, ChallengeKind, DeckKind, Outcome, Phase};
pub use initiative::InitiativeSlot;
pub use journal::{Journal, JournalEntry};
pub use npc::{Battlefield, NearestTarget, NpcPolicy, Passive};
