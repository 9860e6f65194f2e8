//! Card-driven challenge mechanics for Delve.
//!
//! Provides tarot decks and hands, combatant sheets (wound tracks for
//! player characters, health and defense pools for antagonists), the
//! action table and configurable resolution policies, and the action
//! resolver that turns a declared action into a graded result.

pub mod cards;
pub mod error;
pub mod resolution;
pub mod rules;
pub mod sheet;
pub mod validate;

pub use cards::{Card, Deck, Draw, Hand, Suit};
pub use error::{MechError, MechResult};
pub use resolution::{ActionRequest, Check, Effect, FateOutcome, Resolution, WoundResult};
pub use rules::{ActionKind, ActionSpec, ResolutionPolicy, RuleSet, TargetType};
pub use sheet::{
    Combatant, CombatantKind, Condition, DamageType, NpcVitals, Roster, Track, Vitality, Weapon,
    WoundStage, WoundTrack,
};
pub use validate::validate_action;
