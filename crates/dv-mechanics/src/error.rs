//! Error types for the mechanics engine.

use dv_core::{CombatantId, CoreError, ZoneId};

use crate::cards::Suit;
use crate::rules::ActionKind;

/// Errors that can occur while validating or resolving an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A card with this suit and value does not exist.
    #[error("no {suit} card with value {value}")]
    InvalidCard {
        /// The requested suit.
        suit: Suit,
        /// The requested value.
        value: u32,
    },

    /// The action needs a card and none was supplied.
    #[error("{0} requires a card")]
    MissingCard(ActionKind),

    /// The action needs a target and none was supplied.
    #[error("{0} requires a target")]
    MissingTarget(ActionKind),

    /// The action needs a destination zone and none was supplied.
    #[error("{0} requires a destination zone")]
    MissingDestination(ActionKind),

    /// A combatant referenced by the action is not part of the challenge.
    #[error("unknown combatant: {0}")]
    UnknownCombatant(CombatantId),

    /// The acting combatant is dead, dying, or has fled.
    #[error("{0} cannot act")]
    ActorCannotAct(String),

    /// The target does not fit the action's target type.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// A melee-class action was aimed at a target in another zone.
    #[error("{actor} in {actor_zone} cannot reach {target} in {target_zone}")]
    OutOfReach {
        /// Name of the actor.
        actor: String,
        /// Zone the actor stands in.
        actor_zone: ZoneId,
        /// Name of the target.
        target: String,
        /// Zone the target stands in.
        target_zone: ZoneId,
    },

    /// A ranged attack was declared without a ranged weapon.
    #[error("{0} has no ranged weapon")]
    NoRangedWeapon(String),

    /// The destination is not a legal move target from the current zone.
    #[error("cannot move from {from} to {to}")]
    ZoneNotAdjacent {
        /// Zone the mover stands in.
        from: ZoneId,
        /// Requested destination.
        to: ZoneId,
    },

    /// Fleeing requires standing in an exit zone.
    #[error("{0} is not at an exit")]
    NotAtExit(String),

    /// A ruleset failed validation or could not be parsed.
    #[error("invalid rules config: {0}")]
    InvalidConfig(String),

    /// An arena operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
