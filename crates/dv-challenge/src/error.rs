//! Error types for the challenge controller.

use dv_core::{CoreError, ZoneId};
use dv_mechanics::MechError;
use thiserror::Error;

/// Result type for challenge operations.
pub type ChallengeResult<T> = Result<T, ChallengeError>;

/// Errors returned by the challenge controller.
///
/// Every error is recoverable: a rejected call leaves the challenge in
/// the state it was in before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The request breaks the rules or does not fit the current phase.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// The caller is not the one the challenge is waiting on.
    #[error("out of turn: {0}")]
    OutOfTurn(String),

    /// A combatant, zone, or pending action is not part of the challenge.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// A move was aimed at a zone the mover cannot reach.
    #[error("cannot move from {from} to {to}")]
    ZoneNotAdjacent {
        /// Zone the mover stands in.
        from: ZoneId,
        /// Requested destination.
        to: ZoneId,
    },
}

impl From<MechError> for ChallengeError {
    fn from(err: MechError) -> Self {
        match err {
            MechError::UnknownCombatant(id) => Self::UnknownEntity(format!("combatant {id}")),
            MechError::ZoneNotAdjacent { from, to } => Self::ZoneNotAdjacent { from, to },
            MechError::Core(core) => core.into(),
            other => Self::InvalidAction(other.to_string()),
        }
    }
}

impl From<CoreError> for ChallengeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ZoneNotFound(zone) => Self::UnknownEntity(format!("zone {zone}")),
            other => Self::InvalidAction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use dv_core::CombatantId;
    use dv_mechanics::ActionKind;

    use super::*;

    #[test]
    fn mechanics_errors_map_onto_challenge_kinds() {
        let id = CombatantId::new();
        assert!(matches!(
            ChallengeError::from(MechError::UnknownCombatant(id)),
            ChallengeError::UnknownEntity(_)
        ));
        assert_eq!(
            ChallengeError::from(MechError::ZoneNotAdjacent {
                from: ZoneId::new("near"),
                to: ZoneId::new("far"),
            }),
            ChallengeError::ZoneNotAdjacent {
                from: ZoneId::new("near"),
                to: ZoneId::new("far"),
            }
        );
        assert_eq!(
            ChallengeError::from(MechError::MissingCard(ActionKind::Melee)),
            ChallengeError::InvalidAction("melee requires a card".to_string())
        );
        assert!(matches!(
            ChallengeError::from(MechError::Core(CoreError::ZoneNotFound(ZoneId::new("attic")))),
            ChallengeError::UnknownEntity(msg) if msg == "zone attic"
        ));
    }

    #[test]
    fn display() {
        let err = ChallengeError::OutOfTurn("waiting on Wren".to_string());
        insta::assert_snapshot!(err.to_string(), @"out of turn: waiting on Wren");
    }
}
