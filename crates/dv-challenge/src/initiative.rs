//! Initiative slots and their ordering.
//!
//! Slots are ordered by card value, highest first. Equal values fall back
//! to suit precedence (Major > Swords > Wands > Cups > Pentacles), then
//! player characters before antagonists, then roster order. The result is
//! a total order, so the same submissions always produce the same
//! sequence.

use std::cmp::Reverse;

use dv_core::CombatantId;
use dv_mechanics::{Card, CombatantKind, Roster};
use serde::{Deserialize, Serialize};

/// One combatant's initiative for the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeSlot {
    /// Whose slot it is.
    pub combatant: CombatantId,
    /// The card committed.
    pub card: Card,
    /// Whether the card has been turned face up.
    pub revealed: bool,
    /// Count at which the combatant activates, starting at 1. Zero until revealed.
    pub position: u32,
}

impl InitiativeSlot {
    /// A face-down slot.
    pub fn new(combatant: CombatantId, card: Card) -> Self {
        Self {
            combatant,
            card,
            revealed: false,
            position: 0,
        }
    }
}

/// Sort slots into activation order, reveal them, and number them from 1.
pub fn order_slots(slots: &mut [InitiativeSlot], roster: &Roster) {
    slots.sort_by_key(|slot| {
        let side = match roster.get(slot.combatant).map(|c| c.kind()) {
            Some(CombatantKind::Pc) => 0,
            _ => 1,
        };
        (
            Reverse(slot.card.value()),
            Reverse(slot.card.suit().precedence()),
            side,
            roster.position(slot.combatant).unwrap_or(usize::MAX),
        )
    });
    for (index, slot) in slots.iter_mut().enumerate() {
        slot.revealed = true;
        slot.position = index as u32 + 1;
    }
}
