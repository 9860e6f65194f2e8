//! The combatants of one challenge.

use dv_core::CombatantId;

use super::{Combatant, CombatantKind};

/// Player characters and antagonists taking part in a challenge.
///
/// Roster order (player characters in the order given, then antagonists)
/// is stable and used wherever a deterministic tie-break is needed.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pcs: Vec<Combatant>,
    npcs: Vec<Combatant>,
}

impl Roster {
    /// Build a roster from both sides.
    pub fn new(pcs: Vec<Combatant>, npcs: Vec<Combatant>) -> Self {
        Self { pcs, npcs }
    }

    /// Player characters, in roster order.
    pub fn pcs(&self) -> &[Combatant] {
        &self.pcs
    }

    /// Antagonists, in roster order.
    pub fn npcs(&self) -> &[Combatant] {
        &self.npcs
    }

    /// Everyone, player characters first.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.pcs.iter().chain(self.npcs.iter())
    }

    /// Everyone, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.pcs.iter_mut().chain(self.npcs.iter_mut())
    }

    /// Look up a combatant.
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.iter().find(|c| c.id == id)
    }

    /// Look up a combatant mutably.
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.iter_mut().find(|c| c.id == id)
    }

    /// Returns true if the combatant is on the roster.
    pub fn contains(&self, id: CombatantId) -> bool {
        self.get(id).is_some()
    }

    /// Position in roster order.
    pub fn position(&self, id: CombatantId) -> Option<usize> {
        self.iter().position(|c| c.id == id)
    }

    /// Find a combatant by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Combatant> {
        self.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Members of one side.
    pub fn side(&self, kind: CombatantKind) -> &[Combatant] {
        match kind {
            CombatantKind::Pc => &self.pcs,
            CombatantKind::Npc => &self.npcs,
        }
    }

    /// Total number of combatants.
    pub fn len(&self) -> usize {
        self.pcs.len() + self.npcs.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.pcs.is_empty() && self.npcs.is_empty()
    }

    /// True when no antagonist is left standing in the encounter.
    pub fn all_npcs_out(&self) -> bool {
        self.npcs.iter().all(|c| c.is_dead() || c.has_fled())
    }

    /// True when no player character can act any more.
    pub fn all_pcs_out(&self) -> bool {
        self.pcs.iter().all(|c| !c.can_act())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Condition;

    fn roster() -> Roster {
        Roster::new(
            vec![Combatant::pc("Wren", "near"), Combatant::pc("Oda", "near")],
            vec![Combatant::npc("Ghoul", "far", 3, 0)],
        )
    }

    #[test]
    fn lookup_and_order() {
        let roster = roster();
        let ghoul = roster.npcs()[0].id;
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.position(ghoul), Some(2));
        assert_eq!(roster.get(ghoul).map(|c| c.name.as_str()), Some("Ghoul"));
        assert!(roster.find_by_name("oda").is_some());
        assert!(!roster.contains(CombatantId::new()));
        assert_eq!(roster.side(CombatantKind::Pc).len(), 2);
    }

    #[test]
    fn side_checks() {
        let mut roster = roster();
        assert!(!roster.all_npcs_out());
        let ghoul = roster.npcs()[0].id;
        if let Some(c) = roster.get_mut(ghoul) {
            c.add_condition(Condition::Fled);
        }
        assert!(roster.all_npcs_out());

        assert!(!roster.all_pcs_out());
        for pc in roster.iter_mut().filter(|c| c.is_pc()) {
            pc.add_condition(Condition::Fled);
        }
        assert!(roster.all_pcs_out());
    }

    #[test]
    fn empty_roster() {
        assert!(Roster::default().is_empty());
    }
}
