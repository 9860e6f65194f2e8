//! Antagonist decision-making.
//!
//! A policy only proposes an action. The controller validates it like any
//! other, and anything it rejects becomes a pass, so a confused policy can
//! never stall the count.

use dv_core::{CombatantId, ZoneRegistry};
use dv_mechanics::{ActionKind, ActionRequest, Combatant, CombatantKind, Roster, RuleSet, Vitality};

/// Read-only view of the board handed to a policy.
#[derive(Debug, Clone, Copy)]
pub struct Battlefield<'a> {
    /// Everyone in the encounter.
    pub roster: &'a Roster,
    /// The arena.
    pub zones: &'a ZoneRegistry,
    /// Resolution policies in force.
    pub rules: &'a RuleSet,
}

/// Chooses actions for combatants the table does not control directly.
pub trait NpcPolicy: std::fmt::Debug {
    /// Propose an action for `actor`. The actor's hand holds the cards it
    /// may play.
    fn choose(&mut self, actor: &Combatant, field: &Battlefield<'_>) -> ActionRequest;
}

/// Always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

impl NpcPolicy for Passive {
    fn choose(&mut self, actor: &Combatant, _field: &Battlefield<'_>) -> ActionRequest {
        ActionRequest::new(actor.id, ActionKind::Pass)
    }
}

/// Goes for the closest enemy.
///
/// Strikes when sharing a zone, shoots when holding a ranged weapon, and
/// otherwise closes the distance one zone at a time. An antagonist down to
/// a third of its health with no morale left tries to flee instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestTarget;

impl NearestTarget {
    /// The nearest enemy that can still be attacked, ties broken by roster order.
    pub fn pick_target<'a>(actor: &Combatant, field: &Battlefield<'a>) -> Option<&'a Combatant> {
        let enemies = match actor.kind() {
            CombatantKind::Pc => field.roster.npcs(),
            CombatantKind::Npc => field.roster.pcs(),
        };
        enemies
            .iter()
            .filter(|c| c.is_targetable())
            .filter_map(|c| field.zones.distance(&actor.zone, &c.zone).map(|d| (d, c)))
            .min_by_key(|(d, _)| *d)
            .map(|(_, c)| c)
    }

    fn wants_to_flee(actor: &Combatant) -> bool {
        match &actor.vitality {
            Vitality::Npc(vitals) => vitals.morale <= 0 && vitals.health.fraction() <= 1.0 / 3.0,
            Vitality::Pc(_) => false,
        }
    }
}

impl NpcPolicy for NearestTarget {
    fn choose(&mut self, actor: &Combatant, field: &Battlefield<'_>) -> ActionRequest {
        let card = actor.hand.highest().cloned();
        let with_card = |request: ActionRequest| match &card {
            Some(card) => request.with_card(card.clone()),
            None => request,
        };

        if Self::wants_to_flee(actor) {
            return with_card(ActionRequest::new(actor.id, ActionKind::Flee));
        }

        let Some(target) = Self::pick_target(actor, field) else {
            return ActionRequest::new(actor.id, ActionKind::Pass);
        };

        if target.zone == actor.zone && card.is_some() {
            with_card(ActionRequest::new(actor.id, ActionKind::Melee).with_target(target.id))
        } else if actor.weapon.ranged && card.is_some() {
            with_card(ActionRequest::new(actor.id, ActionKind::Ranged).with_target(target.id))
        } else {
            match field.zones.step_toward(&actor.zone, &target.zone) {
                Some(next) => ActionRequest::new(actor.id, ActionKind::Move).with_destination(next),
                None => ActionRequest::new(actor.id, ActionKind::Pass),
            }
        }
    }
}

/// The fallback when a proposed action is rejected.
pub(crate) fn pass(actor: CombatantId) -> ActionRequest {
    ActionRequest::new(actor, ActionKind::Pass)
}
