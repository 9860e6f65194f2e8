//! Action validation.
//!
//! Every check here is read-only, so a rejected action leaves the roster
//! and the arena exactly as they were.

use dv_core::ZoneRegistry;

use crate::error::{MechError, MechResult};
use crate::resolution::ActionRequest;
use crate::rules::{ActionKind, TargetType};
use crate::sheet::{Combatant, Roster};

/// Check a declared action against the action table and the arena.
pub fn validate_action(
    roster: &Roster,
    zones: &ZoneRegistry,
    request: &ActionRequest,
) -> MechResult<()> {
    let spec = request.kind.spec();
    let actor = roster
        .get(request.actor)
        .ok_or(MechError::UnknownCombatant(request.actor))?;
    if !actor.can_act() {
        return Err(MechError::ActorCannotAct(actor.name.clone()));
    }
    if spec.requires_card && request.card.is_none() {
        return Err(MechError::MissingCard(request.kind));
    }

    if spec.requires_target() {
        let target_id = request
            .target
            .ok_or(MechError::MissingTarget(request.kind))?;
        let target = roster
            .get(target_id)
            .ok_or(MechError::UnknownCombatant(target_id))?;
        check_target(actor, target, spec.target_type)?;
        if spec.is_melee && actor.zone != target.zone {
            return Err(MechError::OutOfReach {
                actor: actor.name.clone(),
                actor_zone: actor.zone.clone(),
                target: target.name.clone(),
                target_zone: target.zone.clone(),
            });
        }
    }

    if request.kind == ActionKind::Ranged
        && !request.weapon.as_ref().unwrap_or(&actor.weapon).ranged
    {
        return Err(MechError::NoRangedWeapon(actor.name.clone()));
    }

    if spec.requires_destination() {
        let to = request
            .destination
            .as_ref()
            .ok_or(MechError::MissingDestination(request.kind))?;
        if *to == actor.zone || !zones.within(&actor.zone, to, spec.max_steps) {
            return Err(MechError::ZoneNotAdjacent {
                from: actor.zone.clone(),
                to: to.clone(),
            });
        }
    }

    if request.kind == ActionKind::Flee
        && request.card.is_none()
        && !zones.zone(&actor.zone).is_some_and(|z| z.exit)
    {
        return Err(MechError::NotAtExit(actor.name.clone()));
    }

    Ok(())
}

fn check_target(actor: &Combatant, target: &Combatant, target_type: TargetType) -> MechResult<()> {
    if target.is_dead() {
        return Err(MechError::InvalidTarget(format!("{} is dead", target.name)));
    }
    if target.has_fled() {
        return Err(MechError::InvalidTarget(format!("{} has fled", target.name)));
    }
    match target_type {
        TargetType::Enemy if actor.is_ally_of(target) => Err(MechError::InvalidTarget(format!(
            "{} is not an enemy of {}",
            target.name, actor.name
        ))),
        TargetType::Ally if !actor.is_ally_of(target) => Err(MechError::InvalidTarget(format!(
            "{} is not an ally of {}",
            target.name, actor.name
        ))),
        _ => Ok(()),
    }
}
