//! The action resolver.
//!
//! [`resolve`] validates a declared action, turns its card into a margin
//! against the action's difficulty, and applies the graded result to the
//! roster and the arena. Actions that need a Test of Fate stop after
//! validation and report [`Resolution::pending_test_of_fate`]; the caller
//! finishes them with [`resolve_test_of_fate`].

pub mod fate;
pub mod grade;

pub use fate::FateOutcome;
pub use grade::{WoundResult, apply_margin};

use dv_core::{CombatantId, ZoneId, ZoneRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::Card;
use crate::error::{MechError, MechResult};
use crate::rules::{ActionKind, RuleSet};
use crate::sheet::{Condition, DamageType, Roster, Vitality, Weapon};
use crate::validate::validate_action;

/// A fully specified action, ready for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    /// Who acts.
    pub actor: CombatantId,
    /// What they do.
    pub kind: ActionKind,
    /// Who it is aimed at.
    pub target: Option<CombatantId>,
    /// Where they go.
    pub destination: Option<ZoneId>,
    /// The card played.
    pub card: Option<Card>,
    /// Weapon to use instead of the equipped one.
    pub weapon: Option<Weapon>,
}

impl ActionRequest {
    /// A bare request with no target, destination, or card.
    pub fn new(actor: CombatantId, kind: ActionKind) -> Self {
        Self {
            actor,
            kind,
            target: None,
            destination: None,
            card: None,
            weapon: None,
        }
    }

    /// Aim the action at a combatant.
    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the destination zone.
    pub fn with_destination(mut self, zone: impl Into<ZoneId>) -> Self {
        self.destination = Some(zone.into());
        self
    }

    /// Play a card.
    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    /// Use a weapon other than the equipped one.
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }
}

/// The side effect an action had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Effect {
    /// Nothing changed.
    None,
    /// An offensive action was graded against its target.
    Wound {
        /// Who was struck.
        target: CombatantId,
        /// How badly.
        result: WoundResult,
        /// The kind of harm.
        damage_type: DamageType,
    },
    /// A combatant changed zones.
    Moved {
        /// Who moved.
        who: CombatantId,
        /// Zone left.
        from: ZoneId,
        /// Zone entered.
        to: ZoneId,
    },
    /// A combatant recovered.
    Mended {
        /// Who was tended.
        target: CombatantId,
        /// Wound stages or health points recovered.
        amount: u32,
    },
    /// The actor is braced until its next activation.
    Guarding,
    /// The actor left the encounter.
    Fled,
}

/// The outcome of resolving one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Who acted.
    pub actor: CombatantId,
    /// What they did.
    pub kind: ActionKind,
    /// Whether the action achieved its aim.
    pub success: bool,
    /// Card total minus difficulty, for actions that made a check.
    pub margin: Option<i32>,
    /// What changed.
    pub effect: Effect,
    /// The action is waiting for a fate card and has changed nothing yet.
    pub pending_test_of_fate: bool,
    /// How the fate card fell, once one was turned.
    pub fate: Option<FateOutcome>,
}

impl Resolution {
    fn new(request: &ActionRequest, success: bool, margin: Option<i32>, effect: Effect) -> Self {
        Self {
            actor: request.actor,
            kind: request.kind,
            success,
            margin,
            effect,
            pending_test_of_fate: false,
            fate: None,
        }
    }

    fn pending(request: &ActionRequest) -> Self {
        Self {
            pending_test_of_fate: true,
            ..Self::new(request, false, None, Effect::None)
        }
    }
}

/// A card check before any modifiers from fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    /// Card value plus bonuses and penalties.
    pub total: i32,
    /// Base difficulty plus the target's defense and guard.
    pub difficulty: i32,
}

impl Check {
    /// `total - difficulty`.
    pub fn margin(&self) -> i32 {
        self.total - self.difficulty
    }
}

/// Work out the check an action would make, without changing anything.
///
/// Returns `None` for actions made without a card.
pub fn check(rules: &RuleSet, roster: &Roster, request: &ActionRequest) -> MechResult<Option<Check>> {
    let Some(card) = &request.card else {
        return Ok(None);
    };
    let spec = request.kind.spec();
    let actor = roster
        .get(request.actor)
        .ok_or(MechError::UnknownCombatant(request.actor))?;

    let weapon_bonus = if spec.uses_weapon {
        request.weapon.as_ref().unwrap_or(&actor.weapon).bonus
    } else {
        0
    };
    let total = card.value() as i32 + weapon_bonus + actor.check_penalty();

    let mut difficulty = rules.policy(request.kind).difficulty;
    let target = request
        .target
        .filter(|_| spec.offensive)
        .and_then(|id| roster.get(id));
    if let Some(target) = target {
        difficulty += target.defense() as i32;
        if target.has(Condition::Guarded) {
            difficulty += rules.guard_bonus;
        }
    }
    Ok(Some(Check { total, difficulty }))
}

/// Validate and resolve an action.
///
/// Nothing is mutated when validation fails or when the action must wait
/// for a Test of Fate.
pub fn resolve(
    rules: &RuleSet,
    roster: &mut Roster,
    zones: &mut ZoneRegistry,
    request: &ActionRequest,
) -> MechResult<Resolution> {
    validate_action(roster, zones, request)?;
    if request.kind.spec().test_of_fate {
        debug!(actor = %request.actor, kind = %request.kind, "awaiting test of fate");
        return Ok(Resolution::pending(request));
    }
    apply(rules, roster, zones, request, 0)
}

/// Finish an action that was waiting for a Test of Fate.
///
/// The action is validated again, since the board may have changed while
/// it waited.
pub fn resolve_test_of_fate(
    rules: &RuleSet,
    roster: &mut Roster,
    zones: &mut ZoneRegistry,
    request: &ActionRequest,
    fate_card: &Card,
) -> MechResult<Resolution> {
    validate_action(roster, zones, request)?;
    let fate = FateOutcome::read(rules.policy(request.kind), fate_card);
    debug!(actor = %request.actor, card = %fate_card, %fate, "test of fate");
    let mut resolution = match fate.adjustment(rules.policy(request.kind)) {
        Some(adjustment) => apply(rules, roster, zones, request, adjustment)?,
        None => Resolution::new(request, false, None, Effect::None),
    };
    resolution.fate = Some(fate);
    Ok(resolution)
}

fn apply(
    rules: &RuleSet,
    roster: &mut Roster,
    zones: &mut ZoneRegistry,
    request: &ActionRequest,
    adjustment: i32,
) -> MechResult<Resolution> {
    let margin = check(rules, roster, request)?.map(|c| c.margin() + adjustment);
    let passed = margin.is_some_and(|m| m >= 0);
    let actor = roster
        .get(request.actor)
        .ok_or(MechError::UnknownCombatant(request.actor))?;
    let from = actor.zone.clone();
    let weapon = request.weapon.clone().unwrap_or_else(|| actor.weapon.clone());

    let resolution = match request.kind {
        ActionKind::Melee | ActionKind::Ranged | ActionKind::Cast => {
            let target_id = request
                .target
                .ok_or(MechError::MissingTarget(request.kind))?;
            let target = roster
                .get_mut(target_id)
                .ok_or(MechError::UnknownCombatant(target_id))?;
            let result = apply_margin(rules.policy(request.kind), margin.unwrap_or(-1), target);
            let fallen = target.is_dead();
            if fallen {
                zones.disengage(target_id);
            } else if request.kind == ActionKind::Melee {
                zones.engage(request.actor, target_id)?;
            }
            let damage_type = if request.kind == ActionKind::Cast {
                DamageType::Arcane
            } else {
                weapon.damage_type
            };
            Resolution::new(
                request,
                result.is_hit(),
                margin,
                Effect::Wound {
                    target: target_id,
                    result,
                    damage_type,
                },
            )
        }
        ActionKind::Aid => {
            let target_id = request
                .target
                .ok_or(MechError::MissingTarget(request.kind))?;
            let effect = if passed {
                let target = roster
                    .get_mut(target_id)
                    .ok_or(MechError::UnknownCombatant(target_id))?;
                let amount = match &mut target.vitality {
                    Vitality::Pc(track) => track.mend(1),
                    Vitality::Npc(vitals) => {
                        vitals.health.restore(margin.unwrap_or(0).max(1).unsigned_abs())
                    }
                };
                target.sync_conditions();
                Effect::Mended {
                    target: target_id,
                    amount,
                }
            } else {
                Effect::None
            };
            Resolution::new(request, passed, margin, effect)
        }
        ActionKind::Guard => {
            let effect = if passed {
                if let Some(actor) = roster.get_mut(request.actor) {
                    actor.add_condition(Condition::Guarded);
                }
                Effect::Guarding
            } else {
                Effect::None
            };
            Resolution::new(request, passed, margin, effect)
        }
        ActionKind::Move => {
            let to = request
                .destination
                .clone()
                .ok_or(MechError::MissingDestination(request.kind))?;
            let effect = relocate(roster, zones, request.actor, to)?;
            Resolution::new(request, true, margin, effect)
        }
        ActionKind::Dash => {
            let goal = request
                .destination
                .clone()
                .ok_or(MechError::MissingDestination(request.kind))?;
            let to = if passed {
                Some(goal)
            } else {
                zones.step_toward(&from, &goal)
            };
            let effect = match to {
                Some(to) => relocate(roster, zones, request.actor, to)?,
                None => Effect::None,
            };
            Resolution::new(request, passed, margin, effect)
        }
        ActionKind::Flee => {
            let at_exit = zones.zone(&from).is_some_and(|z| z.exit);
            let escaped = at_exit || passed;
            let effect = if escaped {
                if let Some(actor) = roster.get_mut(request.actor) {
                    actor.add_condition(Condition::Fled);
                    actor.remove_condition(Condition::Guarded);
                }
                zones.disengage(request.actor);
                Effect::Fled
            } else {
                Effect::None
            };
            Resolution::new(request, escaped, margin, effect)
        }
        ActionKind::Pass => Resolution::new(request, true, None, Effect::None),
    };

    debug!(
        actor = %request.actor,
        kind = %request.kind,
        success = resolution.success,
        margin = ?resolution.margin,
        "action resolved"
    );
    Ok(resolution)
}

fn relocate(
    roster: &mut Roster,
    zones: &mut ZoneRegistry,
    who: CombatantId,
    to: ZoneId,
) -> MechResult<Effect> {
    let mover = roster.get_mut(who).ok_or(MechError::UnknownCombatant(who))?;
    let from = std::mem::replace(&mut mover.zone, to.clone());
    zones.disengage(who);
    Ok(Effect::Moved { who, from, to })
}
