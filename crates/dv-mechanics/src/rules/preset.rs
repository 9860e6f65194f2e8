//! Pre-configured rulesets.
//!
//! These produce the same [`RuleSet`] a JSON file would, without needing
//! one on disk.

use crate::rules::{ActionKind, ResolutionPolicy, RuleSet};

/// The standard table.
///
/// Difficulty 5 across the board. Ranged and spellcasting are a point
/// harder; tending an ally and bracing are a point easier. A hit needs a
/// margin of 1, and every further threshold (4, 8, 12) costs a player
/// character another wound stage.
pub fn standard() -> RuleSet {
    RuleSet::new("standard")
        .with_policy(ActionKind::Ranged, ResolutionPolicy::with_difficulty(6))
        .with_policy(ActionKind::Cast, ResolutionPolicy::with_difficulty(6))
        .with_policy(ActionKind::Aid, ResolutionPolicy::with_difficulty(4))
        .with_policy(ActionKind::Guard, ResolutionPolicy::with_difficulty(4))
}

/// A grim table for veterans.
///
/// Everything is two points harder, a hit needs a margin of 2, and wounds
/// escalate faster. Antagonists cannot be destroyed outright.
pub fn grim() -> RuleSet {
    let policy = ResolutionPolicy {
        difficulty: 7,
        hit_margin: 2,
        wound_steps: vec![2, 4, 6],
        destroy_margin: None,
        fate_threshold: 10,
        fate_swing: 2,
    };
    let mut rules = RuleSet::new("grim");
    rules.guard_bonus = 3;
    rules.default_policy = policy.clone();
    rules.with_policy(
        ActionKind::Aid,
        ResolutionPolicy {
            difficulty: 6,
            ..policy
        },
    )
}

/// Look up a preset by name.
pub fn by_name(name: &str) -> Option<RuleSet> {
    match name.trim().to_lowercase().as_str() {
        "standard" => Some(standard()),
        "grim" => Some(grim()),
        _ => None,
    }
}
