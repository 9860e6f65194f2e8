//! Rules engine: the action table and resolution policies.
//!
//! [`ActionKind::spec`] is the single table both the resolver and any
//! input layer consult to learn what an action needs (a card, a target, a
//! destination). A [`RuleSet`] holds the tunable numbers: per-action
//! difficulty and the margins that separate a glancing blow from a wound.
//! Rulesets serialize to JSON, so a table can ship its own.

pub mod preset;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Every action a combatant can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Strike an enemy in the same zone.
    Melee,
    /// Shoot an enemy in any zone with a ranged weapon.
    Ranged,
    /// Hurl a spell at anyone; must pass a Test of Fate.
    Cast,
    /// Tend an ally in the same zone.
    Aid,
    /// Brace against incoming attacks.
    Guard,
    /// Step into an adjacent zone.
    Move,
    /// Run up to two zones.
    Dash,
    /// Leave the encounter. Free from an exit zone, a card check elsewhere.
    Flee,
    /// Do nothing.
    Pass,
}

/// Who an action may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// A combatant on the other side.
    Enemy,
    /// A combatant on the same side, including the actor.
    Ally,
    /// Anyone.
    Any,
    /// No target.
    None,
}

/// What an action needs and how it behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    /// A card must be played.
    pub requires_card: bool,
    /// Who may be targeted.
    pub target_type: TargetType,
    /// Actor and target must share a zone.
    pub is_melee: bool,
    /// Harms the target on success.
    pub offensive: bool,
    /// The weapon's bonus applies.
    pub uses_weapon: bool,
    /// How many zones the actor may cross; zero for stationary actions.
    pub max_steps: u32,
    /// May be declared in the minor-action window.
    pub minor_allowed: bool,
    /// Must wait for a Test of Fate before it resolves.
    pub test_of_fate: bool,
}

impl ActionSpec {
    /// A target must be supplied.
    pub fn requires_target(&self) -> bool {
        self.target_type != TargetType::None
    }

    /// A destination zone must be supplied.
    pub fn requires_destination(&self) -> bool {
        self.max_steps > 0
    }
}

const STATIONARY: ActionSpec = ActionSpec {
    requires_card: true,
    target_type: TargetType::None,
    is_melee: false,
    offensive: false,
    uses_weapon: false,
    max_steps: 0,
    minor_allowed: false,
    test_of_fate: false,
};

impl ActionKind {
    /// All actions, in menu order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Melee,
            Self::Ranged,
            Self::Cast,
            Self::Aid,
            Self::Guard,
            Self::Move,
            Self::Dash,
            Self::Flee,
            Self::Pass,
        ]
    }

    /// The table entry for this action.
    pub fn spec(self) -> ActionSpec {
        match self {
            Self::Melee => ActionSpec {
                target_type: TargetType::Enemy,
                is_melee: true,
                offensive: true,
                uses_weapon: true,
                ..STATIONARY
            },
            Self::Ranged => ActionSpec {
                target_type: TargetType::Enemy,
                offensive: true,
                uses_weapon: true,
                ..STATIONARY
            },
            Self::Cast => ActionSpec {
                target_type: TargetType::Any,
                offensive: true,
                test_of_fate: true,
                ..STATIONARY
            },
            Self::Aid => ActionSpec {
                target_type: TargetType::Ally,
                is_melee: true,
                minor_allowed: true,
                ..STATIONARY
            },
            Self::Guard => ActionSpec {
                minor_allowed: true,
                ..STATIONARY
            },
            Self::Move => ActionSpec {
                requires_card: false,
                max_steps: 1,
                minor_allowed: true,
                ..STATIONARY
            },
            Self::Dash => ActionSpec {
                max_steps: 2,
                ..STATIONARY
            },
            Self::Flee => ActionSpec {
                requires_card: false,
                ..STATIONARY
            },
            Self::Pass => ActionSpec {
                requires_card: false,
                ..STATIONARY
            },
        }
    }

    /// Parse an action name from user input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "melee" | "attack" | "strike" => Some(Self::Melee),
            "ranged" | "shoot" => Some(Self::Ranged),
            "cast" | "spell" => Some(Self::Cast),
            "aid" | "heal" => Some(Self::Aid),
            "guard" | "defend" => Some(Self::Guard),
            "move" => Some(Self::Move),
            "dash" | "run" => Some(Self::Dash),
            "flee" => Some(Self::Flee),
            "pass" | "wait" => Some(Self::Pass),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Melee => write!(f, "melee"),
            Self::Ranged => write!(f, "ranged"),
            Self::Cast => write!(f, "cast"),
            Self::Aid => write!(f, "aid"),
            Self::Guard => write!(f, "guard"),
            Self::Move => write!(f, "move"),
            Self::Dash => write!(f, "dash"),
            Self::Flee => write!(f, "flee"),
            Self::Pass => write!(f, "pass"),
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enemy => write!(f, "enemy"),
            Self::Ally => write!(f, "ally"),
            Self::Any => write!(f, "any"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Numbers that turn a card into a result for one kind of action.
///
/// `margin = card value + bonuses - (difficulty + target defense)`.
/// A negative margin misses; a margin below `hit_margin` only notches
/// armor; anything else lands. Against a player character, each entry
/// of `wound_steps` the margin reaches costs one wound stage (at least
/// one). Against an antagonist the margin comes off its health, and an
/// antagonist with instant destruction falls outright at `destroy_margin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionPolicy {
    /// Base target number.
    pub difficulty: i32,
    /// Smallest margin that counts as a hit.
    pub hit_margin: i32,
    /// Ascending margins that each cost a player character one more stage.
    pub wound_steps: Vec<i32>,
    /// Margin that destroys an antagonist with instant destruction.
    pub destroy_margin: Option<i32>,
    /// Fate cards at or above this value favor the actor.
    pub fate_threshold: u32,
    /// How far a Test of Fate moves the margin either way.
    pub fate_swing: i32,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            difficulty: 5,
            hit_margin: 1,
            wound_steps: vec![1, 4, 8, 12],
            destroy_margin: Some(8),
            fate_threshold: 8,
            fate_swing: 3,
        }
    }
}

impl ResolutionPolicy {
    /// A default policy with a different difficulty.
    pub fn with_difficulty(difficulty: i32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Wound stages a hit with this margin inflicts on a player character.
    pub fn wound_stages(&self, margin: i32) -> u32 {
        let reached = self.wound_steps.iter().filter(|&&t| margin >= t).count() as u32;
        reached.max(1)
    }

    fn validate(&self, kind: &str) -> MechResult<()> {
        if self.hit_margin < 0 {
            return Err(MechError::InvalidConfig(format!(
                "{kind}: hit_margin must not be negative"
            )));
        }
        if self.fate_swing < 0 {
            return Err(MechError::InvalidConfig(format!(
                "{kind}: fate_swing must not be negative"
            )));
        }
        if self.wound_steps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MechError::InvalidConfig(format!(
                "{kind}: wound_steps must be strictly ascending"
            )));
        }
        if self.wound_steps.first().is_some_and(|&t| t < 1) {
            return Err(MechError::InvalidConfig(format!(
                "{kind}: wound_steps must start at 1 or more"
            )));
        }
        Ok(())
    }
}

/// A complete set of resolution policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Ruleset name, shown in the shell.
    pub name: String,
    /// Added to the difficulty of attacks against a guarded combatant.
    #[serde(default = "default_guard_bonus")]
    pub guard_bonus: i32,
    /// Policy for actions without an entry in `policies`.
    #[serde(default)]
    pub default_policy: ResolutionPolicy,
    /// Per-action overrides.
    #[serde(default)]
    pub policies: BTreeMap<ActionKind, ResolutionPolicy>,
}

fn default_guard_bonus() -> i32 {
    2
}

impl RuleSet {
    /// A ruleset that uses the default policy for every action.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard_bonus: default_guard_bonus(),
            default_policy: ResolutionPolicy::default(),
            policies: BTreeMap::new(),
        }
    }

    /// Override the policy for one action.
    pub fn with_policy(mut self, kind: ActionKind, policy: ResolutionPolicy) -> Self {
        self.policies.insert(kind, policy);
        self
    }

    /// The policy governing an action.
    pub fn policy(&self, kind: ActionKind) -> &ResolutionPolicy {
        self.policies.get(&kind).unwrap_or(&self.default_policy)
    }

    /// Parse and validate a ruleset from JSON.
    pub fn from_json(json: &str) -> MechResult<Self> {
        let rules: Self =
            serde_json::from_str(json).map_err(|e| MechError::InvalidConfig(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> MechResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MechError::InvalidConfig(e.to_string()))
    }

    /// Check every policy for inconsistent thresholds.
    pub fn validate(&self) -> MechResult<()> {
        if self.name.trim().is_empty() {
            return Err(MechError::InvalidConfig("ruleset name is empty".to_string()));
        }
        self.default_policy.validate("default")?;
        for (kind, policy) in &self.policies {
            policy.validate(&kind.to_string())?;
        }
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        preset::standard()
    }
}
