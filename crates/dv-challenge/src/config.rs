//! Configuration for a challenge.

use dv_mechanics::RuleSet;

/// Configuration for a challenge.
#[derive(Debug, Clone)]
pub struct ChallengeConfig {
    /// RNG seed for reproducible shuffles.
    pub seed: u64,
    /// Seconds of game time per count step when driven by [`update`](crate::Challenge::update).
    pub count_interval: f64,
    /// Whether a minor-action window opens at the end of each round.
    pub minor_window: bool,
    /// Whether antagonists draw their initiative from the GM deck automatically.
    pub auto_npc_initiative: bool,
    /// Resolution policies.
    pub rules: RuleSet,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            count_interval: 0.5,
            minor_window: true,
            auto_npc_initiative: true,
            rules: RuleSet::default(),
        }
    }
}

impl ChallengeConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the count interval in seconds (at least a millisecond).
    pub fn with_count_interval(mut self, seconds: f64) -> Self {
        self.count_interval = seconds.max(0.001);
        self
    }

    /// Enable or disable the end-of-round minor-action window.
    pub fn with_minor_window(mut self, enabled: bool) -> Self {
        self.minor_window = enabled;
        self
    }

    /// Enable or disable automatic antagonist initiative.
    pub fn with_auto_npc_initiative(mut self, enabled: bool) -> Self {
        self.auto_npc_initiative = enabled;
        self
    }

    /// Use a different ruleset.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}
