use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Hard ceiling on how long the human command path waits for input
    /// before defaulting to a basic attack.
    pub command_timeout: Duration,

    /// Interval between poll iterations while waiting for human input.
    /// Every iteration re-checks forced command > immediate decision >
    /// pending input, in that priority.
    pub poll_interval: Duration,

    /// Duration of the approach and return movement interpolation.
    pub move_duration: Duration,

    /// Delay substituted for the action of an incapacitated combatant.
    pub skip_turn_delay: Duration,

    /// Delay after the result phase, covering the victory or defeat
    /// presentation before the session halts.
    pub result_delay: Duration,

    /// When set, movement sub-phases complete instantly. Intended for
    /// headless runs and tests.
    pub instant_motion: bool,

    /// Power regained by each combatant at the end of its own turn.
    pub power_regen_per_turn: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum combatants per battle (both sides combined).
    pub const MAX_COMBATANTS: usize = 16;
    /// Maximum simultaneous conditions on one combatant.
    pub const MAX_CONDITIONS: usize = 6;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_MOVE_DURATION: Duration = Duration::from_millis(400);
    pub const DEFAULT_SKIP_TURN_DELAY: Duration = Duration::from_millis(600);
    pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_millis(1500);
    pub const DEFAULT_POWER_REGEN: u32 = 10;

    pub fn new() -> Self {
        Self {
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            move_duration: Self::DEFAULT_MOVE_DURATION,
            skip_turn_delay: Self::DEFAULT_SKIP_TURN_DELAY,
            result_delay: Self::DEFAULT_RESULT_DELAY,
            instant_motion: false,
            power_regen_per_turn: Self::DEFAULT_POWER_REGEN,
        }
    }

    /// Configuration for headless runs: no interpolation or presentation
    /// delays, so a battle resolves as fast as the decision paths allow.
    pub fn headless() -> Self {
        Self {
            move_duration: Duration::ZERO,
            skip_turn_delay: Duration::ZERO,
            result_delay: Duration::ZERO,
            instant_motion: true,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
