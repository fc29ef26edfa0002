use crate::battle::state::TurnRng;
use crate::config::BattleConfig;
use crate::creature::Creature;

/// Capture probability for a target.
///
/// `(1 - hp/max) * scale + floor`, bounded to `floor..=1.0`. With the default
/// config this is 0.2 at full health and 1.0 at zero health.
pub fn capture_probability(target: &Creature, config: &BattleConfig) -> f64 {
    let missing = 1.0 - target.hp_fraction();
    (missing * config.capture_scale + config.capture_floor).clamp(config.capture_floor, 1.0)
}

/// Roll for capture success. One draw; succeeds iff the draw is below the probability.
pub fn roll_capture_success(probability: f64, rng: &mut TurnRng) -> bool {
    rng.next_unit("capture roll") < probability
}
