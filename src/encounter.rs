use crate::battle::state::TurnRng;
use crate::config::EncounterConfig;
use crate::world::{Position, TerrainKind, TerrainSampler};
use tracing::{debug, info};

/// Rate-limited random encounter gate for exploration.
///
/// At most one check runs per `check_interval_ms` of game time. A check on
/// tall grass draws once and triggers below `encounter_rate`.
#[derive(Debug, Clone)]
pub struct EncounterTrigger {
    check_interval_ms: u64,
    encounter_rate: f64,
    last_check_ms: u64,
}

impl EncounterTrigger {
    pub fn new(config: &EncounterConfig) -> Self {
        Self {
            check_interval_ms: config.check_interval_ms,
            encounter_rate: config.encounter_rate,
            last_check_ms: 0,
        }
    }

    /// Whether a check may run at `now_ms`.
    pub fn is_eligible(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_check_ms) >= self.check_interval_ms
    }

    /// Poll during exploration. Returns true when a battle should start.
    pub fn poll(
        &mut self,
        now_ms: u64,
        position: Position,
        terrain: &impl TerrainSampler,
        rng: &mut TurnRng,
    ) -> bool {
        if !self.is_eligible(now_ms) {
            return false;
        }
        self.last_check_ms = now_ms;

        if terrain.terrain_at(position) != TerrainKind::TallGrass {
            return false;
        }

        let roll = rng.next_unit("encounter roll");
        let triggered = roll < self.encounter_rate;
        if triggered {
            info!(%position, now_ms, "wild encounter triggered");
        } else {
            debug!(%position, now_ms, roll, "no encounter");
        }
        triggered
    }

    /// Push the next possible check a full interval past `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_check_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;

    const GRASS: Position = Position::new(2, 1);
    const PATH: Position = Position::new(1, 1);

    fn grass_strip() -> TileMap {
        TileMap::parse("#####\n#.\"\"#\n#####").unwrap()
    }

    fn trigger() -> EncounterTrigger {
        EncounterTrigger::new(&EncounterConfig::default())
    }

    #[test]
    fn test_low_roll_on_grass_triggers() {
        let mut encounters = trigger();
        let mut rng = TurnRng::new_for_test(vec![0.05]);
        assert!(encounters.poll(1000, GRASS, &grass_strip(), &mut rng));
    }

    #[test]
    fn test_roll_at_rate_does_not_trigger() {
        let mut encounters = trigger();
        let mut rng = TurnRng::new_for_test(vec![0.1]);
        assert!(!encounters.poll(1000, GRASS, &grass_strip(), &mut rng));
    }

    #[test]
    fn test_path_never_rolls() {
        let mut encounters = trigger();
        // Empty RNG: any draw would panic.
        let mut rng = TurnRng::new_for_test(vec![]);
        for now in (1000..20_000).step_by(1000) {
            assert!(!encounters.poll(now, PATH, &grass_strip(), &mut rng));
        }
    }

    #[test]
    fn test_checks_are_rate_limited() {
        let mut encounters = trigger();
        let mut rng = TurnRng::new_for_test(vec![0.5, 0.5]);
        let map = grass_strip();

        assert!(!encounters.poll(999, GRASS, &map, &mut rng), "too early");
        assert!(!encounters.poll(1000, GRASS, &map, &mut rng));
        // Within the interval: no draw happens.
        for now in 1001..2000 {
            assert!(!encounters.poll(now, GRASS, &map, &mut rng));
        }
        assert!(!encounters.poll(2000, GRASS, &map, &mut rng));
    }

    #[test]
    fn test_no_two_triggers_within_interval_at_any_tick_rate() {
        let map = grass_strip();
        for tick_ms in [1u64, 16, 33, 250, 999, 1000, 1500] {
            let mut encounters = trigger();
            let mut rng = TurnRng::seeded(tick_ms);
            let mut last_trigger: Option<u64> = None;
            let mut now = 0;
            while now < 120_000 {
                if encounters.poll(now, GRASS, &map, &mut rng) {
                    if let Some(previous) = last_trigger {
                        assert!(now - previous >= 1000, "tick {}ms", tick_ms);
                    }
                    last_trigger = Some(now);
                }
                now += tick_ms;
            }
        }
    }

    #[test]
    fn test_reset_delays_next_check() {
        let mut encounters = trigger();
        encounters.reset(5000);
        assert!(!encounters.is_eligible(5999));
        assert!(encounters.is_eligible(6000));
    }
}
