use crate::battle::engine::BattleEngine;
use crate::battle::state::{BattleEvent, TurnRng};
use crate::config::BattleConfig;
use crate::creature::Creature;
use schema::Species;

/// A builder for test creatures with common defaults.
///
/// # Example
/// ```ignore
/// let lead = TestCreatureBuilder::new(Species::Charmander).with_hp(12).build();
/// ```
pub struct TestCreatureBuilder {
    species: Species,
    current_hp: Option<u16>,
    level: Option<u16>,
}

impl TestCreatureBuilder {
    pub fn new(species: Species) -> Self {
        Self {
            species,
            current_hp: None,
            level: None,
        }
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = Some(level);
        self
    }

    pub fn build(self) -> Creature {
        let mut creature = Creature::new(self.species);
        if let Some(level) = self.level {
            creature.level = level;
        }
        if let Some(hp) = self.current_hp {
            creature.set_hp(hp);
        }
        creature
    }
}

/// Battle config with no pacing delay, so a tick at the same timestamp fires the retaliation.
pub fn instant_config() -> BattleConfig {
    BattleConfig {
        pacing_delay_ms: 0,
        ..BattleConfig::default()
    }
}

/// Start and begin a battle between two fresh catalog creatures.
pub fn started_battle(lead: Species, opponent: Species, config: &BattleConfig) -> BattleEngine {
    let mut battle = BattleEngine::start(Creature::new(lead), opponent, config);
    battle.begin();
    battle
}

/// Collect formatted log lines for a slice of events.
pub fn log_text(events: &[BattleEvent]) -> Vec<String> {
    events.iter().filter_map(BattleEvent::format).collect()
}

/// Scripted RNG that always picks the opponent's first move.
pub fn first_move_rng(turns: usize) -> TurnRng {
    TurnRng::new_for_test(vec![0.0; turns])
}
