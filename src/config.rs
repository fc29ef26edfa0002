use crate::errors::ConfigError;
use crate::world::Position;
use schema::Species;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level game configuration. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub battle: BattleConfig,
    pub encounter: EncounterConfig,
    pub world: WorldConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Delay between a player action and the opponent's retaliation.
    pub pacing_delay_ms: u64,
    /// Capture probability at full health.
    pub capture_floor: f64,
    /// Extra capture probability gained as the target's health drops to zero.
    pub capture_scale: f64,
    /// Max health gained per level-up.
    pub level_up_hp_bonus: u16,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: 1000,
            capture_floor: 0.2,
            capture_scale: 0.8,
            level_up_hp_bonus: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Minimum game time between two encounter checks.
    pub check_interval_ms: u64,
    /// Chance that a check on tall grass starts a battle.
    pub encounter_rate: f64,
    /// Species sent out by wild encounters.
    pub wild_species: Species,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 1000,
            encounter_rate: 0.1,
            wild_species: Species::Squirtle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub spawn: Position,
    /// Game time one step across a tile takes.
    pub step_duration_ms: u64,
    /// ASCII map override; the builtin map is used when absent.
    pub map: Option<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            spawn: Position::new(2, 1),
            // One 32px tile at 100px/s.
            step_duration_ms: 320,
            map: None,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.encounter.encounter_rate) {
            return Err(ConfigError::Invalid(format!(
                "encounter_rate {} is outside 0.0..=1.0",
                self.encounter.encounter_rate
            )));
        }
        if !unit.contains(&self.battle.capture_floor)
            || !unit.contains(&self.battle.capture_scale)
            || self.battle.capture_floor + self.battle.capture_scale > 1.0 + f64::EPSILON
        {
            return Err(ConfigError::Invalid(format!(
                "capture_floor {} and capture_scale {} must be fractions summing to at most 1.0",
                self.battle.capture_floor, self.battle.capture_scale
            )));
        }
        Ok(())
    }
}
