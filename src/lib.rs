//! Wild Grass
//!
//! Core of a small creature-collection game: pick a starter, wander a tile
//! map, meet wild creatures in tall grass, then fight or catch them in a
//! turn-based battle. Presentation is left to the caller; the crate exposes
//! state, log lines and an intent-driven scene orchestrator.

pub mod battle;
pub mod catalog;
pub mod config;
pub mod creature;
pub mod encounter;
pub mod errors;
pub mod scenes;
pub mod session;
pub mod store;
pub mod world;

// --- From the `schema` crate ---
pub use schema::{ElementType, MoveData, Species, SpeciesData};

// --- Battle engine ---
pub use battle::engine::{BattleEngine, BattleResolution, HpDisplay, Opponent};
pub use battle::state::{BattleEvent, BattleOutcome, BattlePhase, Side, TurnRng};

// --- Session and scenes ---
pub use scenes::{PlayerIntent, Scene, SceneId, SceneLifecycle, SceneOrchestrator};
pub use session::{GameClock, GameSession};

// --- Data, persistence and world ---
pub use catalog::get_species_data;
pub use config::{BattleConfig, EncounterConfig, GameConfig, WorldConfig};
pub use creature::{Creature, Team};
pub use encounter::EncounterTrigger;
pub use store::{FileStore, KeyValueStore, MemoryStore, SaveState, SaveStore};
pub use world::{Direction, Position, TerrainKind, TerrainSampler, TileMap};

// Crate-specific error and result types.
pub use errors::{
    CatalogError, CatalogResult, ConfigError, MapError, StoreError, StoreResult, UnknownCommand,
};
