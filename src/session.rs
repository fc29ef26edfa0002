use crate::battle::engine::BattleResolution;
use crate::battle::state::{BattleOutcome, TurnRng};
use crate::config::GameConfig;
use crate::creature::{Creature, Team};
use crate::encounter::EncounterTrigger;
use crate::errors::{MapError, StoreResult};
use crate::store::{KeyValueStore, SaveState, SaveStore};
use crate::world::{Direction, Position, TerrainSampler, TileMap};
use schema::Species;
use tracing::info;

/// Monotonic game clock in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameClock {
    elapsed_ms: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and return the new reading.
    pub fn advance(&mut self, delta_ms: u64) -> u64 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        self.elapsed_ms
    }

    pub fn now(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Everything one play session owns: config, save slot, random source, clock
/// and the player's place in the world. Scenes borrow it mutably.
#[derive(Debug)]
pub struct GameSession<S: KeyValueStore> {
    pub config: GameConfig,
    pub rng: TurnRng,
    pub clock: GameClock,
    pub encounters: EncounterTrigger,
    pub map: TileMap,
    pub position: Position,
    store: SaveStore<S>,
    save: SaveState,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Open a session over `backend`, loading whatever save it holds.
    pub fn open(config: GameConfig, backend: S, rng: TurnRng) -> Result<Self, MapError> {
        let map = match &config.world.map {
            Some(text) => TileMap::parse(text)?,
            None => TileMap::builtin(),
        };
        let spawn = config.world.spawn;
        if map.terrain_at(spawn).blocks_movement() {
            return Err(MapError::BlockedSpawn(spawn));
        }
        let store = SaveStore::new(backend);
        let save = store.load();
        info!(
            starter = ?save.starter,
            team = save.team.len(),
            "save loaded"
        );

        Ok(Self {
            encounters: EncounterTrigger::new(&config.encounter),
            position: config.world.spawn,
            config,
            rng,
            clock: GameClock::new(),
            map,
            store,
            save,
        })
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save
    }

    pub fn team(&self) -> &Team {
        &self.save.team
    }

    pub fn lead(&self) -> Option<&Creature> {
        self.save.team.lead()
    }

    pub fn has_started(&self) -> bool {
        self.save.has_started()
    }

    pub fn store(&self) -> &SaveStore<S> {
        &self.store
    }

    /// Choose a starter. Replaces any previous save: the team becomes exactly
    /// the starter at full health.
    pub fn select_starter(&mut self, species: Species) -> StoreResult<()> {
        info!(%species, "starter selected");
        self.save = SaveState {
            starter: Some(species),
            team: Team::with_starter(species),
        };
        self.store.save_starter(species)?;
        self.store.save_team(&self.save.team)
    }

    /// Write a finished battle back into the team and persist it.
    pub fn apply_resolution(&mut self, resolution: BattleResolution) -> StoreResult<()> {
        let BattleResolution {
            outcome,
            lead,
            captured,
        } = resolution;
        if let Some(lead) = lead {
            self.save.team.replace_lead(lead);
        }
        if let Some(captured) = captured {
            info!(creature = %captured, "added to team");
            self.save.team.push(captured);
        }
        info!(%outcome, team = self.save.team.len(), "battle resolved");
        self.store.save_team(&self.save.team)
    }

    /// Walk one tile. Walls leave the player in place.
    pub fn step(&mut self, direction: Direction) -> Position {
        self.position = self.map.try_step(self.position, direction);
        self.position
    }
}
