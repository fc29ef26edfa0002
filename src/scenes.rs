use crate::battle::engine::BattleEngine;
use crate::battle::state::BattleEvent;
use crate::catalog::catalog;
use crate::errors::{StoreResult, UnknownCommand};
use crate::session::GameSession;
use crate::store::KeyValueStore;
use crate::world::Direction;
use schema::Species;
use std::fmt::Write;
use std::str::FromStr;
use tracing::{debug, info};

/// Everything the player can ask for, in any scene. Intents that make no
/// sense in the active scene are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    SelectStarter(Species),
    Move(Direction),
    Wait,
    /// Index into the lead's move list.
    ChooseMove(usize),
    ThrowBall,
    Acknowledge,
}

impl FromStr for PlayerIntent {
    type Err = UnknownCommand;

    /// Text commands: a species name, `w`/`a`/`s`/`d` or a direction word,
    /// `wait`, a 1-based move number, `ball`, `ok`.
    fn from_str(command: &str) -> Result<Self, Self::Err> {
        let command = command.trim().to_ascii_lowercase();
        let intent = match command.as_str() {
            "w" | "up" => PlayerIntent::Move(Direction::Up),
            "s" | "down" => PlayerIntent::Move(Direction::Down),
            "a" | "left" => PlayerIntent::Move(Direction::Left),
            "d" | "right" => PlayerIntent::Move(Direction::Right),
            "" | "wait" => PlayerIntent::Wait,
            "b" | "ball" => PlayerIntent::ThrowBall,
            "ok" | "space" => PlayerIntent::Acknowledge,
            other => {
                if let Ok(number) = other.parse::<usize>() {
                    match number.checked_sub(1) {
                        Some(index) => PlayerIntent::ChooseMove(index),
                        None => return Err(UnknownCommand(other.to_string())),
                    }
                } else if let Some(species) = Species::from_name(other) {
                    PlayerIntent::SelectStarter(species)
                } else {
                    return Err(UnknownCommand(other.to_string()));
                }
            }
        };
        Ok(intent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneId {
    StarterSelection,
    Exploration,
    Battle,
}

/// Result of ticking a scene once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneUpdate {
    pub lines: Vec<String>,
    pub next: Option<SceneId>,
}

impl SceneUpdate {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, next: None }
    }

    fn switch_to(mut self, next: SceneId) -> Self {
        self.next = Some(next);
        self
    }
}

/// Lifecycle hooks every scene implements.
pub trait SceneLifecycle {
    /// Runs once when the scene becomes active.
    fn initialize<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
    ) -> StoreResult<Vec<String>>;

    /// Runs once per update with the session clock already advanced.
    fn tick<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<SceneUpdate>;

    /// Runs once when the scene is replaced.
    fn teardown<S: KeyValueStore>(&mut self, session: &mut GameSession<S>);
}

#[derive(Debug, Clone, Default)]
pub struct StarterScene;

impl SceneLifecycle for StarterScene {
    fn initialize<S: KeyValueStore>(
        &mut self,
        _session: &mut GameSession<S>,
    ) -> StoreResult<Vec<String>> {
        Ok(vec!["Choose your starter!".to_string()])
    }

    fn tick<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<SceneUpdate> {
        match intent {
            Some(PlayerIntent::SelectStarter(species)) => {
                session.select_starter(species)?;
                Ok(SceneUpdate::lines(vec![format!("You chose {}!", species)])
                    .switch_to(SceneId::Exploration))
            }
            _ => Ok(SceneUpdate::default()),
        }
    }

    fn teardown<S: KeyValueStore>(&mut self, _session: &mut GameSession<S>) {}
}

#[derive(Debug, Clone, Default)]
pub struct ExplorationScene;

impl SceneLifecycle for ExplorationScene {
    fn initialize<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
    ) -> StoreResult<Vec<String>> {
        // Coming back from a battle must not roll again on the same frame.
        let now = session.clock.now();
        session.encounters.reset(now);
        Ok(Vec::new())
    }

    fn tick<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<SceneUpdate> {
        if let Some(PlayerIntent::Move(direction)) = intent {
            let position = session.step(direction);
            debug!(%position, ?direction, "player moved");
        }

        let now = session.clock.now();
        let triggered = session.encounters.poll(
            now,
            session.position,
            &session.map,
            &mut session.rng,
        );
        if triggered {
            Ok(SceneUpdate::default().switch_to(SceneId::Battle))
        } else {
            Ok(SceneUpdate::default())
        }
    }

    fn teardown<S: KeyValueStore>(&mut self, _session: &mut GameSession<S>) {}
}

/// Wraps one battle. The resolution is written back the moment the battle
/// ends; the scene then waits for an acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct BattleScene {
    engine: Option<BattleEngine>,
    resolved: bool,
}

impl BattleScene {
    pub fn engine(&self) -> Option<&BattleEngine> {
        self.engine.as_ref()
    }

    fn resolve_if_over<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        lines: &mut Vec<String>,
    ) -> StoreResult<()> {
        let Some(engine) = &self.engine else {
            return Ok(());
        };
        if self.resolved {
            return Ok(());
        }
        if let Some(resolution) = engine.resolution() {
            self.resolved = true;
            session.apply_resolution(resolution)?;
            lines.push("Press ok to continue.".to_string());
        }
        Ok(())
    }
}

fn log_lines(events: &[BattleEvent]) -> Vec<String> {
    events.iter().filter_map(BattleEvent::format).collect()
}

impl SceneLifecycle for BattleScene {
    fn initialize<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
    ) -> StoreResult<Vec<String>> {
        let lead = match session.lead() {
            Some(lead) => lead.clone(),
            None => panic!("battle scene entered with an empty team"),
        };
        let mut engine = BattleEngine::start(
            lead,
            session.config.encounter.wild_species,
            &session.config.battle,
        );
        engine.begin();

        let mut lines = engine.events().log_lines();
        self.engine = Some(engine);
        self.resolved = false;
        self.resolve_if_over(session, &mut lines)?;
        Ok(lines)
    }

    fn tick<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<SceneUpdate> {
        let now = session.clock.now();
        let Some(engine) = self.engine.as_mut() else {
            return Ok(SceneUpdate::default());
        };

        if engine.is_over() {
            let update = match intent {
                Some(PlayerIntent::Acknowledge) => {
                    SceneUpdate::default().switch_to(SceneId::Exploration)
                }
                _ => SceneUpdate::default(),
            };
            return Ok(update);
        }

        let mut lines = log_lines(&engine.tick(now, &mut session.rng));

        if engine.awaiting_player() {
            match intent {
                Some(PlayerIntent::ChooseMove(index)) => {
                    if engine.lead().get_move(index).is_some() {
                        lines.extend(log_lines(&engine.player_attack(index, now)));
                    } else {
                        lines.push(format!("{} doesn't know that move.", engine.lead().name));
                    }
                }
                Some(PlayerIntent::ThrowBall) => {
                    lines.extend(log_lines(&engine.attempt_capture(now, &mut session.rng)));
                }
                Some(other) => debug!(?other, "intent ignored in battle"),
                None => {}
            }
            // A zero pacing delay retaliates within the same update.
            lines.extend(log_lines(&engine.tick(now, &mut session.rng)));
        } else if let Some(intent) = intent {
            debug!(?intent, phase = ?engine.phase(), "battle busy, intent ignored");
        }

        self.resolve_if_over(session, &mut lines)?;
        Ok(SceneUpdate::lines(lines))
    }

    fn teardown<S: KeyValueStore>(&mut self, _session: &mut GameSession<S>) {
        self.engine = None;
        self.resolved = false;
    }
}

/// The active scene.
#[derive(Debug, Clone)]
pub enum Scene {
    StarterSelection(StarterScene),
    Exploration(ExplorationScene),
    Battle(BattleScene),
}

impl Scene {
    fn new(id: SceneId) -> Self {
        match id {
            SceneId::StarterSelection => Scene::StarterSelection(StarterScene),
            SceneId::Exploration => Scene::Exploration(ExplorationScene),
            SceneId::Battle => Scene::Battle(BattleScene::default()),
        }
    }

    pub fn id(&self) -> SceneId {
        match self {
            Scene::StarterSelection(_) => SceneId::StarterSelection,
            Scene::Exploration(_) => SceneId::Exploration,
            Scene::Battle(_) => SceneId::Battle,
        }
    }
}

impl SceneLifecycle for Scene {
    fn initialize<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
    ) -> StoreResult<Vec<String>> {
        match self {
            Scene::StarterSelection(scene) => scene.initialize(session),
            Scene::Exploration(scene) => scene.initialize(session),
            Scene::Battle(scene) => scene.initialize(session),
        }
    }

    fn tick<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<SceneUpdate> {
        match self {
            Scene::StarterSelection(scene) => scene.tick(session, intent),
            Scene::Exploration(scene) => scene.tick(session, intent),
            Scene::Battle(scene) => scene.tick(session, intent),
        }
    }

    fn teardown<S: KeyValueStore>(&mut self, session: &mut GameSession<S>) {
        match self {
            Scene::StarterSelection(scene) => scene.teardown(session),
            Scene::Exploration(scene) => scene.teardown(session),
            Scene::Battle(scene) => scene.teardown(session),
        }
    }
}

/// Owns the active scene and forwards updates into it.
#[derive(Debug, Clone)]
pub struct SceneOrchestrator {
    scene: Scene,
}

impl SceneOrchestrator {
    /// Open on exploration when the save already holds a started game,
    /// otherwise on starter selection.
    pub fn start<S: KeyValueStore>(
        session: &mut GameSession<S>,
    ) -> StoreResult<(Self, Vec<String>)> {
        let id = if session.has_started() {
            SceneId::Exploration
        } else {
            SceneId::StarterSelection
        };
        let mut scene = Scene::new(id);
        let lines = scene.initialize(session)?;
        info!(scene = ?id, "scene started");
        Ok((Self { scene }, lines))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_id(&self) -> SceneId {
        self.scene.id()
    }

    /// Advance the game clock by `delta_ms`, then tick the active scene with
    /// the player's intent. Returns the log lines produced.
    pub fn update<S: KeyValueStore>(
        &mut self,
        session: &mut GameSession<S>,
        delta_ms: u64,
        intent: Option<PlayerIntent>,
    ) -> StoreResult<Vec<String>> {
        session.clock.advance(delta_ms);
        let SceneUpdate { mut lines, next } = self.scene.tick(session, intent)?;

        if let Some(next) = next {
            info!(from = ?self.scene.id(), to = ?next, "scene change");
            self.scene.teardown(session);
            self.scene = Scene::new(next);
            lines.extend(self.scene.initialize(session)?);
        }
        Ok(lines)
    }

    /// Game time until the battle's pending retaliation is due.
    pub fn pending_delay<S: KeyValueStore>(&self, session: &GameSession<S>) -> Option<u64> {
        match &self.scene {
            Scene::Battle(scene) => scene
                .engine()
                .and_then(|engine| engine.time_until_next_task(session.clock.now())),
            _ => None,
        }
    }

    /// Text rendering of the active scene.
    pub fn render<S: KeyValueStore>(&self, session: &GameSession<S>) -> String {
        let mut out = String::new();
        match &self.scene {
            Scene::StarterSelection(_) => {
                for data in catalog().iter() {
                    let moves: Vec<&str> = data.moves.iter().map(|m| m.name.as_str()).collect();
                    let _ = writeln!(
                        out,
                        "  {} ({}, {} HP) - {}",
                        data.name(),
                        data.element,
                        data.max_hp,
                        moves.join(", ")
                    );
                }
                out.push_str("Type a name to choose.\n");
            }
            Scene::Exploration(_) => {
                out.push_str(&session.map.render(session.position));
                out.push_str("Move with w/a/s/d, or wait.\n");
            }
            Scene::Battle(scene) => {
                if let Some(engine) = scene.engine() {
                    let (player, opponent) = engine.hp_displays();
                    for display in [&opponent, &player] {
                        let _ = writeln!(out, "{} (Lv {})", display.name, display.level);
                        let _ = writeln!(out, "HP: {}/{}", display.current_hp, display.max_hp);
                    }
                    if engine.awaiting_player() {
                        for (index, move_) in engine.lead().moves.iter().enumerate() {
                            let _ = write!(out, "{}) {}  ", index + 1, move_.name);
                        }
                        out.push_str("b) Ball\n");
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::TurnRng;
    use crate::config::GameConfig;
    use crate::creature::{Creature, Team};
    use crate::store::{MemoryStore, SaveStore};
    use crate::world::Position;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Session whose spawn tile is tall grass.
    fn grass_session(draws: Vec<f64>) -> GameSession<MemoryStore> {
        let mut config = GameConfig::default();
        config.world.spawn = Position::new(3, 2);
        GameSession::open(config, MemoryStore::new(), TurnRng::new_for_test(draws)).unwrap()
    }

    fn started(
        draws: Vec<f64>,
        starter: Species,
    ) -> (SceneOrchestrator, GameSession<MemoryStore>) {
        let mut session = grass_session(draws);
        let (mut orchestrator, _) = SceneOrchestrator::start(&mut session).unwrap();
        orchestrator
            .update(&mut session, 0, Some(PlayerIntent::SelectStarter(starter)))
            .unwrap();
        (orchestrator, session)
    }

    /// Start a game and walk into a battle on the first encounter check.
    fn in_battle(
        mut draws: Vec<f64>,
        starter: Species,
    ) -> (SceneOrchestrator, GameSession<MemoryStore>) {
        draws.insert(0, 0.05);
        let (mut orchestrator, mut session) = started(draws, starter);
        let lines = orchestrator
            .update(&mut session, 1000, Some(PlayerIntent::Wait))
            .unwrap();
        assert_eq!(lines, vec!["A wild Squirtle appeared!".to_string()]);
        assert_eq!(orchestrator.scene_id(), SceneId::Battle);
        (orchestrator, session)
    }

    #[rstest]
    #[case("w", PlayerIntent::Move(Direction::Up))]
    #[case(" Right ", PlayerIntent::Move(Direction::Right))]
    #[case("", PlayerIntent::Wait)]
    #[case("2", PlayerIntent::ChooseMove(1))]
    #[case("ball", PlayerIntent::ThrowBall)]
    #[case("ok", PlayerIntent::Acknowledge)]
    #[case("bulbasaur", PlayerIntent::SelectStarter(Species::Bulbasaur))]
    fn test_parse_intent(#[case] command: &str, #[case] expected: PlayerIntent) {
        assert_eq!(command.parse::<PlayerIntent>(), Ok(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("fly")]
    fn test_parse_unknown_command(#[case] command: &str) {
        assert_eq!(
            command.parse::<PlayerIntent>(),
            Err(UnknownCommand(command.to_string()))
        );
    }

    #[test]
    fn test_new_game_opens_on_starter_selection() {
        let mut session = grass_session(vec![]);
        let (orchestrator, lines) = SceneOrchestrator::start(&mut session).unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::StarterSelection);
        assert_eq!(lines, vec!["Choose your starter!".to_string()]);
        let menu = orchestrator.render(&session);
        assert!(menu.contains("Charmander (Fire, 40 HP) - Scratch, Ember"));
        assert!(menu.contains("Bulbasaur (Grass, 44 HP) - Tackle, Vine Whip"));
    }

    #[test]
    fn test_selecting_starter_moves_to_exploration() {
        let mut session = grass_session(vec![]);
        let (mut orchestrator, _) = SceneOrchestrator::start(&mut session).unwrap();

        // Exploration intents are ignored on the starter screen.
        orchestrator
            .update(&mut session, 0, Some(PlayerIntent::Move(Direction::Down)))
            .unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::StarterSelection);

        let lines = orchestrator
            .update(
                &mut session,
                0,
                Some(PlayerIntent::SelectStarter(Species::Charmander)),
            )
            .unwrap();
        assert_eq!(lines, vec!["You chose Charmander!".to_string()]);
        assert_eq!(orchestrator.scene_id(), SceneId::Exploration);
        assert_eq!(
            session.store().try_load().unwrap().starter,
            Some(Species::Charmander)
        );
    }

    #[test]
    fn test_started_save_resumes_in_exploration() {
        let mut store = SaveStore::new(MemoryStore::new());
        store.save_starter(Species::Squirtle).unwrap();
        store.save_team(&Team::with_starter(Species::Squirtle)).unwrap();
        let mut session = GameSession::open(
            GameConfig::default(),
            store.backend().clone(),
            TurnRng::new_for_test(vec![]),
        )
        .unwrap();

        let (orchestrator, _) = SceneOrchestrator::start(&mut session).unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::Exploration);
        assert!(orchestrator.render(&session).contains('@'));
    }

    #[test]
    fn test_encounter_roll_above_rate_keeps_exploring() {
        let (mut orchestrator, mut session) = started(vec![0.5], Species::Charmander);
        orchestrator
            .update(&mut session, 1000, Some(PlayerIntent::Wait))
            .unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::Exploration);
    }

    #[test]
    fn test_three_embers_win_and_persist_level_up() {
        // Encounter roll, then the opponent picks Tackle twice.
        let (mut orchestrator, mut session) = in_battle(vec![0.0, 0.0], Species::Charmander);

        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ChooseMove(1)))
            .unwrap();
        assert_eq!(lines, vec!["Charmander used Ember!".to_string()]);
        assert_eq!(orchestrator.pending_delay(&session), Some(1000));

        // Input is ignored while the opponent is about to move.
        let lines = orchestrator
            .update(&mut session, 500, Some(PlayerIntent::ChooseMove(1)))
            .unwrap();
        assert!(lines.is_empty());

        let lines = orchestrator.update(&mut session, 500, None).unwrap();
        assert_eq!(lines, vec!["Squirtle used Tackle!".to_string()]);

        orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ChooseMove(1)))
            .unwrap();
        orchestrator.update(&mut session, 1000, None).unwrap();
        let render = orchestrator.render(&session);
        assert!(render.contains("Squirtle (Lv 5)\nHP: 12/42"));
        assert!(render.contains("Charmander (Lv 5)\nHP: 20/40"));

        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ChooseMove(1)))
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "Charmander used Ember!".to_string(),
                "Squirtle fainted! You win! Gained EXP.".to_string(),
                "Charmander grew to level 6!".to_string(),
                "Press ok to continue.".to_string(),
            ]
        );

        let saved = session.store().try_load().unwrap();
        let lead = saved.team.lead().unwrap();
        assert_eq!((lead.level, lead.current_hp(), lead.max_hp()), (6, 45, 45));

        // The battle stays on screen until acknowledged.
        orchestrator.update(&mut session, 5000, None).unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::Battle);
        orchestrator
            .update(&mut session, 0, Some(PlayerIntent::Acknowledge))
            .unwrap();
        assert_eq!(orchestrator.scene_id(), SceneId::Exploration);
    }

    #[test]
    fn test_capture_appends_to_saved_team() {
        let (mut orchestrator, mut session) = in_battle(vec![0.1], Species::Bulbasaur);

        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ThrowBall))
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "Gotcha! Squirtle was caught!".to_string(),
                "Press ok to continue.".to_string(),
            ]
        );

        let saved = session.store().try_load().unwrap();
        assert_eq!(saved.team.len(), 2);
        assert_eq!(saved.team.members()[1], Creature::new(Species::Squirtle));
    }

    #[test]
    fn test_break_free_then_retaliation() {
        let (mut orchestrator, mut session) = in_battle(vec![0.9, 0.99], Species::Bulbasaur);

        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ThrowBall))
            .unwrap();
        assert_eq!(lines, vec!["Squirtle broke free!".to_string()]);

        let lines = orchestrator.update(&mut session, 1000, None).unwrap();
        assert_eq!(lines, vec!["Squirtle used Water Gun!".to_string()]);
        assert_eq!(orchestrator.pending_delay(&session), None);
    }

    #[test]
    fn test_unknown_move_index_is_reported() {
        let (mut orchestrator, mut session) = in_battle(vec![], Species::Charmander);
        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ChooseMove(7)))
            .unwrap();
        assert_eq!(lines, vec!["Charmander doesn't know that move.".to_string()]);
    }

    #[test]
    fn test_fainted_lead_loses_immediately() {
        let mut fainted = Creature::new(Species::Charmander);
        fainted.set_hp(0);
        let mut store = SaveStore::new(MemoryStore::new());
        store.save_starter(Species::Charmander).unwrap();
        store.save_team(&Team::new(vec![fainted])).unwrap();

        let mut config = GameConfig::default();
        config.world.spawn = Position::new(3, 2);
        let mut session = GameSession::open(
            config,
            store.backend().clone(),
            TurnRng::new_for_test(vec![0.05]),
        )
        .unwrap();
        let (mut orchestrator, _) = SceneOrchestrator::start(&mut session).unwrap();

        let lines = orchestrator
            .update(&mut session, 1000, Some(PlayerIntent::Wait))
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "A wild Squirtle appeared!".to_string(),
                "Charmander is unable to battle!".to_string(),
                "Press ok to continue.".to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_pacing_retaliates_in_same_update() {
        let mut config = GameConfig::default();
        config.world.spawn = Position::new(3, 2);
        config.battle.pacing_delay_ms = 0;
        let mut session = GameSession::open(
            config,
            MemoryStore::new(),
            TurnRng::new_for_test(vec![0.05, 0.0]),
        )
        .unwrap();
        let (mut orchestrator, _) = SceneOrchestrator::start(&mut session).unwrap();
        orchestrator
            .update(&mut session, 0, Some(PlayerIntent::SelectStarter(Species::Squirtle)))
            .unwrap();
        orchestrator
            .update(&mut session, 1000, Some(PlayerIntent::Wait))
            .unwrap();

        let lines = orchestrator
            .update(&mut session, 0, Some(PlayerIntent::ChooseMove(0)))
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "Squirtle used Tackle!".to_string(),
                "Squirtle used Tackle!".to_string(),
            ]
        );
    }
}
