use crate::battle::catch::{capture_probability, roll_capture_success};
use crate::battle::progression::apply_experience_gain;
use crate::battle::scheduler::{ScheduledAction, TaskQueue};
use crate::battle::state::{BattleEvent, BattleOutcome, BattlePhase, EventBus, Side, TurnRng};
use crate::config::BattleConfig;
use crate::creature::Creature;
use schema::Species;
use tracing::{debug, info};

/// The wild side of a battle: either a catalog species at full health or a
/// prepared instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Opponent {
    Species(Species),
    Wild(Creature),
}

impl From<Species> for Opponent {
    fn from(species: Species) -> Self {
        Opponent::Species(species)
    }
}

impl From<Creature> for Opponent {
    fn from(creature: Creature) -> Self {
        Opponent::Wild(creature)
    }
}

/// Health display for one battle participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpDisplay {
    pub name: String,
    pub level: u16,
    pub current_hp: u16,
    pub max_hp: u16,
}

impl HpDisplay {
    fn of(creature: &Creature) -> Self {
        Self {
            name: creature.name.clone(),
            level: creature.level,
            current_hp: creature.current_hp(),
            max_hp: creature.max_hp(),
        }
    }
}

/// What a finished battle changes on the player's team.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleResolution {
    pub outcome: BattleOutcome,
    /// New state for team index 0, present when the lead's state must be written back.
    pub lead: Option<Creature>,
    /// Creature to append to the team.
    pub captured: Option<Creature>,
}

/// One wild battle between the player's lead and an opponent.
///
/// Calling an action outside the phase that allows it is a caller bug and panics.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    lead: Creature,
    opponent: Creature,
    phase: BattlePhase,
    event_bus: EventBus,
    tasks: TaskQueue,
    config: BattleConfig,
    leveled_up: bool,
}

impl BattleEngine {
    /// Start a battle. The lead fights with its current party health; a species
    /// opponent is created at full health.
    pub fn start(lead: Creature, opponent: impl Into<Opponent>, config: &BattleConfig) -> Self {
        let opponent = match opponent.into() {
            Opponent::Species(species) => Creature::new(species),
            Opponent::Wild(creature) => creature,
        };

        info!(
            lead = %lead,
            opponent = %opponent,
            "battle started"
        );

        let mut event_bus = EventBus::new();
        event_bus.push(BattleEvent::BattleStarted {
            lead: lead.name.clone(),
            opponent: opponent.name.clone(),
        });

        Self {
            lead,
            opponent,
            phase: BattlePhase::Intro,
            event_bus,
            tasks: TaskQueue::new(),
            config: config.clone(),
            leveled_up: false,
        }
    }

    /// Leave the intro. A fainted creature cannot act: a fainted lead loses on
    /// the spot, and a fainted opponent hands the player the win.
    pub fn begin(&mut self) -> Vec<BattleEvent> {
        self.expect_phase(BattlePhase::Intro, "begin");
        let start = self.event_bus.len();

        if self.lead.is_fainted() {
            self.event_bus.push(BattleEvent::LeadUnableToBattle {
                lead: self.lead.name.clone(),
            });
            self.finish(BattlePhase::Defeat);
        } else if self.opponent.is_fainted() {
            self.event_bus.push(BattleEvent::CreatureFainted {
                side: Side::Opponent,
                creature: self.opponent.name.clone(),
            });
            self.award_victory();
            self.finish(BattlePhase::Victory);
        } else {
            self.transition(BattlePhase::PlayerChoice);
        }

        self.event_bus.since(start).to_vec()
    }

    /// The lead attacks with the move at `move_index` in its move list.
    pub fn player_attack(&mut self, move_index: usize, now_ms: u64) -> Vec<BattleEvent> {
        self.expect_phase(BattlePhase::PlayerChoice, "player_attack");
        let move_ = match self.lead.get_move(move_index) {
            Some(move_) => move_.clone(),
            None => panic!(
                "{} has no move at index {} (knows {})",
                self.lead.name,
                move_index,
                self.lead.moves.len()
            ),
        };
        let start = self.event_bus.len();

        self.transition(BattlePhase::ResolvingPlayerMove);
        self.event_bus.push(BattleEvent::MoveUsed {
            side: Side::Player,
            creature: self.lead.name.clone(),
            move_name: move_.name.clone(),
        });
        let fainted = self.deal_damage(Side::Opponent, move_.power);

        if fainted {
            self.event_bus.push(BattleEvent::CreatureFainted {
                side: Side::Opponent,
                creature: self.opponent.name.clone(),
            });
            self.award_victory();
            self.finish(BattlePhase::Victory);
        } else {
            self.schedule_enemy_attack(now_ms);
        }

        self.event_bus.since(start).to_vec()
    }

    /// Throw a ball at the opponent.
    pub fn attempt_capture(&mut self, now_ms: u64, rng: &mut TurnRng) -> Vec<BattleEvent> {
        self.expect_phase(BattlePhase::PlayerChoice, "attempt_capture");
        let start = self.event_bus.len();

        self.transition(BattlePhase::CaptureAttempt);
        let probability = capture_probability(&self.opponent, &self.config);
        self.event_bus.push(BattleEvent::CaptureAttempted {
            target: self.opponent.name.clone(),
            probability,
        });

        if roll_capture_success(probability, rng) {
            self.event_bus.push(BattleEvent::CaptureSucceeded {
                target: self.opponent.name.clone(),
            });
            self.finish(BattlePhase::Captured);
        } else {
            self.event_bus.push(BattleEvent::CaptureFailed {
                target: self.opponent.name.clone(),
            });
            self.transition(BattlePhase::BreakFree);
            self.schedule_enemy_attack(now_ms);
        }

        self.event_bus.since(start).to_vec()
    }

    /// Advance the battle clock, running the pending retaliation if it is due.
    pub fn tick(&mut self, now_ms: u64, rng: &mut TurnRng) -> Vec<BattleEvent> {
        let start = self.event_bus.len();
        if let Some(task) = self.tasks.pop_due(now_ms) {
            match task.action {
                ScheduledAction::EnemyAttack => self.enemy_attack(rng),
            }
        }
        self.event_bus.since(start).to_vec()
    }

    /// The opponent answers with a uniformly chosen move.
    fn enemy_attack(&mut self, rng: &mut TurnRng) {
        self.expect_phase(BattlePhase::ResolvingEnemyMove, "enemy_attack");

        let pick = rng.pick_index(self.opponent.moves.len(), "opponent move choice");
        let move_ = self.opponent.moves[pick].clone();
        self.event_bus.push(BattleEvent::MoveUsed {
            side: Side::Opponent,
            creature: self.opponent.name.clone(),
            move_name: move_.name.clone(),
        });

        if self.deal_damage(Side::Player, move_.power) {
            self.event_bus.push(BattleEvent::CreatureFainted {
                side: Side::Player,
                creature: self.lead.name.clone(),
            });
            self.finish(BattlePhase::Defeat);
        } else {
            self.transition(BattlePhase::PlayerChoice);
        }
    }

    fn deal_damage(&mut self, target: Side, power: u16) -> bool {
        let creature = match target {
            Side::Player => &mut self.lead,
            Side::Opponent => &mut self.opponent,
        };
        let (damage, fainted) = creature.take_damage(power);
        let remaining_hp = creature.current_hp();
        self.event_bus.push(BattleEvent::DamageDealt {
            target,
            damage,
            remaining_hp,
        });
        fainted
    }

    fn award_victory(&mut self) {
        assert!(!self.leveled_up, "experience already awarded for this battle");
        apply_experience_gain(&mut self.lead, self.config.level_up_hp_bonus);
        self.leveled_up = true;
        self.event_bus.push(BattleEvent::LeveledUp {
            creature: self.lead.name.clone(),
            level: self.lead.level,
            max_hp: self.lead.max_hp(),
        });
    }

    fn schedule_enemy_attack(&mut self, now_ms: u64) {
        self.transition(BattlePhase::ResolvingEnemyMove);
        self.tasks.schedule(
            now_ms,
            self.config.pacing_delay_ms,
            ScheduledAction::EnemyAttack,
        );
    }

    fn finish(&mut self, terminal: BattlePhase) {
        self.tasks.cancel_all();
        self.transition(terminal);
        if let Some(outcome) = terminal.outcome() {
            self.event_bus.push(BattleEvent::BattleEnded { outcome });
            info!(%outcome, lead = %self.lead, opponent = %self.opponent, "battle ended");
        }
    }

    fn transition(&mut self, next: BattlePhase) {
        debug!(from = ?self.phase, to = ?next, "battle phase");
        self.phase = next;
    }

    fn expect_phase(&self, expected: BattlePhase, action: &str) {
        assert!(
            self.phase == expected,
            "{} called in phase {:?}, expected {:?}",
            action,
            self.phase,
            expected
        );
    }

    // === Queries ===

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.phase.outcome()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn awaiting_player(&self) -> bool {
        self.phase == BattlePhase::PlayerChoice
    }

    pub fn lead(&self) -> &Creature {
        &self.lead
    }

    pub fn opponent(&self) -> &Creature {
        &self.opponent
    }

    /// `(player, opponent)` health displays.
    pub fn hp_displays(&self) -> (HpDisplay, HpDisplay) {
        (HpDisplay::of(&self.lead), HpDisplay::of(&self.opponent))
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// Game time until the pending retaliation fires, if one is scheduled.
    pub fn time_until_next_task(&self, now_ms: u64) -> Option<u64> {
        self.tasks.time_until_next(now_ms)
    }

    /// Team changes for a finished battle; None while the battle is running.
    ///
    /// Damage to the lead is only written back when the lead levels up or faints.
    pub fn resolution(&self) -> Option<BattleResolution> {
        let outcome = self.outcome()?;
        let resolution = match outcome {
            BattleOutcome::Victory | BattleOutcome::Defeat => BattleResolution {
                outcome,
                lead: Some(self.lead.clone()),
                captured: None,
            },
            BattleOutcome::Captured => BattleResolution {
                outcome,
                lead: None,
                captured: Some(self.opponent.clone()),
            },
        };
        Some(resolution)
    }
}
