use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the battle currently stands.
///
/// `Victory`, `Defeat` and `Captured` are terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Intro,
    PlayerChoice,
    ResolvingPlayerMove,
    ResolvingEnemyMove,
    CaptureAttempt,
    BreakFree,
    Victory,
    Defeat,
    Captured,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BattlePhase::Victory | BattlePhase::Defeat | BattlePhase::Captured
        )
    }

    pub fn outcome(self) -> Option<BattleOutcome> {
        match self {
            BattlePhase::Victory => Some(BattleOutcome::Victory),
            BattlePhase::Defeat => Some(BattleOutcome::Defeat),
            BattlePhase::Captured => Some(BattleOutcome::Captured),
            _ => None,
        }
    }
}

/// Terminal battle result handed back to the exploration context.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Captured,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Which side of the battle an event refers to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted {
        lead: String,
        opponent: String,
    },
    LeadUnableToBattle {
        lead: String,
    },
    MoveUsed {
        side: Side,
        creature: String,
        move_name: String,
    },
    DamageDealt {
        target: Side,
        damage: u16,
        remaining_hp: u16,
    },
    CreatureFainted {
        side: Side,
        creature: String,
    },
    LeveledUp {
        creature: String,
        level: u16,
        max_hp: u16,
    },
    CaptureAttempted {
        target: String,
        probability: f64,
    },
    CaptureSucceeded {
        target: String,
    },
    CaptureFailed {
        target: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into a log line.
    /// Returns None for silent events; the HP display already covers them.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { opponent, .. } => {
                Some(format!("A wild {} appeared!", opponent))
            }
            BattleEvent::LeadUnableToBattle { lead } => {
                Some(format!("{} is unable to battle!", lead))
            }
            BattleEvent::MoveUsed {
                creature,
                move_name,
                ..
            } => Some(format!("{} used {}!", creature, move_name)),
            BattleEvent::DamageDealt { .. } => None,
            BattleEvent::CreatureFainted { side, creature } => match side {
                Side::Opponent => Some(format!("{} fainted! You win! Gained EXP.", creature)),
                Side::Player => Some(format!("{} fainted! You lost.", creature)),
            },
            BattleEvent::LeveledUp {
                creature, level, ..
            } => Some(format!("{} grew to level {}!", creature, level)),
            BattleEvent::CaptureAttempted { .. } => None,
            BattleEvent::CaptureSucceeded { target } => {
                Some(format!("Gotcha! {} was caught!", target))
            }
            BattleEvent::CaptureFailed { target } => Some(format!("{} broke free!", target)),
            BattleEvent::BattleEnded { .. } => None,
        }
    }
}

/// Event bus for collecting battle events in the order they resolved.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events pushed at or after `start`.
    pub fn since(&self, start: usize) -> &[BattleEvent] {
        &self.events[start.min(self.events.len())..]
    }

    /// Formatted log lines, skipping silent events.
    pub fn log_lines(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Scripted { outcomes: Vec<f64>, index: usize },
    Random(StdRng),
}

/// Source of every random draw the game makes: encounter rolls, opponent
/// move picks, and capture rolls. Draws are uniform in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    /// Replays the given draws in order, then panics.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Random(StdRng::from_os_rng()),
        }
    }

    /// Reproducible random stream.
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Random(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome = match &mut self.source {
            RngSource::Scripted { outcomes, index } => {
                let Some(&outcome) = outcomes.get(*index) else {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                };
                *index += 1;
                outcome
            }
            RngSource::Random(rng) => rng.random::<f64>(),
        };
        tracing::trace!(outcome, reason, "rng draw");
        outcome
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        assert!(len > 0, "cannot pick from an empty list ({})", reason);
        let unit = self.next_unit(reason);
        ((unit * len as f64) as usize).min(len - 1)
    }
}
