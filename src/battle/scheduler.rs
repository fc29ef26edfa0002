use std::collections::VecDeque;

/// Deferred battle continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    EnemyAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub due_at_ms: u64,
    pub action: ScheduledAction,
}

/// Timer queue driven by the game clock. Tasks fire in scheduling order and
/// each one is handed out exactly once.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: VecDeque<ScheduledTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: ScheduledAction) {
        self.tasks.push_back(ScheduledTask {
            due_at_ms: now_ms.saturating_add(delay_ms),
            action,
        });
    }

    /// Remove and return the next task if it is due.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledTask> {
        match self.tasks.front() {
            Some(task) if task.due_at_ms <= now_ms => self.tasks.pop_front(),
            _ => None,
        }
    }

    /// Time until the next task is due; zero if it already is.
    pub fn time_until_next(&self, now_ms: u64) -> Option<u64> {
        self.tasks
            .front()
            .map(|task| task.due_at_ms.saturating_sub(now_ms))
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
