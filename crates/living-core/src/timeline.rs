//! Cooperative timer wheel.
//!
//! Timers are suspension points, not blocking waits: scheduling returns
//! immediately with a cancellable handle, and the task fires later on
//! the same logical thread when the loop advances past its due tick.
//! Task payloads are plain owner-tagged data, never closures, so the
//! caller can re-validate liveness before mutating anything.
use std::collections::BTreeMap;

use crate::common::{EntityId, Tick};
use crate::effect::EffectId;

/// Handle of a scheduled task. Doubles as the queue key, so cancelling
/// is a plain map removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle {
    due: Tick,
    seq: u64,
}

impl TaskHandle {
    pub fn due(&self) -> Tick {
        self.due
    }
}

/// Deferred operations the core schedules against itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Subtract a temporary stat grant when its duration elapses.
    ExpireTmpStat {
        entity: EntityId,
        stat: usize,
        delta: i32,
    },
    /// Stop an effect whose duration ran out.
    EffectTimeout { entity: EntityId, effect: EffectId },
}

impl TaskKind {
    /// The entity whose destruction makes this task stale.
    pub fn owner(&self) -> EntityId {
        match self {
            TaskKind::ExpireTmpStat { entity, .. } => *entity,
            TaskKind::EffectTimeout { entity, .. } => *entity,
        }
    }
}

/// Ordered queue of pending tasks on the cooperative loop.
#[derive(Debug, Default)]
pub struct Timeline {
    now: Tick,
    seq: u64,
    tasks: BTreeMap<(Tick, u64), TaskKind>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Schedules a task `after` ticks from now and returns its handle.
    pub fn schedule_in(&mut self, after: u64, kind: TaskKind) -> TaskHandle {
        let handle = TaskHandle {
            due: self.now + after,
            seq: self.seq,
        };
        self.seq += 1;
        self.tasks.insert((handle.due, handle.seq), kind);
        handle
    }

    /// Removes a pending task. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(&(handle.due, handle.seq)).is_some()
    }

    /// Drops every pending task owned by `entity`. Part of entity
    /// destruction; fired-but-stale tasks are the caller's no-op.
    pub fn cancel_owned(&mut self, entity: EntityId) {
        self.tasks.retain(|_, kind| kind.owner() != entity);
    }

    /// Ticks remaining until a pending task fires, None if it is no
    /// longer queued.
    pub fn remaining(&self, handle: TaskHandle) -> Option<u64> {
        self.tasks
            .contains_key(&(handle.due, handle.seq))
            .then(|| handle.due - self.now)
    }

    /// Moves time forward and returns the tasks that came due, in
    /// (due-tick, scheduling) order.
    pub fn advance(&mut self, ticks: u64) -> Vec<TaskKind> {
        self.now = self.now + ticks;
        let rest = self.tasks.split_off(&(self.now + 1, 0));
        let due = std::mem::replace(&mut self.tasks, rest);
        due.into_values().collect()
    }
}
