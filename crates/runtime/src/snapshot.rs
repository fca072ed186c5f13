//! Serializable snapshots of living entities.
//!
//! Live timer handles never persist. An effect snapshot carries the
//! ticks that were left on its timeout instead, and restore reschedules
//! from that. Temporary stat deltas are dropped entirely: their expiry
//! timers cannot be reconstructed, and a boost that outlives its timer
//! would be permanent.

use living_core::{EffectSpec, EntityId, StatBlock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::world::World;

/// One frozen effect: its full spec with `duration` rewritten to the
/// ticks that remained when the snapshot was taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub spec: EffectSpec,
}

/// Everything needed to rebuild an entity in a fresh world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivingSnapshot {
    pub id: EntityId,
    pub wizard: bool,
    pub stats: StatBlock,
    pub effects: Vec<EffectSnapshot>,
}

impl World {
    /// Freezes an entity's persistent state.
    pub fn snapshot_living(&self, id: EntityId) -> Result<LivingSnapshot> {
        let Some(living) = self.livings.get(&id) else {
            return Err(RuntimeError::UnknownEntity(id));
        };

        let mut stats = living.stats.clone();
        stats.clear_tmp();

        let effects = living
            .effects
            .iter()
            .map(|effect| {
                let mut spec = effect.spec.clone();
                spec.duration = effect.timer.and_then(|handle| self.timeline.remaining(handle));
                EffectSnapshot { spec }
            })
            .collect();

        Ok(LivingSnapshot {
            id,
            wizard: living.wizard,
            stats,
            effects,
        })
    }

    /// Rebuilds an entity from a snapshot, rescheduling effect timeouts
    /// from the remaining durations. Replaces any entity already using
    /// the id.
    pub fn restore_living(&mut self, snapshot: LivingSnapshot) -> Result<()> {
        self.despawn(snapshot.id);
        let living = if snapshot.wizard {
            self.spawn_wizard(snapshot.id)
        } else {
            self.spawn(snapshot.id)
        };
        living.stats = snapshot.stats;

        for effect in snapshot.effects {
            self.apply_effect(snapshot.id, effect.spec)?;
        }
        debug!(target: "runtime::world", entity = %snapshot.id, "living restored");
        Ok(())
    }
}
