//! The process-wide world service object.
//!
//! All entity state mutation happens here, on one logical thread driven
//! by discrete command and timer dispatch. Timers are entries on the
//! cooperative [`Timeline`]; [`World::advance`] fires the due ones and
//! re-validates liveness before touching anything, because the entity
//! or effect may have been destroyed between scheduling and firing.

use std::collections::HashMap;
use std::rc::Rc;

use arrayvec::ArrayVec;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use living_core::{
    CoreConfig, Effect, EffectId, EffectSpec, EntityId, StatBlock, StopReason, TaskKind, Tick,
    Timeline,
};

use crate::callback::CallbackTable;
use crate::combat::PursuitLedger;
use crate::error::{Result, RuntimeError};
use crate::hooks::HookRegistry;
use crate::messaging::Messenger;

/// One living entity: its stat block, its effect stack, and its
/// privilege flag. Effects are evaluated most-recently-added first.
#[derive(Debug)]
pub struct Living {
    pub id: EntityId,
    pub stats: StatBlock,
    pub effects: ArrayVec<Effect, { CoreConfig::MAX_EFFECTS }>,
    pub wizard: bool,
}

impl Living {
    fn new(id: EntityId, wizard: bool) -> Self {
        Self {
            id,
            stats: StatBlock::new(),
            effects: ArrayVec::new(),
            wizard,
        }
    }
}

/// Explicit service object tying the subsystems together. Created at
/// startup, torn down at shutdown; never an implicit global.
pub struct World {
    pub(crate) config: CoreConfig,
    pub(crate) timeline: Timeline,
    pub(crate) livings: HashMap<EntityId, Living>,
    pub(crate) hooks: Rc<HookRegistry>,
    pub(crate) callbacks: CallbackTable,
    pub(crate) messenger: Rc<dyn Messenger>,
    pub(crate) pursuit: PursuitLedger,
    rng: StdRng,
    next_effect: u64,
}

impl World {
    /// Builds a world around an injected messenger. Configuration
    /// misuse is the one fatal failure mode of the core.
    pub fn new(config: CoreConfig, messenger: Rc<dyn Messenger>) -> Result<Self> {
        Self::with_rng(config, messenger, StdRng::from_entropy())
    }

    /// Deterministic variant for tests and replay.
    pub fn with_seed(config: CoreConfig, messenger: Rc<dyn Messenger>, seed: u64) -> Result<Self> {
        Self::with_rng(config, messenger, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: CoreConfig, messenger: Rc<dyn Messenger>, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            timeline: Timeline::new(),
            livings: HashMap::new(),
            hooks: Rc::new(HookRegistry::new()),
            callbacks: CallbackTable::new(),
            messenger,
            pursuit: PursuitLedger::default(),
            rng,
            next_effect: 0,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.timeline.now()
    }

    pub fn hooks(&self) -> Rc<HookRegistry> {
        Rc::clone(&self.hooks)
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackTable {
        &mut self.callbacks
    }

    /// Clears subscriptions and pending timers. Called at shutdown.
    pub fn teardown(&mut self) {
        self.hooks.clear();
        let entities: Vec<EntityId> = self.livings.keys().copied().collect();
        for entity in entities {
            self.despawn(entity);
        }
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    /// Creates an entity with an all-zero stat block.
    pub fn spawn(&mut self, id: EntityId) -> &mut Living {
        self.livings.entry(id).or_insert_with(|| Living::new(id, false))
    }

    /// Creates a privileged entity; status effects never block it.
    pub fn spawn_wizard(&mut self, id: EntityId) -> &mut Living {
        self.livings.entry(id).or_insert_with(|| Living::new(id, true))
    }

    /// Destroys an entity, cancelling every timer it owns. Timers that
    /// already fired find nothing and become silent no-ops.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let existed = self.livings.remove(&id).is_some();
        if existed {
            self.timeline.cancel_owned(id);
            self.pursuit.forget(id);
            debug!(target: "runtime::world", entity = %id, "living despawned");
        }
        existed
    }

    pub fn living(&self, id: EntityId) -> Option<&Living> {
        self.livings.get(&id)
    }

    pub fn living_mut(&mut self, id: EntityId) -> Option<&mut Living> {
        self.livings.get_mut(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.livings.contains_key(&id)
    }

    // ------------------------------------------------------------------
    // Stats and experience
    // ------------------------------------------------------------------

    /// Sets a base stat with optional random deviation. Returns the
    /// stored value, 0 on failure (unknown entity, bad index, value
    /// below 1) so combat math is never aborted.
    pub fn set_base_stat(&mut self, id: EntityId, stat: usize, value: i32, deviation: i32) -> i32 {
        let Some(living) = self.livings.get_mut(&id) else {
            return 0;
        };
        living.stats.set_base_stat(stat, value, deviation, &mut self.rng)
    }

    /// Effective stat per the core invariant, -1 on failure.
    pub fn effective_stat(&self, id: EntityId, stat: usize) -> i32 {
        self.livings
            .get(&id)
            .map_or(-1, |living| living.stats.effective(stat))
    }

    /// Base stat without modifiers, -1 on failure.
    pub fn base_stat(&self, id: EntityId, stat: usize) -> i32 {
        self.livings
            .get(&id)
            .map_or(-1, |living| living.stats.base_stat(stat))
    }

    /// Persistent extra modifier (equipment and the like), 0 on failure.
    pub fn set_extra_stat(&mut self, id: EntityId, stat: usize, value: i32) -> i32 {
        self.livings
            .get_mut(&id)
            .map_or(0, |living| living.stats.set_extra(stat, value))
    }

    /// Grants a temporary stat delta for `dt` healing intervals.
    ///
    /// Rejected when the grant would push the modifier bonus above the
    /// stacking ceiling or the duration is non-positive; durations above
    /// the configured maximum are clamped, not rejected. Each accepted
    /// grant schedules its own expiry; concurrent grants stack as a
    /// running sum.
    pub fn grant_tmp_stat(&mut self, id: EntityId, stat: usize, ds: i32, dt: i32) -> Result<()> {
        let Some(living) = self.livings.get_mut(&id) else {
            return Err(RuntimeError::UnknownEntity(id));
        };
        living.stats.check_tmp_grant(stat, ds, dt)?;
        living.stats.apply_tmp(stat, ds);

        let intervals = (dt as u32).min(self.config.tmp_stat_max_intervals);
        self.timeline.schedule_in(
            u64::from(intervals) * self.config.interval_ticks,
            TaskKind::ExpireTmpStat {
                entity: id,
                stat,
                delta: ds,
            },
        );
        debug!(
            target: "runtime::stats",
            entity = %id,
            stat,
            delta = ds,
            intervals,
            "temporary stat granted"
        );
        Ok(())
    }

    /// Spreads an experience change over the entity's attributes and
    /// recomputes its base stats from the accumulators.
    pub fn distribute_exp(&mut self, id: EntityId, delta: i64, tax_free: bool) -> Result<()> {
        let curve = self.config.curve;
        let Some(living) = self.livings.get_mut(&id) else {
            return Err(RuntimeError::UnknownEntity(id));
        };
        living.stats.distribute_exp(delta, tax_free, &curve);
        debug!(
            target: "runtime::stats",
            entity = %id,
            delta,
            tax_free,
            total = living.stats.total_exp(),
            "experience distributed"
        );
        Ok(())
    }

    /// Login-time consistency check between the total experience counter
    /// and the per-attribute accumulators. Returns the correction.
    pub fn reconcile_exp(&mut self, id: EntityId) -> Result<i64> {
        let curve = self.config.curve;
        let tolerance = self.config.exp_tolerance;
        let Some(living) = self.livings.get_mut(&id) else {
            return Err(RuntimeError::UnknownEntity(id));
        };
        let drift = living.stats.reconcile_exp(&curve, tolerance);
        if drift != 0 {
            debug!(
                target: "runtime::stats",
                entity = %id,
                drift,
                "experience drift reconciled"
            );
        }
        Ok(drift)
    }

    // ------------------------------------------------------------------
    // Effects
    // ------------------------------------------------------------------

    /// Attaches an effect to an entity, scheduling its timeout if the
    /// spec carries a duration. Fails when the entity is unknown or its
    /// effect stack is full.
    pub fn apply_effect(&mut self, owner: EntityId, spec: EffectSpec) -> Result<EffectId> {
        let Some(living) = self.livings.get_mut(&owner) else {
            return Err(RuntimeError::UnknownEntity(owner));
        };
        if living.effects.is_full() {
            return Err(RuntimeError::EffectStackFull(owner));
        }

        let id = EffectId(self.next_effect);
        self.next_effect += 1;

        let mut effect = Effect::from_spec(id, spec);
        if let Some(duration) = effect.spec.duration {
            effect.timer = Some(self.timeline.schedule_in(
                duration,
                TaskKind::EffectTimeout {
                    entity: owner,
                    effect: id,
                },
            ));
        }
        living.effects.push(effect);
        debug!(target: "runtime::effects", entity = %owner, effect = %id, "effect applied");
        Ok(id)
    }

    /// Effects currently active on an entity, oldest first.
    pub fn effects(&self, id: EntityId) -> &[Effect] {
        self.livings.get(&id).map_or(&[], |living| &living.effects)
    }

    /// Terminates one effect instance: optionally invokes its stop
    /// callback (result ignored on this path), delivers the stop
    /// message, cancels the pending timeout, and destroys the instance.
    ///
    /// Returns false when the entity or effect is already gone — a stale
    /// fire, swallowed silently.
    pub(crate) fn stop_effect(
        &mut self,
        owner: EntityId,
        effect_id: EffectId,
        reason: StopReason,
        invoke_callback: bool,
    ) -> bool {
        let Some(living) = self.livings.get_mut(&owner) else {
            trace!(target: "runtime::effects", entity = %owner, "stale effect stop ignored");
            return false;
        };
        let Some(position) = living.effects.iter().position(|e| e.id == effect_id) else {
            trace!(target: "runtime::effects", effect = %effect_id, "effect already gone");
            return false;
        };
        let effect = living.effects.remove(position);

        if invoke_callback {
            if let Some(reference) = &effect.spec.stop_callback {
                match self.callbacks.resolve(&reference.name) {
                    Some(callback) => {
                        // The break is forced; the decision is ignored.
                        let _ = callback(reference.owner, reason);
                    }
                    None => trace!(
                        target: "runtime::effects",
                        callback = %reference.name,
                        "stop callback not registered"
                    ),
                }
            }
        }
        if let Some(message) = &effect.spec.stop_message {
            self.messenger.deliver(owner, message);
        }
        if let Some(handle) = effect.timer {
            self.timeline.cancel(handle);
        }
        debug!(
            target: "runtime::effects",
            entity = %owner,
            effect = %effect_id,
            ?reason,
            "effect stopped"
        );
        true
    }

    // ------------------------------------------------------------------
    // Cooperative loop
    // ------------------------------------------------------------------

    /// Moves the clock forward and fires the timers that came due.
    ///
    /// Every fired task re-validates liveness first: the entity or the
    /// effect may have been destroyed since scheduling, and a stale fire
    /// is a no-op, not an error.
    pub fn advance(&mut self, ticks: u64) {
        for task in self.timeline.advance(ticks) {
            match task {
                TaskKind::ExpireTmpStat { entity, stat, delta } => {
                    match self.livings.get_mut(&entity) {
                        Some(living) => {
                            living.stats.expire_tmp(stat, delta);
                            debug!(
                                target: "runtime::stats",
                                entity = %entity,
                                stat,
                                delta,
                                "temporary stat expired"
                            );
                        }
                        None => trace!(
                            target: "runtime::timeline",
                            entity = %entity,
                            "stale stat expiry ignored"
                        ),
                    }
                }
                TaskKind::EffectTimeout { entity, effect } => {
                    // Timeout cannot be vetoed; the callback is invoked
                    // unconditionally and its result discarded.
                    self.stop_effect(entity, effect, StopReason::Timeout, true);
                }
            }
        }
    }
}
