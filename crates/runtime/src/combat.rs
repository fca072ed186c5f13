//! Combat interrupts and pursuit bookkeeping.
//!
//! An incoming attack forcibly breaks the target's combat-sensitive
//! effects and records who is hunting whom; a death announcement lets
//! interested subsystems react before the victim is torn down. Both
//! paths publish their facts through the hook registry.

use std::collections::HashMap;

use living_core::{EntityId, StopReason};
use tracing::debug;

use crate::hooks::{names, HookEvent};
use crate::world::World;

/// Who is currently hunting whom. Purely advisory; pursuit behavior
/// itself lives with the subscribers of the hunting hooks.
#[derive(Debug, Default)]
pub struct PursuitLedger {
    hunters: HashMap<EntityId, Vec<EntityId>>,
}

impl PursuitLedger {
    /// Notes that `hunter` is after `prey`. Duplicates collapse.
    pub fn record(&mut self, prey: EntityId, hunter: EntityId) {
        let entry = self.hunters.entry(prey).or_default();
        if !entry.contains(&hunter) {
            entry.push(hunter);
        }
    }

    /// Everyone currently after `prey`, in recording order.
    pub fn hunters_of(&self, prey: EntityId) -> &[EntityId] {
        self.hunters.get(&prey).map_or(&[], Vec::as_slice)
    }

    /// Drops every trace of an entity, as prey and as hunter.
    pub fn forget(&mut self, entity: EntityId) {
        self.hunters.remove(&entity);
        for hunters in self.hunters.values_mut() {
            hunters.retain(|hunter| *hunter != entity);
        }
        self.hunters.retain(|_, hunters| !hunters.is_empty());
    }
}

impl World {
    /// Handles an attack landing on `target` from `attacker`.
    ///
    /// Every combat-sensitive effect on the target is broken exactly
    /// once (callbacks fire, vetoes are ignored), the pursuit is
    /// recorded, and the hunting hooks are published: first the target
    /// learns it is being hunted by fleeing-side observers, then the
    /// full hunter list goes out.
    pub fn on_attacked(&mut self, target: EntityId, attacker: EntityId) {
        if !self.livings.contains_key(&target) {
            return;
        }

        let breakable: Vec<_> = self
            .effects(target)
            .iter()
            .filter(|effect| effect.spec.combat_breaks)
            .map(|effect| effect.id)
            .collect();
        for effect_id in breakable {
            self.stop_effect(target, effect_id, StopReason::Combat, true);
        }

        self.pursuit.record(target, attacker);
        debug!(
            target: "runtime::combat",
            prey = %target,
            attacker = %attacker,
            "attack registered"
        );

        let hooks = self.hooks();
        hooks.publish(
            names::HOOK_LIVING_HUNTING,
            &HookEvent::LivingHunting { fleeing: target },
        );
        hooks.publish(
            names::HOOK_LIVING_HUNTED,
            &HookEvent::LivingHunted {
                hunters: self.pursuit.hunters_of(target).to_vec(),
            },
        );
    }

    /// Announces a death and tears the victim down. Subscribers see the
    /// victim while its state is still intact; the despawn happens after
    /// the hook returns.
    pub fn on_killed(&mut self, victim: EntityId) {
        if !self.livings.contains_key(&victim) {
            return;
        }
        debug!(target: "runtime::combat", victim = %victim, "living killed");
        self.hooks()
            .publish(names::HOOK_LIVING_KILLED, &HookEvent::LivingKilled { victim });
        self.despawn(victim);
    }

    /// Publishes the per-pulse combat heartbeat for one fighter.
    pub fn combat_pulse(
        &self,
        me: EntityId,
        enemies: Vec<EntityId>,
        target: Option<EntityId>,
        speed: f64,
    ) {
        self.hooks.publish(
            names::HOOK_HEART_BEAT_IN_COMBAT,
            &HookEvent::HeartBeatInCombat {
                me,
                enemies,
                target,
                speed,
            },
        );
    }

    /// Who is hunting this entity right now.
    pub fn hunters_of(&self, prey: EntityId) -> &[EntityId] {
        self.pursuit.hunters_of(prey)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use living_core::{CoreConfig, EffectSpec};

    use super::*;
    use crate::callback::StopDecision;
    use crate::messaging::NullMessenger;

    fn world() -> World {
        World::with_seed(CoreConfig::default(), Rc::new(NullMessenger), 3).unwrap()
    }

    #[test]
    fn ledger_collapses_duplicates_and_forgets_both_roles() {
        let mut ledger = PursuitLedger::default();
        ledger.record(EntityId(1), EntityId(2));
        ledger.record(EntityId(1), EntityId(2));
        ledger.record(EntityId(1), EntityId(3));
        ledger.record(EntityId(2), EntityId(1));
        assert_eq!(ledger.hunters_of(EntityId(1)), &[EntityId(2), EntityId(3)]);

        ledger.forget(EntityId(2));
        assert_eq!(ledger.hunters_of(EntityId(1)), &[EntityId(3)]);
        assert!(ledger.hunters_of(EntityId(2)).is_empty());
    }

    #[test]
    fn attack_breaks_each_combat_sensitive_effect_once() {
        let mut world = world();
        let target = EntityId(1);
        world.spawn(target);

        let breaks = Rc::new(Cell::new(0u32));
        let seen = breaks.clone();
        world.callbacks_mut().register(
            "snap_out",
            Rc::new(move |_, reason| {
                assert_eq!(reason, StopReason::Combat);
                seen.set(seen.get() + 1);
                // A veto on the combat path must be ignored.
                StopDecision::Veto
            }),
        );

        for _ in 0..2 {
            world
                .apply_effect(
                    target,
                    EffectSpec::standard("meditating")
                        .with_combat_breaks(true)
                        .with_stop_callback(living_core::StopCallback::new(target, "snap_out")),
                )
                .unwrap();
        }
        world
            .apply_effect(target, EffectSpec::standard("humming"))
            .unwrap();

        world.on_attacked(target, EntityId(2));
        assert_eq!(breaks.get(), 2);
        // The combat-insensitive effect survives.
        assert_eq!(world.effects(target).len(), 1);

        // A second attack finds nothing left to break.
        world.on_attacked(target, EntityId(2));
        assert_eq!(breaks.get(), 2);
    }

    #[test]
    fn attack_publishes_hunting_then_hunted() {
        let mut world = world();
        let prey = EntityId(1);
        world.spawn(prey);

        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks = world.hooks();
        let fleeing_log = log.clone();
        hooks.subscribe(
            names::HOOK_LIVING_HUNTING,
            Rc::new(move |event| {
                if let HookEvent::LivingHunting { fleeing } = event {
                    fleeing_log.borrow_mut().push(format!("hunting {fleeing}"));
                }
                Ok(())
            }),
        );
        let hunted_log = log.clone();
        hooks.subscribe(
            names::HOOK_LIVING_HUNTED,
            Rc::new(move |event| {
                if let HookEvent::LivingHunted { hunters } = event {
                    hunted_log
                        .borrow_mut()
                        .push(format!("hunted by {}", hunters.len()));
                }
                Ok(())
            }),
        );

        world.on_attacked(prey, EntityId(2));
        world.on_attacked(prey, EntityId(3));
        assert_eq!(
            log.borrow().as_slice(),
            &[
                "hunting #1".to_string(),
                "hunted by 1".to_string(),
                "hunting #1".to_string(),
                "hunted by 2".to_string(),
            ]
        );
        assert_eq!(world.hunters_of(prey), &[EntityId(2), EntityId(3)]);
    }

    #[test]
    fn kill_announces_before_teardown() {
        let mut world = world();
        let victim = EntityId(7);
        world.spawn(victim);
        world.set_base_stat(victim, 0, 40, 0);

        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        world.hooks().subscribe(
            names::HOOK_LIVING_KILLED,
            Rc::new(move |event| {
                assert!(matches!(
                    event,
                    HookEvent::LivingKilled { victim } if *victim == EntityId(7)
                ));
                flag.set(true);
                Ok(())
            }),
        );

        world.on_killed(victim);
        assert!(seen.get());
        assert!(!world.is_alive(victim));
        // Idempotent on a gone entity.
        world.on_killed(victim);
    }

    #[test]
    fn despawn_clears_pursuit_entries() {
        let mut world = world();
        let prey = EntityId(1);
        world.spawn(prey);
        world.on_attacked(prey, EntityId(2));
        assert_eq!(world.hunters_of(prey).len(), 1);

        world.despawn(prey);
        assert!(world.hunters_of(prey).is_empty());
    }
}
