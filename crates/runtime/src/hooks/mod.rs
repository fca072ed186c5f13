//! Named event hooks.
//!
//! Decoupled subsystems observe state transitions by subscribing to a
//! hook name; publishers fire and forget. Each name below documents when
//! it is triggered and with what payload.
mod registry;

use living_core::EntityId;

pub use registry::{HookError, HookFn, HookRegistry};

/// Hook names other subsystems can attach to.
pub mod names {
    /// Triggered when a living kills something.
    /// Payload: [`HookEvent::LivingKilled`].
    pub const HOOK_LIVING_KILLED: &str = "_hook_living_killed";

    /// Triggered in the enemies left behind when a living breaks away
    /// from combat. Payload: [`HookEvent::LivingHunting`].
    pub const HOOK_LIVING_HUNTING: &str = "_hook_living_hunting";

    /// Triggered when a living becomes hunted by other livings.
    /// Payload: [`HookEvent::LivingHunted`].
    pub const HOOK_LIVING_HUNTED: &str = "_hook_living_hunted";

    /// Triggered every combat pulse. Payload:
    /// [`HookEvent::HeartBeatInCombat`].
    pub const HOOK_HEART_BEAT_IN_COMBAT: &str = "_hook_heart_beat_in_combat";
}

/// Typed payloads carried by a publish, one variant per hook name.
#[derive(Clone, Debug, PartialEq)]
pub enum HookEvent {
    LivingKilled {
        victim: EntityId,
    },
    LivingHunting {
        fleeing: EntityId,
    },
    LivingHunted {
        hunters: Vec<EntityId>,
    },
    HeartBeatInCombat {
        me: EntityId,
        enemies: Vec<EntityId>,
        target: Option<EntityId>,
        speed: f64,
    },
}
