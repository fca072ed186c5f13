//! Deterministic core of the living-entity subsystem.
//!
//! This crate holds the pure logic shared by every higher layer: the
//! stat/experience model with time-decaying modifiers, the paralysis-style
//! status-effect data and its per-command gating rules, and the cooperative
//! timeline that schedules expiry callbacks. Nothing here performs I/O,
//! formats text, or logs; orchestration lives in the `runtime` crate.
pub mod common;
pub mod config;
pub mod effect;
pub mod error;
pub mod stat;
pub mod timeline;

pub use common::{EntityId, Tick};
pub use config::CoreConfig;
pub use effect::{Effect, EffectId, EffectSpec, Gate, Message, StopCallback, StopReason};
pub use error::{ConfigError, GrantError};
pub use stat::{ExpCurve, Stat, StatBlock};
pub use timeline::{TaskHandle, TaskKind, Timeline};
