//! Orchestration around the living-entity core.
//!
//! This crate wires the deterministic logic of `living-core` into a
//! process-wide service object: [`World`] owns the entities, the
//! cooperative timeline, the hook registry, the stop-callback table, and
//! the injected messaging seam. Consumers (the combat loop and the
//! command dispatcher, both external) drive it through a handful of
//! entry points and the per-command [`World::evaluate_command`] gate.
//!
//! Modules are organized by responsibility:
//! - [`world`] hosts the service object and the timer-driven loop
//! - [`command`] is the per-command effect gate
//! - [`combat`] bridges attacks and kills to effects and hooks
//! - [`hooks`] provides the named, ordered, fire-and-forget registry
//! - [`callback`] resolves the serializable stop-callback references
//! - [`messaging`] is the injected delivery collaborator
//! - [`snapshot`] flattens living entities for save/load
pub mod callback;
pub mod combat;
pub mod command;
pub mod error;
pub mod hooks;
pub mod messaging;
pub mod snapshot;
pub mod world;

pub use callback::{CallbackTable, StopDecision, StopFn};
pub use combat::PursuitLedger;
pub use command::Verdict;
pub use error::{Result, RuntimeError};
pub use hooks::{HookError, HookEvent, HookFn, HookRegistry, names};
pub use messaging::{Messenger, NullMessenger, RecordingMessenger};
pub use snapshot::{EffectSnapshot, LivingSnapshot};
pub use world::{Living, World};
