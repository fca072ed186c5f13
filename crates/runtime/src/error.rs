//! Unified error types surfaced by the runtime API.
use living_core::{ConfigError, EntityId, GrantError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no living entity {0}")]
    UnknownEntity(EntityId),

    #[error("effect stack full on {0}")]
    EffectStackFull(EntityId),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grant(#[from] GrantError),
}
