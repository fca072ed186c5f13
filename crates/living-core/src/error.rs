use thiserror::Error;

/// Configuration mistakes caught once at world initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("exp curve factor must be positive and finite")]
    InvalidCurveFactor,

    #[error("interval length must be at least one tick")]
    ZeroInterval,
}

/// Rejection reasons for a temporary stat grant.
///
/// Grants are validated, never panicking: invalid stat indices on the
/// query paths return sentinel values instead of raising these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GrantError {
    #[error("stat index out of range")]
    InvalidStat,

    #[error("temporary bonus would exceed the stacking ceiling")]
    CeilingExceeded,

    #[error("grant duration must be positive")]
    NonPositiveDuration,
}
