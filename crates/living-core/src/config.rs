use crate::error::ConfigError;
use crate::stat::ExpCurve;

/// Tunable parameters of the living-entity core.
///
/// The associated constants size the fixed arrays and bounded collections
/// used throughout the workspace; the fields are the knobs a world may
/// adjust at startup. Misconfiguration is fatal at initialization, never
/// at query time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    /// Length of one healing interval in scheduler ticks. Temporary stat
    /// grants are expressed in multiples of this interval.
    pub interval_ticks: u64,
    /// Upper bound on the number of intervals a temporary stat grant may
    /// last; longer requests are clamped, not rejected.
    pub tmp_stat_max_intervals: u32,
    /// Dead-band for experience reconciliation. Drift below this absolute
    /// value is left alone to tolerate truncation in redistribution.
    pub exp_tolerance: i64,
    /// Parameters of the nonlinear exp<->stat conversion curve.
    pub curve: ExpCurve,
    /// Verbs that pass through any status effect untouched.
    pub always_allowed: Vec<String>,
}

impl CoreConfig {
    /// The six primary attributes carrying the total experience.
    pub const CORE_STATS: usize = 6;
    /// Core attributes plus the guild slots (race, occupation, layman).
    pub const TOTAL_STATS: usize = 9;
    /// Bound on simultaneously active effects per entity.
    pub const MAX_EFFECTS: usize = 8;

    /// Checks the invariants that make the rest of the core panic-free.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.curve.validate()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            interval_ticks: 30,
            tmp_stat_max_intervals: 20,
            exp_tolerance: 1000,
            curve: ExpCurve::default(),
            always_allowed: ["quit", "save", "who", "bug", "sysbug", "typo", "praise"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CoreConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_interval_is_fatal() {
        let config = CoreConfig {
            interval_ticks: 0,
            ..CoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn bad_curve_factor_is_fatal() {
        let config = CoreConfig {
            curve: ExpCurve::new(0.0),
            ..CoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidCurveFactor));
    }
}
