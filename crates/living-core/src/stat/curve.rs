use crate::error::ConfigError;

/// Parameters of the nonlinear exp<->stat conversion.
///
/// The forward direction is `stat = floor(factor * cbrt(exp))`, a
/// monotonic power curve. The reverse direction yields the smallest
/// experience whose forward image reaches the requested stat, so a value
/// pushed through `stat_to_exp` and back never loses levels:
/// `exp_to_stat(stat_to_exp(s)) >= s` for every valid `s`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpCurve {
    factor: f64,
}

impl ExpCurve {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.factor.is_finite() && self.factor > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidCurveFactor)
        }
    }

    /// Translates accumulated experience into a stat value.
    pub fn exp_to_stat(&self, exp: i64) -> i32 {
        if exp <= 0 {
            return 0;
        }
        (self.factor * (exp as f64).cbrt()).floor() as i32
    }

    /// Minimum experience required to reach `stat`.
    pub fn stat_to_exp(&self, stat: i32) -> i64 {
        if stat <= 0 {
            return 0;
        }

        // Analytic inverse, then correct for float truncation on either
        // side so the round-trip invariant holds for every stat value.
        let mut exp = (f64::from(stat) / self.factor).powi(3).ceil() as i64;
        exp = exp.max(1);
        while self.exp_to_stat(exp) < stat {
            exp += 1;
        }
        while exp > 1 && self.exp_to_stat(exp - 1) >= stat {
            exp -= 1;
        }
        exp
    }
}

impl Default for ExpCurve {
    fn default() -> Self {
        // A stat of 100 costs roughly 77k experience points.
        Self { factor: 2.35 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_direction_is_monotonic() {
        let curve = ExpCurve::default();
        let mut last = curve.exp_to_stat(0);
        for exp in (0..2_000_000).step_by(997) {
            let stat = curve.exp_to_stat(exp);
            assert!(stat >= last, "curve decreased at exp {exp}");
            last = stat;
        }
    }

    #[test]
    fn round_trip_never_loses_levels() {
        for factor in [0.5, 1.0, 2.35, 7.5] {
            let curve = ExpCurve::new(factor);
            for stat in 1..=200 {
                let exp = curve.stat_to_exp(stat);
                assert!(
                    curve.exp_to_stat(exp) >= stat,
                    "lost levels at stat {stat} with factor {factor}"
                );
            }
        }
    }

    #[test]
    fn stat_to_exp_is_minimal() {
        let curve = ExpCurve::default();
        for stat in 2..=150 {
            let exp = curve.stat_to_exp(stat);
            assert!(
                curve.exp_to_stat(exp - 1) < stat,
                "exp for stat {stat} is not minimal"
            );
        }
    }

    #[test]
    fn non_positive_inputs_map_to_zero() {
        let curve = ExpCurve::default();
        assert_eq!(curve.exp_to_stat(0), 0);
        assert_eq!(curve.exp_to_stat(-5), 0);
        assert_eq!(curve.stat_to_exp(0), 0);
        assert_eq!(curve.stat_to_exp(-2), 0);
    }
}
