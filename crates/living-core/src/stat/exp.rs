use super::{ExpCurve, StatBlock};
use crate::config::CoreConfig;

/// Experience bookkeeping on top of [`StatBlock`].
///
/// The authoritative total-experience counter lives here alongside the
/// per-attribute accumulators; the two are reconciled, not kept exact,
/// to tolerate truncation in redistribution.
impl StatBlock {
    /// Authoritative total experience across the core attributes.
    pub fn total_exp(&self) -> i64 {
        self.total_exp
    }

    /// Accumulated experience for one attribute, -1 on a bad index.
    pub fn acc_exp(&self, stat: usize) -> i64 {
        if stat >= CoreConfig::TOTAL_STATS {
            return -1;
        }
        self.acc_exp[stat]
    }

    /// Overwrites every base stat from its accumulated experience.
    pub fn recalculate_base(&mut self, curve: &ExpCurve) {
        for stat in 0..CoreConfig::TOTAL_STATS {
            self.base[stat] = curve.exp_to_stat(self.acc_exp[stat]);
        }
    }

    /// Refreshes a single base stat from its accumulated experience.
    /// Used by guilds that want their slot to behave like the core ones.
    pub fn recalculate_stat(&mut self, stat: usize, curve: &ExpCurve) {
        if stat < CoreConfig::TOTAL_STATS {
            self.base[stat] = curve.exp_to_stat(self.acc_exp[stat]);
        }
    }

    /// Seeds the experience accumulators from the current base stats,
    /// counting only the core attributes into the total. Used once at
    /// character setup.
    pub fn init_exp_from_base(&mut self, curve: &ExpCurve) {
        let mut sum = 0;
        for stat in 0..CoreConfig::TOTAL_STATS {
            let exp = curve.stat_to_exp(self.base[stat]);
            if exp > 0 {
                self.acc_exp[stat] = exp;
                if stat < CoreConfig::CORE_STATS {
                    sum += exp;
                }
            } else {
                self.acc_exp[stat] = 0;
            }
        }
        self.total_exp = sum;
    }

    /// Spreads an experience change over the attribute accumulators and
    /// recomputes the base stats.
    ///
    /// A gain is split by learn preference: guild slots always receive
    /// their preference as a percentage tax, core slots divide the gain
    /// by 100 or, when `tax_free`, by the sum of the core preferences so
    /// the full amount lands in the core attributes. A loss scales every
    /// core accumulator by the same proportional factor and leaves guild
    /// slots untouched.
    pub fn distribute_exp(&mut self, delta: i64, tax_free: bool, curve: &ExpCurve) {
        self.total_exp += delta;

        if delta < 0 {
            // Reduce core stats relative to their weight in the total.
            // The new total is already in place, so dividing by
            // `total - delta` divides by the old total.
            let old_total = self.total_exp - delta;
            if old_total > 0 {
                let factor = 1.0 + (delta as f64) / (old_total as f64);
                for stat in 0..CoreConfig::CORE_STATS {
                    self.acc_exp[stat] = (factor * self.acc_exp[stat] as f64) as i64;
                }
            }
            self.recalculate_base(curve);
            return;
        }

        // Guild slots receive their preference as a straight tax.
        for stat in CoreConfig::CORE_STATS..CoreConfig::TOTAL_STATS {
            self.acc_exp[stat] += i64::from(self.learn_pref[stat]) * delta / 100;
        }

        // For tax-free experience we split over the total core
        // preferences instead of 100, so the core attributes together
        // receive the whole delta.
        let divisor = if tax_free {
            i64::from(self.core_pref_total()).max(1)
        } else {
            100
        };
        for stat in 0..CoreConfig::CORE_STATS {
            self.acc_exp[stat] += i64::from(self.learn_pref[stat]) * delta / divisor;
        }

        self.recalculate_base(curve);
    }

    /// Login-time consistency check: if the total experience counter and
    /// the core accumulators have drifted apart beyond `tolerance`, the
    /// signed difference is redistributed. Returns the correction that
    /// was applied, 0 inside the dead-band.
    pub fn reconcile_exp(&mut self, curve: &ExpCurve, tolerance: i64) -> i64 {
        let attributed: i64 = self.acc_exp[..CoreConfig::CORE_STATS].iter().sum();
        let drift = self.total_exp - attributed;
        if drift.abs() < tolerance {
            return 0;
        }

        // Redistribution corrects the accumulators; the authoritative
        // total must come out unchanged.
        self.total_exp -= drift;
        self.distribute_exp(drift, false, curve);
        drift
    }

    /// Sets a guild slot to an absolute experience value and refreshes
    /// its stat. Core attributes and non-positive values are refused.
    pub fn set_guild_exp(&mut self, stat: usize, exp: i64, curve: &ExpCurve) -> bool {
        if stat < CoreConfig::CORE_STATS || stat >= CoreConfig::TOTAL_STATS || exp < 1 {
            return false;
        }
        self.acc_exp[stat] = exp;
        self.base[stat] = curve.exp_to_stat(exp);
        true
    }

    /// Clears a guild slot when the entity leaves the guild. A front for
    /// [`StatBlock::set_guild_exp`] with the minimum value.
    pub fn clear_guild_exp(&mut self, stat: usize, curve: &ExpCurve) -> bool {
        self.set_guild_exp(stat, 1, curve)
    }

    /// Cost in experience points to raise a stat between two levels.
    pub fn skill_cost(curve: &ExpCurve, old: i32, new: i32) -> i64 {
        curve.stat_to_exp(new) - curve.stat_to_exp(old)
    }
}
