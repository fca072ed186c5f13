use rand::Rng;

use crate::config::CoreConfig;
use crate::error::GrantError;

/// Per-entity attribute state: base values, time-bounded temporary
/// deltas, caller-controlled persistent extras, accumulated experience
/// and learn preferences.
///
/// The effective value of an attribute is `base + tmp + extra`, floored
/// at 1. Temporary deltas are a running sum; every grant schedules its
/// own expiry which subtracts exactly what it added.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    pub(crate) base: [i32; CoreConfig::TOTAL_STATS],
    pub(crate) tmp_delta: [i32; CoreConfig::TOTAL_STATS],
    pub(crate) extra: [i32; CoreConfig::TOTAL_STATS],
    pub(crate) acc_exp: [i64; CoreConfig::TOTAL_STATS],
    pub(crate) learn_pref: [i32; CoreConfig::TOTAL_STATS],
    pub(crate) total_exp: i64,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_range(stat: usize) -> bool {
        stat < CoreConfig::TOTAL_STATS
    }

    /// Sets the base value of a stat, optionally applying a symmetric
    /// random jitter of up to `deviation` percent (clamped to 50).
    ///
    /// Returns the value actually stored, or 0 if the index is out of
    /// range or the value below 1.
    pub fn set_base_stat<R: Rng>(
        &mut self,
        stat: usize,
        value: i32,
        deviation: i32,
        rng: &mut R,
    ) -> i32 {
        if !Self::in_range(stat) || value < 1 {
            return 0;
        }

        let mut value = value;
        if deviation > 0 {
            // For value = 60, deviation = 10%, this does 60 - 6 + random(13).
            let deviation = deviation.min(50);
            let offset = (value * deviation) / 50;
            value += rng.gen_range(0..=offset) - offset / 2;
        }

        self.base[stat] = value;
        value
    }

    /// Base value of a stat, -1 on a bad index.
    pub fn base_stat(&self, stat: usize) -> i32 {
        if !Self::in_range(stat) {
            return -1;
        }
        self.base[stat]
    }

    /// Compound value of a stat: base plus temporary and persistent
    /// modifiers, never less than 1. Returns -1 on a bad index.
    pub fn effective(&self, stat: usize) -> i32 {
        if !Self::in_range(stat) {
            return -1;
        }

        let value = self.base[stat] + self.tmp_delta[stat] + self.extra[stat];
        if value > 0 { value } else { 1 }
    }

    /// Average over the six core base stats.
    pub fn average(&self) -> i32 {
        let sum: i32 = self.base[..CoreConfig::CORE_STATS].iter().sum();
        sum / CoreConfig::CORE_STATS as i32
    }

    /// Sets the persistent extra modifier (equipment effects and the
    /// like; no automatic expiry). Returns the stored value, 0 on a bad
    /// index.
    pub fn set_extra(&mut self, stat: usize, value: i32) -> i32 {
        if !Self::in_range(stat) {
            return 0;
        }
        self.extra[stat] = value;
        value
    }

    /// Current persistent extra modifier, 0 on a bad index.
    pub fn extra(&self, stat: usize) -> i32 {
        if !Self::in_range(stat) {
            return 0;
        }
        self.extra[stat]
    }

    /// Portion of the effective value contributed by modifiers. This is
    /// the quantity the anti-stacking ceiling is checked against.
    pub fn tmp_bonus(&self, stat: usize) -> i32 {
        self.effective(stat) - self.base_stat(stat)
    }

    /// Validates a temporary grant without applying it.
    ///
    /// Rejects grants that would push the modifier bonus above
    /// `10 + base / 10` and grants with no duration.
    pub fn check_tmp_grant(&self, stat: usize, ds: i32, dt: i32) -> Result<(), GrantError> {
        if !Self::in_range(stat) {
            return Err(GrantError::InvalidStat);
        }
        if dt <= 0 {
            return Err(GrantError::NonPositiveDuration);
        }
        if ds + self.tmp_bonus(stat) > 10 + self.base_stat(stat) / 10 {
            return Err(GrantError::CeilingExceeded);
        }
        Ok(())
    }

    /// Adds to the running temporary delta. The caller is responsible
    /// for scheduling the matching expiry.
    pub fn apply_tmp(&mut self, stat: usize, ds: i32) {
        if Self::in_range(stat) {
            self.tmp_delta[stat] += ds;
        }
    }

    /// Expiry counterpart of [`StatBlock::apply_tmp`].
    pub fn expire_tmp(&mut self, stat: usize, ds: i32) {
        if Self::in_range(stat) {
            self.tmp_delta[stat] -= ds;
        }
    }

    /// Drops every temporary delta at once. Used when the matching
    /// expiry timers no longer exist, e.g. after restoring a saved
    /// entity.
    pub fn clear_tmp(&mut self) {
        self.tmp_delta = [0; CoreConfig::TOTAL_STATS];
    }

    /// Learn preference weight for a stat, 0 on a bad index.
    pub fn learn_pref(&self, stat: usize) -> i32 {
        if !Self::in_range(stat) {
            return 0;
        }
        self.learn_pref[stat]
    }

    /// Sets the learn preference weight (floored at 0).
    pub fn set_learn_pref(&mut self, stat: usize, pref: i32) {
        if Self::in_range(stat) {
            self.learn_pref[stat] = pref.max(0);
        }
    }

    /// Sum of the core learn preferences, the tax-free divisor.
    pub fn core_pref_total(&self) -> i32 {
        self.learn_pref[..CoreConfig::CORE_STATS].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn bad_indices_return_sentinels() {
        let mut block = StatBlock::new();
        assert_eq!(block.base_stat(CoreConfig::TOTAL_STATS), -1);
        assert_eq!(block.effective(CoreConfig::TOTAL_STATS), -1);
        assert_eq!(block.extra(CoreConfig::TOTAL_STATS), 0);
        assert_eq!(block.set_extra(CoreConfig::TOTAL_STATS, 5), 0);
        assert_eq!(block.set_base_stat(CoreConfig::TOTAL_STATS, 10, 0, &mut rng()), 0);
        assert_eq!(block.set_base_stat(0, 0, 0, &mut rng()), 0);
    }

    #[test]
    fn effective_never_drops_below_one() {
        let mut block = StatBlock::new();
        block.set_base_stat(0, 10, 0, &mut rng());
        block.apply_tmp(0, -50);
        block.set_extra(0, -50);
        assert_eq!(block.effective(0), 1);
    }

    #[test]
    fn effective_combines_all_layers() {
        let mut block = StatBlock::new();
        block.set_base_stat(2, 20, 0, &mut rng());
        block.apply_tmp(2, 3);
        block.set_extra(2, 2);
        assert_eq!(block.effective(2), 25);
        block.expire_tmp(2, 3);
        assert_eq!(block.effective(2), 22);
    }

    #[test]
    fn jitter_stays_in_range_with_mean_near_value() {
        let mut rng = rng();
        let mut block = StatBlock::new();
        let mut sum: i64 = 0;
        for _ in 0..10_000 {
            let value = block.set_base_stat(0, 100, 10, &mut rng);
            assert!((90..=110).contains(&value), "value {value} out of range");
            sum += i64::from(value);
        }
        let mean = sum as f64 / 10_000.0;
        assert!((mean - 100.0).abs() < 1.0, "mean {mean} drifted");
    }

    #[test]
    fn deviation_is_clamped_to_fifty_percent() {
        let mut rng = rng();
        let mut block = StatBlock::new();
        for _ in 0..1_000 {
            let value = block.set_base_stat(0, 100, 200, &mut rng);
            // offset = 100 * 50 / 50 = 100, so value in 100 - 50 ..= 100 + 50
            assert!((50..=150).contains(&value), "value {value} out of range");
        }
    }

    #[test]
    fn grant_ceiling_tracks_base() {
        let mut block = StatBlock::new();
        block.set_base_stat(1, 100, 0, &mut rng());
        // ceiling is 10 + 100 / 10 = 20
        assert_eq!(block.check_tmp_grant(1, 20, 5), Ok(()));
        assert_eq!(
            block.check_tmp_grant(1, 21, 5),
            Err(GrantError::CeilingExceeded)
        );

        block.apply_tmp(1, 15);
        assert_eq!(
            block.check_tmp_grant(1, 6, 5),
            Err(GrantError::CeilingExceeded)
        );
        assert_eq!(block.check_tmp_grant(1, 5, 5), Ok(()));
    }

    #[test]
    fn extras_count_against_the_ceiling() {
        let mut block = StatBlock::new();
        block.set_base_stat(3, 50, 0, &mut rng());
        block.set_extra(3, 12);
        // bonus is already 12 of the 10 + 5 ceiling
        assert_eq!(
            block.check_tmp_grant(3, 4, 5),
            Err(GrantError::CeilingExceeded)
        );
        assert_eq!(block.check_tmp_grant(3, 3, 5), Ok(()));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let mut block = StatBlock::new();
        block.set_base_stat(0, 10, 0, &mut rng());
        assert_eq!(
            block.check_tmp_grant(0, 1, 0),
            Err(GrantError::NonPositiveDuration)
        );
        assert_eq!(
            block.check_tmp_grant(0, 1, -3),
            Err(GrantError::NonPositiveDuration)
        );
    }

    #[test]
    fn average_covers_core_stats_only() {
        let mut block = StatBlock::new();
        let mut rng = rng();
        for stat in 0..CoreConfig::CORE_STATS {
            block.set_base_stat(stat, 12, 0, &mut rng);
        }
        block.set_base_stat(CoreConfig::CORE_STATS, 90, 0, &mut rng);
        assert_eq!(block.average(), 12);
    }
}
