//! Stat and experience model.
//!
//! Six core attributes carry the entity's total experience; the guild
//! slots behind them hold taxed experience that never counts toward the
//! total. All operations use raw indices with sentinel failure values
//! (-1 / 0) so combat math is never aborted mid-calculation.
mod block;
mod curve;
mod exp;

use strum::{Display, EnumCount, EnumIter, FromRepr};

pub use block::StatBlock;
pub use curve::ExpCurve;

use crate::config::CoreConfig;

/// Every attribute tracked per living entity, core stats first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(usize)]
pub enum Stat {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Discipline,
    Race,
    Occupation,
    Layman,
}

impl Stat {
    /// Position of this attribute in the per-entity arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Core attributes carry the total experience; guild slots do not.
    pub const fn is_core(self) -> bool {
        (self as usize) < CoreConfig::CORE_STATS
    }

    /// Looks up an attribute by raw index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }
}
