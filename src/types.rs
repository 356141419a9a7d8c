//! Newtype wrappers and type aliases for domain concepts.
//!
//! A sum type for periods keeps the "no period" sentinel out of floating
//! point infinity land, so RMS comparisons stay total and well-defined.

use std::fmt;

use ordered_float::OrderedFloat;

/// Simulated time in whole ticks.
pub type Tick = u64;

/// Remaining work at or below this threshold counts as complete.
pub const EPSILON: f64 = 1e-4;

/// A task's period, used only as an RMS ordering key.
///
/// The simulator never regenerates periodic job instances; each task record
/// is exactly one job. Variant order is load-bearing: the derived `Ord`
/// sorts every finite period ahead of `Aperiodic`, so aperiodic tasks
/// always lose RMS comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    /// Finite period in ticks.
    Periodic(OrderedFloat<f64>),
    /// No period; always sorts after any finite period.
    Aperiodic,
}

impl Period {
    /// Build a period from a raw descriptor value. Absent, non-positive,
    /// and non-finite values all mean aperiodic.
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            Some(p) if p.is_finite() && p > 0.0 => Period::Periodic(OrderedFloat(p)),
            _ => Period::Aperiodic,
        }
    }

    pub fn is_periodic(self) -> bool {
        matches!(self, Period::Periodic(_))
    }

    /// The finite period value, if any.
    pub fn ticks(self) -> Option<f64> {
        match self {
            Period::Periodic(p) => Some(p.0),
            Period::Aperiodic => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Periodic(p) => write!(f, "{}", p.0),
            Period::Aperiodic => f.write_str("aperiodic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_period_beats_aperiodic() {
        let finite = Period::from_raw(Some(1e12));
        assert!(finite < Period::Aperiodic);
        assert!(Period::Aperiodic == Period::from_raw(None));
    }

    #[test]
    fn test_smaller_period_wins() {
        assert!(Period::from_raw(Some(40.0)) < Period::from_raw(Some(50.0)));
    }

    #[test]
    fn test_degenerate_periods_are_aperiodic() {
        assert_eq!(Period::from_raw(Some(0.0)), Period::Aperiodic);
        assert_eq!(Period::from_raw(Some(-3.0)), Period::Aperiodic);
        assert_eq!(Period::from_raw(Some(f64::NAN)), Period::Aperiodic);
        assert_eq!(Period::from_raw(Some(f64::INFINITY)), Period::Aperiodic);
    }
}
