//! Tagged p-value result.
//!
//! Exact distributions answer from finite tables. A lookup can produce a
//! probability, find that the parameterization is not tabulated, or find
//! that the statistic lies beyond every tabulated bound so the p-value is
//! indistinguishable from 1. [`PValue`] keeps the three outcomes apart.

use crate::special::normal_cdf;

/// Which tail of a null distribution a p-value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tail {
    /// `P(X <= x)`.
    #[default]
    Lower,
    /// `P(X >= x)`.
    Upper,
    /// `min(1, 2·min(lower, upper))`.
    TwoSided,
}

/// Outcome of a p-value computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PValue {
    /// A probability in `[0, 1)`.
    Value(f64),
    /// No data for this parameterization.
    NotTabulated,
    /// At or above 1: not significant at any tabulated level.
    Saturated,
}

impl PValue {
    /// Wraps a computed probability, mapping values `>= 1` to
    /// [`PValue::Saturated`] and clamping negatives from rounding to 0.
    ///
    /// NaN maps to [`PValue::NotTabulated`].
    ///
    /// # Examples
    /// ```
    /// use u_nonparam::PValue;
    /// assert_eq!(PValue::from_probability(0.03), PValue::Value(0.03));
    /// assert_eq!(PValue::from_probability(1.0), PValue::Saturated);
    /// assert_eq!(PValue::from_probability(-1e-17), PValue::Value(0.0));
    /// ```
    pub fn from_probability(p: f64) -> Self {
        if p.is_nan() {
            PValue::NotTabulated
        } else if p >= 1.0 {
            PValue::Saturated
        } else {
            PValue::Value(p.max(0.0))
        }
    }

    /// The probability, with [`PValue::Saturated`] reported as 1.
    ///
    /// Returns `None` for [`PValue::NotTabulated`].
    pub fn probability(&self) -> Option<f64> {
        match self {
            PValue::Value(p) => Some(*p),
            PValue::Saturated => Some(1.0),
            PValue::NotTabulated => None,
        }
    }

    /// True for [`PValue::Value`] and [`PValue::Saturated`].
    pub fn is_tabulated(&self) -> bool {
        !matches!(self, PValue::NotTabulated)
    }

    /// True when the p-value is a number no greater than `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        matches!(self, PValue::Value(p) if *p <= alpha)
    }

    /// Two-sided p-value from a one-sided one: `min(1, 2p)`.
    pub fn doubled(self) -> Self {
        match self {
            PValue::Value(p) => PValue::from_probability(2.0 * p),
            other => other,
        }
    }

    /// Normal-approximation p-value of a standardized statistic `z`.
    ///
    /// # Examples
    /// ```
    /// use u_nonparam::pvalue::{PValue, Tail};
    /// let p = PValue::from_z(-1.959964, Tail::TwoSided);
    /// assert!((p.probability().unwrap() - 0.05).abs() < 1e-6);
    /// ```
    pub fn from_z(z: f64, tail: Tail) -> Self {
        if z.is_nan() {
            return PValue::NotTabulated;
        }
        let p = match tail {
            Tail::Lower => normal_cdf(z, false),
            Tail::Upper => normal_cdf(z, true),
            Tail::TwoSided => 2.0 * normal_cdf(z.abs(), true),
        };
        PValue::from_probability(p)
    }

    /// Returns `self` unless it is [`PValue::NotTabulated`], in which case
    /// `fallback` is evaluated.
    pub fn or_else(self, fallback: impl FnOnce() -> PValue) -> Self {
        match self {
            PValue::NotTabulated => fallback(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_probability() {
        assert_eq!(PValue::from_probability(0.5), PValue::Value(0.5));
        assert_eq!(PValue::from_probability(1.2), PValue::Saturated);
        assert_eq!(PValue::from_probability(f64::NAN), PValue::NotTabulated);
    }

    #[test]
    fn test_probability_accessor() {
        assert_eq!(PValue::Value(0.2).probability(), Some(0.2));
        assert_eq!(PValue::Saturated.probability(), Some(1.0));
        assert_eq!(PValue::NotTabulated.probability(), None);
    }

    #[test]
    fn test_significance() {
        assert!(PValue::Value(0.01).is_significant(0.05));
        assert!(!PValue::Value(0.06).is_significant(0.05));
        assert!(!PValue::Saturated.is_significant(0.05));
        assert!(!PValue::NotTabulated.is_significant(0.05));
    }

    #[test]
    fn test_doubled() {
        assert_eq!(PValue::Value(0.02).doubled(), PValue::Value(0.04));
        assert_eq!(PValue::Value(0.6).doubled(), PValue::Saturated);
        assert_eq!(PValue::NotTabulated.doubled(), PValue::NotTabulated);
    }

    #[test]
    fn test_from_z_tails() {
        let lower = PValue::from_z(-1.0, Tail::Lower).probability().unwrap();
        let upper = PValue::from_z(1.0, Tail::Upper).probability().unwrap();
        assert!((lower - upper).abs() < 1e-12);
        assert!((lower - 0.158_655_253_931_457).abs() < 1e-9);
        let two = PValue::from_z(1.0, Tail::TwoSided).probability().unwrap();
        assert!((two - 2.0 * upper).abs() < 1e-12);
        assert_eq!(PValue::from_z(0.0, Tail::TwoSided), PValue::Saturated);
        assert_eq!(PValue::from_z(f64::NAN, Tail::Lower), PValue::NotTabulated);
    }

    #[test]
    fn test_or_else() {
        let p = PValue::NotTabulated.or_else(|| PValue::Value(0.3));
        assert_eq!(p, PValue::Value(0.3));
        let q = PValue::Saturated.or_else(|| PValue::Value(0.3));
        assert_eq!(q, PValue::Saturated);
    }
}
