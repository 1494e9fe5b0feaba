//! Spearman rank-correlation distribution.
//!
//! The statistic is `S = Σ dᵢ²`, the sum of squared rank differences,
//! related to the coefficient by `ρ = 1 − 6S / (n(n² − 1))`. Small `S`
//! means positive association. The exact table `(n, s) ↦ P(S <= s)`
//! enumerates all n! permutations; the asymptotic side refers
//! `ρ·√(n − 1)` to the standard Normal.

use crate::error::{Error, Result};
use crate::exact::{for_each_permutation, SPEARMAN_ENUMERATION_CAP};
use crate::pvalue::{PValue, Tail};
use crate::rank::rank;
use crate::table::SparseKeyedTable;

/// Largest possible `S` for `n` observations.
pub fn max_statistic(n: usize) -> usize {
    n * (n * n).saturating_sub(1) / 3
}

/// `ρ = 1 − 6S / (n(n² − 1))`.
pub fn rho_from_s(n: usize, s: f64) -> f64 {
    let nf = n as f64;
    1.0 - 6.0 * s / (nf * (nf * nf - 1.0))
}

/// Inverse of [`rho_from_s`].
pub fn s_from_rho(n: usize, rho: f64) -> f64 {
    let nf = n as f64;
    (1.0 - rho) * nf * (nf * nf - 1.0) / 6.0
}

/// Spearman statistic of paired observations.
#[derive(Debug, Clone, PartialEq)]
pub struct SpearmanStatistic {
    pub n: usize,
    /// Sum of squared midrank differences.
    pub s: f64,
    /// Coefficient from `s`.
    pub rho: f64,
    /// Tie weight of the first sample.
    pub tie_weight_x: f64,
    /// Tie weight of the second sample.
    pub tie_weight_y: f64,
}

impl SpearmanStatistic {
    /// # Errors
    /// [`Error::Arity`] for samples of different lengths,
    /// [`Error::Domain`] for fewer than two pairs or NaN.
    pub fn from_samples(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::Arity {
                expected: x.len(),
                found: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(Error::Domain("Spearman needs at least two pairs".into()));
        }
        let rx = rank(x)?;
        let ry = rank(y)?;
        let s: f64 = rx
            .ranks
            .iter()
            .zip(&ry.ranks)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(Self {
            n: x.len(),
            s,
            rho: rho_from_s(x.len(), s),
            tie_weight_x: rx.tie_weight,
            tie_weight_y: ry.tie_weight,
        })
    }
}

/// Exact and asymptotic Spearman probabilities.
#[derive(Debug, Clone)]
pub struct Spearman {
    max_n: usize,
    cumulative: SparseKeyedTable<2>,
}

impl Spearman {
    /// Enumerates permutations for n = 2..=max_n.
    ///
    /// # Errors
    /// [`Error::Domain`] if `max_n` is outside `2..=10`.
    pub fn new(max_n: usize) -> Result<Self> {
        if !(2..=SPEARMAN_ENUMERATION_CAP).contains(&max_n) {
            return Err(Error::Domain(format!(
                "Spearman tables need 2 <= n <= {SPEARMAN_ENUMERATION_CAP}, got {max_n}"
            )));
        }
        let mut cumulative = SparseKeyedTable::new([2..=max_n, 0..=max_statistic(max_n)])?;
        for n in 2..=max_n {
            let top = max_statistic(n);
            let mut counts = vec![0_u64; top + 1];
            for_each_permutation(n, |perm| {
                let s: usize = perm
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| i.abs_diff(p).pow(2))
                    .sum();
                counts[s] += 1;
            });
            let total: u64 = counts.iter().sum();
            let mut running = 0_u64;
            for (s, &c) in counts.iter().enumerate() {
                running += c;
                cumulative.set([n, s], running as f64 / total as f64)?;
            }
        }
        Ok(Self { max_n, cumulative })
    }

    /// Largest tabulated n.
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    fn lower(&self, n: usize, s: f64) -> Option<f64> {
        if s < 0.0 {
            Some(0.0)
        } else if s >= max_statistic(n) as f64 {
            Some(1.0)
        } else {
            self.cumulative.get([n, s.floor() as usize]).ok().flatten()
        }
    }

    /// Exact tail probability of `S`.
    ///
    /// `Lower` is `P(S <= s)` (positive association), `Upper` is
    /// `P(S >= s)`.
    pub fn exact_probability(&self, n: usize, s: f64, tail: Tail) -> PValue {
        if !(2..=self.max_n).contains(&n) || s.is_nan() {
            return PValue::NotTabulated;
        }
        let lower = self.lower(n, s);
        let upper = self.lower(n, s.ceil() - 1.0).map(|below| 1.0 - below);
        let p = match tail {
            Tail::Lower => lower,
            Tail::Upper => upper,
            Tail::TwoSided => lower.zip(upper).map(|(l, u)| 2.0 * l.min(u)),
        };
        p.map_or(PValue::NotTabulated, PValue::from_probability)
    }

    /// Normal approximation with `z = −ρ·√(n − 1)` on the `S` scale.
    pub fn asymptotic_probability(&self, n: usize, s: f64, tail: Tail) -> PValue {
        if n < 2 {
            return PValue::NotTabulated;
        }
        let z = -rho_from_s(n, s) * ((n - 1) as f64).sqrt();
        PValue::from_z(z, tail)
    }

    /// Exact when tabulated, asymptotic otherwise.
    pub fn probability(&self, n: usize, s: f64, tail: Tail) -> PValue {
        self.exact_probability(n, s, tail)
            .or_else(|| self.asymptotic_probability(n, s, tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(p: PValue) -> f64 {
        p.probability().unwrap()
    }

    #[test]
    fn test_exact_small_n() {
        let sp = Spearman::new(9).unwrap();
        assert!((value(sp.exact_probability(4, 0.0, Tail::Lower)) - 1.0 / 24.0).abs() < 1e-15);
        assert!((value(sp.exact_probability(4, 2.0, Tail::Lower)) - 4.0 / 24.0).abs() < 1e-15);
        assert!((value(sp.exact_probability(5, 2.0, Tail::Lower)) - 5.0 / 120.0).abs() < 1e-15);
        assert!((value(sp.exact_probability(4, 20.0, Tail::Upper)) - 1.0 / 24.0).abs() < 1e-15);
    }

    #[test]
    fn test_exact_n9() {
        let sp = Spearman::new(9).unwrap();
        let p = value(sp.exact_probability(9, 30.0, Tail::Lower));
        assert!((p - 0.012_745_260_141_093_475).abs() < 1e-15);
        let p = value(sp.exact_probability(9, 40.0, Tail::Lower));
        assert!((p - 0.029_444_995_590_828_926).abs() < 1e-15);
        assert_eq!(sp.exact_probability(9, 240.0, Tail::Lower), PValue::Saturated);
        assert_eq!(sp.exact_probability(10, 40.0, Tail::Lower), PValue::NotTabulated);
    }

    #[test]
    fn test_asymptotic() {
        let sp = Spearman::new(5).unwrap();
        // ρ = 0.75 at n = 9 gives z = 0.75·√8
        let p = value(sp.asymptotic_probability(9, 30.0, Tail::Lower));
        let expected = crate::special::normal_cdf(0.75 * 8.0_f64.sqrt(), true);
        assert!((p - expected).abs() < 1e-12);
        assert_eq!(sp.probability(9, 30.0, Tail::Lower), sp.asymptotic_probability(9, 30.0, Tail::Lower));
        assert_eq!(sp.probability(5, 2.0, Tail::Lower), sp.exact_probability(5, 2.0, Tail::Lower));
    }

    #[test]
    fn test_rho_conversion() {
        assert!((rho_from_s(9, 30.0) - 0.75).abs() < 1e-15);
        assert!((s_from_rho(9, 0.75) - 30.0).abs() < 1e-12);
        assert_eq!(max_statistic(9), 240);
        assert_eq!(max_statistic(4), 20);
    }

    #[test]
    fn test_statistic_from_samples() {
        let stat = SpearmanStatistic::from_samples(&[1.0, 2.0, 3.0, 4.0], &[10.0, 30.0, 20.0, 40.0])
            .unwrap();
        assert_eq!(stat.s, 2.0);
        assert!((stat.rho - 0.8).abs() < 1e-15);
        assert!(SpearmanStatistic::from_samples(&[1.0], &[1.0]).is_err());
        assert!(matches!(
            SpearmanStatistic::from_samples(&[1.0, 2.0], &[1.0]),
            Err(Error::Arity { .. })
        ));
    }

    #[test]
    fn test_invalid_limits() {
        assert!(Spearman::new(1).is_err());
        assert!(Spearman::new(11).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn shared() -> &'static Spearman {
        static TABLE: OnceLock<Spearman> = OnceLock::new();
        TABLE.get_or_init(|| Spearman::new(7).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn distribution_is_symmetric(n in 2_usize..=7, frac in 0.0_f64..1.0) {
            // S and max − S are equally likely
            let max = max_statistic(n);
            let s = ((max as f64) * frac).floor();
            let lower = shared().exact_probability(n, s, Tail::Lower).probability().unwrap();
            let upper = shared()
                .exact_probability(n, max as f64 - s, Tail::Upper)
                .probability()
                .unwrap();
            prop_assert!((lower - upper).abs() < 1e-12);
        }
    }
}
