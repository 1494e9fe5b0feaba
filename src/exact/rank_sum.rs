//! Wilcoxon rank-sum / Mann–Whitney U distribution.
//!
//! `U` counts the pairs `(xᵢ, yⱼ)` with `xᵢ > yⱼ`. Its null distribution
//! for sample sizes `(m, n)` follows from the recurrence on the position
//! of the largest observation:
//!
//! ```text
//! c(m, n, u) = c(m − 1, n, u − n) + c(m, n − 1, u)
//! ```
//!
//! with `c(0, n, 0) = c(m, 0, 0) = 1`. The table stores `P(U <= u)` for
//! `m <= n`; lookups with `m > n` swap the sizes, the distribution being
//! symmetric in them.
//!
//! # Reference
//! Mann & Whitney (1947), "On a test of whether one of two random
//! variables is stochastically larger than the other", *Ann. Math.
//! Statist.* 18(1).

use crate::error::{Error, Result};
use crate::exact::corrected_z;
use crate::pvalue::{PValue, Tail};
use crate::rank::rank;
use crate::table::SparseKeyedTable;

/// Largest sample size the table accepts.
const MAX_TABLE_SIZE: usize = 30;

/// Rank-sum statistic of two independent samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RankSumStatistic {
    /// Size of the first sample.
    pub m: usize,
    /// Size of the second sample.
    pub n: usize,
    /// Rank sum of the first sample in the pooled ranking.
    pub w: f64,
    /// `W − m(m+1)/2`.
    pub u: f64,
    /// Tie weight of the pooled sample.
    pub tie_weight: f64,
}

impl RankSumStatistic {
    /// Ranks the pooled samples and sums the ranks of `x`.
    ///
    /// # Errors
    /// [`Error::Domain`] if either sample is empty or contains NaN.
    pub fn from_samples(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(Error::Domain("rank sum needs two non-empty samples".into()));
        }
        let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
        let ranked = rank(&pooled)?;
        let m = x.len();
        let w = ranked.rank_sum(0..m)?;
        let mf = m as f64;
        Ok(Self {
            m,
            n: y.len(),
            w,
            u: w - mf * (mf + 1.0) / 2.0,
            tie_weight: ranked.tie_weight,
        })
    }

    /// `min(U, mn − U)`, the statistic referred to the lower tail.
    pub fn u_min(&self) -> f64 {
        self.u.min((self.m * self.n) as f64 - self.u)
    }
}

/// Exact and asymptotic rank-sum probabilities.
#[derive(Debug, Clone)]
pub struct RankSum {
    max_size: usize,
    cumulative: SparseKeyedTable<3>,
}

impl RankSum {
    /// Builds `P(U <= u)` for all `1 <= m <= n <= max_size`.
    ///
    /// # Errors
    /// [`Error::Domain`] if `max_size` is 0 or above 30.
    pub fn new(max_size: usize) -> Result<Self> {
        if !(1..=MAX_TABLE_SIZE).contains(&max_size) {
            return Err(Error::Domain(format!(
                "rank sum tables need 1 <= size <= {MAX_TABLE_SIZE}, got {max_size}"
            )));
        }
        let mut cumulative = SparseKeyedTable::new([
            1..=max_size,
            1..=max_size,
            0..=max_size * max_size,
        ])?;

        // previous[n] holds the counts for (m − 1, n)
        let mut previous: Vec<Vec<u128>> = vec![vec![1]; max_size + 1];
        for m in 1..=max_size {
            let mut current: Vec<Vec<u128>> = Vec::with_capacity(max_size + 1);
            current.push(vec![1]);
            for n in 1..=max_size {
                let mut counts = vec![0_u128; m * n + 1];
                for (u, &c) in current[n - 1].iter().enumerate() {
                    counts[u] += c;
                }
                for (u, &c) in previous[n].iter().enumerate() {
                    counts[u + n] += c;
                }
                if m <= n {
                    let total: u128 = counts.iter().sum();
                    let mut running = 0_u128;
                    for (u, &c) in counts.iter().enumerate() {
                        running += c;
                        cumulative.set([m, n, u], running as f64 / total as f64)?;
                    }
                }
                current.push(counts);
            }
            previous = current;
        }

        Ok(Self {
            max_size,
            cumulative,
        })
    }

    /// Largest tabulated sample size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Exact `P(U <= u)` for samples of sizes `m` and `n` without ties.
    pub fn exact_probability(&self, m: usize, n: usize, u: f64) -> PValue {
        let (small, large) = if m <= n { (m, n) } else { (n, m) };
        if small == 0 || large > self.max_size || u.is_nan() {
            return PValue::NotTabulated;
        }
        if u >= (m * n) as f64 {
            return PValue::Saturated;
        }
        if u < 0.0 {
            return PValue::Value(0.0);
        }
        match self.cumulative.get([small, large, u.floor() as usize]) {
            Ok(Some(p)) => PValue::from_probability(p),
            _ => PValue::NotTabulated,
        }
    }

    /// Normal approximation of `P(U <= u)`: mean `mn/2`, variance
    /// `mn/12 · (N + 1 − tie_weight/(N(N − 1)))`, continuity correction
    /// 0.5.
    pub fn asymptotic_probability(&self, m: usize, n: usize, u: f64, tie_weight: f64) -> PValue {
        if m == 0 || n == 0 {
            return PValue::NotTabulated;
        }
        let (mf, nf) = (m as f64, n as f64);
        let total = mf + nf;
        let mean = mf * nf / 2.0;
        let ties = if total > 1.0 {
            tie_weight / (total * (total - 1.0))
        } else {
            0.0
        };
        let variance = mf * nf / 12.0 * (total + 1.0 - ties);
        PValue::from_z(corrected_z(u, mean, variance), Tail::Lower)
    }

    /// Exact probability for untied tabulated samples, asymptotic
    /// otherwise.
    pub fn probability(&self, m: usize, n: usize, u: f64, tie_weight: f64) -> PValue {
        if tie_weight == 0.0 {
            self.exact_probability(m, n, u)
                .or_else(|| self.asymptotic_probability(m, n, u, tie_weight))
        } else {
            self.asymptotic_probability(m, n, u, tie_weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> RankSum {
        RankSum::new(20).unwrap()
    }

    #[test]
    fn test_exact_known_values() {
        let r = adapter();
        assert_eq!(r.exact_probability(3, 3, 0.0), PValue::Value(0.05));
        let cases = [
            (4, 5, 1.0, 0.015_873_015_873_015_872),
            (10, 10, 23.0, 0.021_628_526_272_489_12),
            (10, 10, 27.0, 0.044_604_776_028_924_63),
            (5, 8, 6.0, 0.022_533_022_533_022_532),
            (20, 20, 138.0, 0.048_249_776_218_050_15),
        ];
        for (m, n, u, expected) in cases {
            let p = r.exact_probability(m, n, u).probability().unwrap();
            assert!((p - expected).abs() < 1e-14, "({m},{n},{u}): {p}");
        }
    }

    #[test]
    fn test_size_order_irrelevant() {
        let r = adapter();
        assert_eq!(r.exact_probability(5, 4, 1.0), r.exact_probability(4, 5, 1.0));
        assert_eq!(r.exact_probability(8, 5, 6.0), r.exact_probability(5, 8, 6.0));
    }

    #[test]
    fn test_boundaries() {
        let r = adapter();
        assert_eq!(r.exact_probability(3, 4, 12.0), PValue::Saturated);
        assert_eq!(r.exact_probability(3, 4, -0.5), PValue::Value(0.0));
        assert_eq!(r.exact_probability(3, 21, 2.0), PValue::NotTabulated);
        assert_eq!(r.exact_probability(0, 4, 0.0), PValue::NotTabulated);
    }

    #[test]
    fn test_asymptotic() {
        let r = adapter();
        let p = r.asymptotic_probability(10, 10, 23.0, 0.0).probability().unwrap();
        assert!((p - 0.022_577_284_812_139_525).abs() < 1e-9);
        let p = r.asymptotic_probability(20, 20, 138.0, 0.0).probability().unwrap();
        assert!((p - 0.048_098_148_124_597_85).abs() < 1e-9);
        let tied = r.asymptotic_probability(10, 10, 23.0, 60.0).probability().unwrap();
        assert!(tied < 0.022_577_284_812_139_525);
    }

    #[test]
    fn test_probability_dispatch() {
        let r = RankSum::new(8).unwrap();
        assert_eq!(r.probability(4, 5, 1.0, 0.0), r.exact_probability(4, 5, 1.0));
        assert_eq!(
            r.probability(4, 12, 10.0, 0.0),
            r.asymptotic_probability(4, 12, 10.0, 0.0)
        );
        assert_eq!(
            r.probability(4, 5, 1.0, 6.0),
            r.asymptotic_probability(4, 5, 1.0, 6.0)
        );
    }

    #[test]
    fn test_statistic_from_samples() {
        let stat =
            RankSumStatistic::from_samples(&[1.2, 3.4, 0.5], &[2.0, 5.0, 4.1, 0.9]).unwrap();
        assert_eq!(stat.w, 9.0);
        assert_eq!(stat.u, 3.0);
        assert_eq!(stat.u_min(), 3.0);
        assert_eq!(stat.tie_weight, 0.0);
        assert!(RankSumStatistic::from_samples(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_invalid_limits() {
        assert!(RankSum::new(0).is_err());
        assert!(RankSum::new(31).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn shared() -> &'static RankSum {
        static TABLE: OnceLock<RankSum> = OnceLock::new();
        TABLE.get_or_init(|| RankSum::new(12).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn lower_tail_is_symmetric(m in 1_usize..=12, n in 1_usize..=12, frac in 0.0_f64..1.0) {
            let max = m * n;
            let u = ((max as f64) * frac) as usize;
            prop_assume!(u < max);
            let lower = shared().exact_probability(m, n, u as f64).probability().unwrap();
            let mirror = shared()
                .exact_probability(m, n, (max - u - 1) as f64)
                .probability()
                .unwrap();
            prop_assert!((lower + mirror - 1.0).abs() < 1e-12);
        }
    }
}
