//! Wilcoxon signed-rank distribution.
//!
//! Under the null hypothesis each of the ranks 1..=n carries a positive
//! sign with probability 1/2, so `T⁺` has the distribution of a random
//! subset sum of `{1, …, n}`. Two tables are kept:
//!
//! - cumulative `(n, t) ↦ P(T <= t)`;
//! - critical values `(n, α) ↦` largest `t` with `P(T <= t) <= α`, over
//!   the header [`ALPHA_LEVELS`]. Small `n` leave the strictest levels
//!   undefined.
//!
//! # Reference
//! Wilcoxon (1945), "Individual comparisons by ranking methods",
//! *Biometrics Bulletin* 1(6).

use crate::error::{Error, Result};
use crate::exact::corrected_z;
use crate::pvalue::{PValue, Tail};
use crate::rank::rank;
use crate::table::{Direction, Header, SparseKeyedTable};

/// Significance levels of the critical-value table, ascending.
pub const ALPHA_LEVELS: [f64; 5] = [0.005, 0.01, 0.025, 0.05, 0.10];

/// Largest n whose subset counts fit in a `u64`.
const MAX_COUNTABLE_N: usize = 60;

/// A tabulated critical value and the level it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValue {
    /// Header level actually used, at most the requested one.
    pub alpha: f64,
    /// Largest `t` with `P(T <= t) <= alpha`.
    pub value: f64,
}

/// Signed-rank statistic of a sample of paired differences.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRankStatistic {
    /// Number of non-zero differences.
    pub n: usize,
    /// Rank sum of the positive differences.
    pub t_plus: f64,
    /// Rank sum of the negative differences.
    pub t_minus: f64,
    /// Tie weight of the absolute differences.
    pub tie_weight: f64,
}

impl SignedRankStatistic {
    /// Ranks the absolute values of the non-zero `differences`.
    ///
    /// # Errors
    /// [`Error::Domain`] if every difference is zero or any is NaN.
    pub fn from_differences(differences: &[f64]) -> Result<Self> {
        let nonzero: Vec<f64> = differences.iter().copied().filter(|&d| d != 0.0).collect();
        if nonzero.is_empty() {
            return Err(Error::Domain("no non-zero differences".into()));
        }
        let magnitudes: Vec<f64> = nonzero.iter().map(|d| d.abs()).collect();
        let ranked = rank(&magnitudes)?;
        let mut t_plus = 0.0;
        let mut t_minus = 0.0;
        for (d, r) in nonzero.iter().zip(&ranked.ranks) {
            if *d > 0.0 {
                t_plus += r;
            } else {
                t_minus += r;
            }
        }
        Ok(Self {
            n: nonzero.len(),
            t_plus,
            t_minus,
            tie_weight: ranked.tie_weight,
        })
    }

    /// `min(T⁺, T⁻)`, the statistic referred to the lower tail.
    pub fn t(&self) -> f64 {
        self.t_plus.min(self.t_minus)
    }
}

/// Exact and asymptotic signed-rank probabilities.
#[derive(Debug, Clone)]
pub struct SignedRank {
    max_n: usize,
    cumulative: SparseKeyedTable<2>,
    critical: SparseKeyedTable<2>,
}

impl SignedRank {
    /// Builds both tables for n = 1..=max_n.
    ///
    /// # Errors
    /// [`Error::Domain`] if `max_n` is 0 or above 60.
    pub fn new(max_n: usize) -> Result<Self> {
        if !(1..=MAX_COUNTABLE_N).contains(&max_n) {
            return Err(Error::Domain(format!(
                "signed rank tables need 1 <= n <= {MAX_COUNTABLE_N}, got {max_n}"
            )));
        }
        let max_t = max_n * (max_n + 1) / 2;
        let mut cumulative = SparseKeyedTable::new([1..=max_n, 0..=max_t])?;
        let mut critical =
            SparseKeyedTable::with_header(&[1..=max_n], Header::new(ALPHA_LEVELS.to_vec())?)?;

        // counts[t] = number of subsets of {1..n} summing to t
        let mut counts = vec![0_u64; max_t + 1];
        counts[0] = 1;
        for n in 1..=max_n {
            let top = n * (n + 1) / 2;
            for t in (n..=top).rev() {
                counts[t] += counts[t - n];
            }
            let total = (1_u64 << n) as f64;
            let mut running = 0_u64;
            let mut row = [None; ALPHA_LEVELS.len()];
            for (t, &count) in counts.iter().enumerate().take(top + 1) {
                running += count;
                let p = running as f64 / total;
                cumulative.set([n, t], p)?;
                for (slot, &alpha) in row.iter_mut().zip(&ALPHA_LEVELS) {
                    if p <= alpha {
                        *slot = Some(t as f64);
                    }
                }
            }
            critical.add_row_partial(&[n], &row)?;
        }

        Ok(Self {
            max_n,
            cumulative,
            critical,
        })
    }

    /// Largest tabulated n.
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    fn tabulated(&self, n: usize) -> bool {
        (1..=self.max_n).contains(&n)
    }

    /// Exact `P(T <= t)` for `n` non-zero, untied differences.
    ///
    /// Returns [`PValue::NotTabulated`] outside the table and
    /// [`PValue::Saturated`] once `t` reaches `n(n+1)/2`.
    pub fn exact_probability(&self, n: usize, t: f64) -> PValue {
        if !self.tabulated(n) || t.is_nan() {
            return PValue::NotTabulated;
        }
        if t >= (n * (n + 1) / 2) as f64 {
            return PValue::Saturated;
        }
        if t < 0.0 {
            return PValue::Value(0.0);
        }
        match self.cumulative.get([n, t.floor() as usize]) {
            Ok(Some(p)) => PValue::from_probability(p),
            _ => PValue::NotTabulated,
        }
    }

    /// Normal approximation of `P(T <= t)` with continuity correction and
    /// variance `n(n+1)(2n+1)/24 − tie_weight/48`.
    pub fn asymptotic_probability(&self, n: usize, t: f64, tie_weight: f64) -> PValue {
        if n == 0 {
            return PValue::NotTabulated;
        }
        let nf = n as f64;
        let mean = nf * (nf + 1.0) / 4.0;
        let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_weight / 48.0;
        PValue::from_z(corrected_z(t, mean, variance), Tail::Lower)
    }

    /// Exact probability for untied tabulated samples, asymptotic
    /// otherwise.
    pub fn probability(&self, n: usize, t: f64, tie_weight: f64) -> PValue {
        if tie_weight == 0.0 {
            self.exact_probability(n, t)
                .or_else(|| self.asymptotic_probability(n, t, tie_weight))
        } else {
            self.asymptotic_probability(n, t, tie_weight)
        }
    }

    /// Critical value at level `alpha`.
    ///
    /// Without an exact header match the next smaller level is used, and
    /// undefined cells fall back to progressively smaller levels. `None`
    /// once no level at or below `alpha` has a value.
    pub fn critical_value(&self, n: usize, alpha: f64) -> Option<CriticalValue> {
        if !self.tabulated(n) || alpha.is_nan() {
            return None;
        }
        let start = match self.critical.column_of(alpha) {
            Ok(column) => column,
            Err(_) => ALPHA_LEVELS.iter().rposition(|&a| a < alpha)?,
        };
        let (keys, value) = self
            .critical
            .scan([n, start], 1, Direction::Descending)
            .ok()
            .flatten()?;
        let alpha = self.critical.get_header(keys[1]).ok()?;
        Some(CriticalValue { alpha, value })
    }

    /// Smallest tabulated level at which `t` is significant.
    ///
    /// [`PValue::Saturated`] when `t` exceeds every critical value.
    pub fn significance(&self, n: usize, t: f64) -> PValue {
        if !self.tabulated(n) || t.is_nan() {
            return PValue::NotTabulated;
        }
        for (column, &alpha) in ALPHA_LEVELS.iter().enumerate() {
            if let Ok(Some(critical)) = self.critical.get([n, column]) {
                if critical >= t {
                    return PValue::Value(alpha);
                }
            }
        }
        PValue::Saturated
    }
}
