//! Wald–Wolfowitz runs distribution.
//!
//! For a random arrangement of `n1` items of one kind and `n2` of the
//! other, the number of runs `R` has the closed form
//!
//! ```text
//! P(R = 2k)     = 2·C(n1−1, k−1)·C(n2−1, k−1) / C(N, n1)
//! P(R = 2k + 1) = [C(n1−1, k−1)·C(n2−1, k) + C(n1−1, k)·C(n2−1, k−1)] / C(N, n1)
//! ```
//!
//! The tables `(n1, n2, r) ↦ P(R <= r)` and `(n1, n2, r) ↦ P(R >= r)` are
//! accumulated on exact integers from opposite ends, so each tail keeps
//! full relative precision however small it gets.
//!
//! # Reference
//! Wald & Wolfowitz (1940), "On a test whether two samples are from the
//! same population", *Ann. Math. Statist.* 11(2).

use num::bigint::BigUint;
use num::{One, ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::exact::corrected_z;
use crate::pvalue::{PValue, Tail};
use crate::table::SparseKeyedTable;

/// Largest group size the table accepts.
const MAX_TABLE_SIZE: usize = 100;

/// Runs statistic of a two-valued sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunsStatistic {
    /// Number of `true` labels.
    pub n1: usize,
    /// Number of `false` labels.
    pub n2: usize,
    /// Number of maximal blocks of equal labels.
    pub runs: usize,
}

impl RunsStatistic {
    /// # Errors
    /// [`Error::Domain`] for an empty sequence.
    pub fn from_labels(labels: &[bool]) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::Domain("runs need a non-empty sequence".into()));
        }
        let n1 = labels.iter().filter(|&&b| b).count();
        let runs = 1 + labels.windows(2).filter(|w| w[0] != w[1]).count();
        Ok(Self {
            n1,
            n2: labels.len() - n1,
            runs,
        })
    }

    /// Labels `values` above `threshold` as `true` and below as `false`;
    /// values equal to it are dropped.
    pub fn from_threshold(values: &[f64], threshold: f64) -> Result<Self> {
        let labels: Vec<bool> = values
            .iter()
            .filter(|&&v| v != threshold)
            .map(|&v| v > threshold)
            .collect();
        Self::from_labels(&labels)
    }
}

/// Exact binomial coefficients `C(n, k)` for `n < rows`, built row by
/// row with Pascal's rule.
fn pascal(rows: usize) -> Vec<Vec<BigUint>> {
    let mut triangle: Vec<Vec<BigUint>> = Vec::with_capacity(rows);
    for n in 0..rows {
        let row = match triangle.last() {
            None => vec![BigUint::one()],
            Some(prev) => (0..=n)
                .map(|k| {
                    let left = k.checked_sub(1).and_then(|j| prev.get(j));
                    let right = prev.get(k);
                    match (left, right) {
                        (Some(l), Some(r)) => l + r,
                        (Some(c), None) | (None, Some(c)) => c.clone(),
                        (None, None) => BigUint::zero(),
                    }
                })
                .collect(),
        };
        triangle.push(row);
    }
    triangle
}

fn to_f64(value: &BigUint) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Number of arrangements with exactly `r` runs, given the rows
/// `C(n1 − 1, ·)` and `C(n2 − 1, ·)`.
fn arrangements(a: &[BigUint], b: &[BigUint], r: usize) -> BigUint {
    let choose = |row: &[BigUint], k: Option<usize>| -> BigUint {
        k.and_then(|k| row.get(k)).cloned().unwrap_or_else(BigUint::zero)
    };
    let k = r / 2;
    if r % 2 == 0 {
        choose(a, k.checked_sub(1)) * choose(b, k.checked_sub(1)) * 2_u32
    } else {
        choose(a, k.checked_sub(1)) * choose(b, Some(k))
            + choose(a, Some(k)) * choose(b, k.checked_sub(1))
    }
}

/// Exact and asymptotic runs probabilities.
#[derive(Debug, Clone)]
pub struct Runs {
    max_size: usize,
    lower: SparseKeyedTable<3>,
    upper: SparseKeyedTable<3>,
}

impl Runs {
    /// Builds `P(R <= r)` and `P(R >= r)` for group sizes up to
    /// `max_size`.
    ///
    /// Both tails are accumulated on exact counts, so a tiny tail is not
    /// lost to cancellation against its complement.
    ///
    /// # Errors
    /// [`Error::Domain`] if `max_size` is 0 or above 100.
    pub fn new(max_size: usize) -> Result<Self> {
        if !(1..=MAX_TABLE_SIZE).contains(&max_size) {
            return Err(Error::Domain(format!(
                "runs tables need 1 <= size <= {MAX_TABLE_SIZE}, got {max_size}"
            )));
        }
        let ranges = [1..=max_size, 1..=max_size, 2..=2 * max_size];
        let mut lower = SparseKeyedTable::new(ranges.clone())?;
        let mut upper = SparseKeyedTable::new(ranges)?;
        let rows = pascal(2 * max_size + 1);
        for n1 in 1..=max_size {
            for n2 in 1..=max_size {
                let total = to_f64(&rows[n1 + n2][n1]);
                let counts: Vec<BigUint> = (2..=n1 + n2)
                    .map(|r| arrangements(&rows[n1 - 1], &rows[n2 - 1], r))
                    .collect();
                let mut running = BigUint::zero();
                for (r, count) in (2..).zip(&counts) {
                    running += count;
                    lower.set([n1, n2, r], to_f64(&running) / total)?;
                }
                running = BigUint::zero();
                for (i, count) in counts.iter().enumerate().rev() {
                    running += count;
                    upper.set([n1, n2, i + 2], to_f64(&running) / total)?;
                }
            }
        }
        Ok(Self {
            max_size,
            lower,
            upper,
        })
    }

    /// Largest tabulated group size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn lower(&self, n1: usize, n2: usize, r: usize) -> Option<f64> {
        if r < 2 {
            Some(0.0)
        } else if r >= n1 + n2 {
            Some(1.0)
        } else {
            self.lower.get([n1, n2, r]).ok().flatten()
        }
    }

    fn upper(&self, n1: usize, n2: usize, r: usize) -> Option<f64> {
        if r <= 2 {
            Some(1.0)
        } else if r > n1 + n2 {
            Some(0.0)
        } else {
            self.upper.get([n1, n2, r]).ok().flatten()
        }
    }

    /// Exact tail probability of `r` runs.
    ///
    /// `Lower` is `P(R <= r)`, `Upper` is `P(R >= r)`.
    pub fn exact_probability(&self, n1: usize, n2: usize, r: usize, tail: Tail) -> PValue {
        if n1 == 0 || n2 == 0 || n1 > self.max_size || n2 > self.max_size {
            return PValue::NotTabulated;
        }
        let lower = self.lower(n1, n2, r);
        let upper = self.upper(n1, n2, r);
        let p = match tail {
            Tail::Lower => lower,
            Tail::Upper => upper,
            Tail::TwoSided => lower.zip(upper).map(|(l, u)| 2.0 * l.min(u)),
        };
        p.map_or(PValue::NotTabulated, PValue::from_probability)
    }

    /// Normal approximation with mean `2·n1·n2/N + 1`, variance
    /// `2·n1·n2·(2·n1·n2 − N) / (N²(N − 1))` and continuity correction.
    pub fn asymptotic_probability(&self, n1: usize, n2: usize, r: usize, tail: Tail) -> PValue {
        let (a, b) = (n1 as f64, n2 as f64);
        let total = a + b;
        if total < 2.0 {
            return PValue::NotTabulated;
        }
        let product = 2.0 * a * b;
        let mean = product / total + 1.0;
        let variance = product * (product - total) / (total * total * (total - 1.0));
        PValue::from_z(corrected_z(r as f64, mean, variance), tail)
    }

    /// Exact when tabulated, asymptotic otherwise.
    pub fn probability(&self, n1: usize, n2: usize, r: usize, tail: Tail) -> PValue {
        self.exact_probability(n1, n2, r, tail)
            .or_else(|| self.asymptotic_probability(n1, n2, r, tail))
    }
}
