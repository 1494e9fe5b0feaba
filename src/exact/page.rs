//! Page's test for ordered alternatives.
//!
//! With `k` treatments ranked within each of `n` blocks, `L = Σ j·Rⱼ`
//! where `Rⱼ` is the rank sum of the treatment hypothesized to be j-th.
//! Blocks are independent and each contributes `Σ j·πⱼ` for a uniformly
//! random permutation `π`, so the null distribution of `L` is the n-fold
//! convolution of the single-block distribution. The table stores the
//! upper tail `(k, n, l) ↦ P(L >= l)`.
//!
//! # Reference
//! Page (1963), "Ordered hypotheses for multiple treatments: a
//! significance test for linear ranks", *JASA* 58(301).

use crate::error::{Error, Result};
use crate::exact::{for_each_permutation, PAGE_BLOCK_CAP, PAGE_ENUMERATION_CAP};
use crate::pvalue::{PValue, Tail};
use crate::rank::rank;
use crate::table::SparseKeyedTable;

/// Smallest per-block contribution, `Σ j(k + 1 − j)`.
fn block_min(k: usize) -> usize {
    (1..=k).map(|j| j * (k + 1 - j)).sum()
}

/// Largest per-block contribution, `Σ j²`.
fn block_max(k: usize) -> usize {
    k * (k + 1) * (2 * k + 1) / 6
}

/// Page statistic of a blocked design.
#[derive(Debug, Clone, PartialEq)]
pub struct PageStatistic {
    /// Treatments per block.
    pub k: usize,
    /// Number of blocks.
    pub n: usize,
    /// `L = Σ j·Rⱼ`.
    pub l: f64,
}

impl PageStatistic {
    /// Ranks each block and weights the treatment rank sums by their
    /// hypothesized order (column order in each block).
    ///
    /// # Errors
    /// [`Error::Domain`] for no blocks or fewer than two treatments;
    /// [`Error::Arity`] if blocks differ in length.
    pub fn from_blocks(blocks: &[Vec<f64>]) -> Result<Self> {
        let k = blocks.first().map_or(0, Vec::len);
        if k < 2 {
            return Err(Error::Domain("Page needs blocks of at least two treatments".into()));
        }
        let mut rank_sums = vec![0.0; k];
        for block in blocks {
            if block.len() != k {
                return Err(Error::Arity {
                    expected: k,
                    found: block.len(),
                });
            }
            let ranked = rank(block)?;
            for (sum, r) in rank_sums.iter_mut().zip(&ranked.ranks) {
                *sum += r;
            }
        }
        let l = rank_sums
            .iter()
            .enumerate()
            .map(|(j, r)| (j + 1) as f64 * r)
            .sum();
        Ok(Self {
            k,
            n: blocks.len(),
            l,
        })
    }
}

/// Exact and asymptotic Page probabilities.
#[derive(Debug, Clone)]
pub struct Page {
    max_k: usize,
    max_n: usize,
    upper: SparseKeyedTable<3>,
}

impl Page {
    /// Builds `P(L >= l)` for k = 3..=max_k treatments and n = 2..=max_n
    /// blocks.
    ///
    /// # Errors
    /// [`Error::Domain`] if `max_k` is outside `3..=9` or `max_n` outside
    /// `2..=20`.
    pub fn new(max_k: usize, max_n: usize) -> Result<Self> {
        if !(3..=PAGE_ENUMERATION_CAP).contains(&max_k) {
            return Err(Error::Domain(format!(
                "Page tables need 3 <= k <= {PAGE_ENUMERATION_CAP}, got {max_k}"
            )));
        }
        if !(2..=PAGE_BLOCK_CAP).contains(&max_n) {
            return Err(Error::Domain(format!(
                "Page tables need 2 <= n <= {PAGE_BLOCK_CAP}, got {max_n}"
            )));
        }
        let mut upper =
            SparseKeyedTable::new([3..=max_k, 2..=max_n, 0..=max_n * block_max(max_k)])?;

        for k in 3..=max_k {
            let (lo, hi) = (block_min(k), block_max(k));
            let mut counts = vec![0_u64; hi + 1];
            for_each_permutation(k, |perm| {
                let value: usize = perm.iter().enumerate().map(|(j, &p)| (j + 1) * (p + 1)).sum();
                counts[value] += 1;
            });
            let total = counts.iter().sum::<u64>() as f64;
            let block: Vec<(usize, f64)> = counts
                .iter()
                .enumerate()
                .filter(|(_, c)| **c > 0)
                .map(|(v, &c)| (v, c as f64 / total))
                .collect();

            // distribution of L over the first n blocks, indexed by value
            let mut dist = vec![1.0];
            for n in 1..=max_n {
                let mut next = vec![0.0; dist.len() + hi];
                for (x, &p) in dist.iter().enumerate() {
                    if p == 0.0 {
                        continue;
                    }
                    for &(v, q) in &block {
                        next[x + v] += p * q;
                    }
                }
                dist = next;
                if n < 2 {
                    continue;
                }
                let mut tail = 0.0;
                for l in (0..dist.len()).rev() {
                    tail += dist[l];
                    let p = if l <= n * lo { 1.0 } else { tail.min(1.0) };
                    upper.set([k, n, l], p)?;
                }
            }
        }

        Ok(Self {
            max_k,
            max_n,
            upper,
        })
    }

    /// Largest tabulated number of treatments.
    pub fn max_k(&self) -> usize {
        self.max_k
    }

    /// Largest tabulated number of blocks.
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Exact `P(L >= l)` for `k` treatments in `n` blocks.
    pub fn exact_probability(&self, k: usize, n: usize, l: f64) -> PValue {
        if !(3..=self.max_k).contains(&k) || !(2..=self.max_n).contains(&n) || l.is_nan() {
            return PValue::NotTabulated;
        }
        if l <= (n * block_min(k)) as f64 {
            return PValue::Saturated;
        }
        if l > (n * block_max(k)) as f64 {
            return PValue::Value(0.0);
        }
        match self.upper.get([k, n, l.ceil() as usize]) {
            Ok(Some(p)) => PValue::from_probability(p),
            _ => PValue::NotTabulated,
        }
    }

    /// Normal approximation of `P(L >= l)` with mean `nk(k+1)²/4` and
    /// variance `nk²(k+1)(k²−1)/144`.
    pub fn asymptotic_probability(&self, k: usize, n: usize, l: f64) -> PValue {
        if k < 2 || n == 0 {
            return PValue::NotTabulated;
        }
        let (kf, nf) = (k as f64, n as f64);
        let mean = nf * kf * (kf + 1.0) * (kf + 1.0) / 4.0;
        let variance = nf * kf * kf * (kf + 1.0) * (kf * kf - 1.0) / 144.0;
        PValue::from_z((l - mean) / variance.sqrt(), Tail::Upper)
    }

    /// Exact when tabulated, asymptotic otherwise.
    pub fn probability(&self, k: usize, n: usize, l: f64) -> PValue {
        self.exact_probability(k, n, l)
            .or_else(|| self.asymptotic_probability(k, n, l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn adapter() -> &'static Page {
        static TABLE: OnceLock<Page> = OnceLock::new();
        TABLE.get_or_init(|| Page::new(5, 10).unwrap())
    }

    fn value(p: PValue) -> f64 {
        p.probability().unwrap()
    }

    #[test]
    fn test_block_bounds() {
        assert_eq!((block_min(3), block_max(3)), (10, 14));
        assert_eq!((block_min(4), block_max(4)), (20, 30));
    }

    #[test]
    fn test_exact_known_values() {
        let page = adapter();
        let cases = [
            (3, 2, 28.0, 1.0 / 36.0),
            (3, 4, 56.0, 1.0 / 1296.0),
            (3, 4, 53.0, 0.056_327_160_493_827_16),
            (4, 3, 89.0, 0.000_723_379_629_629_629_6),
            (5, 6, 290.0, 0.056_208_336_316_269_605),
            (4, 10, 260.0, 0.151_196_686_314_741_37),
        ];
        for (k, n, l, expected) in cases {
            let p = value(page.exact_probability(k, n, l));
            assert!((p - expected).abs() < 1e-12, "k={k}, n={n}, l={l}: {p}");
        }
    }

    #[test]
    fn test_exact_boundaries() {
        let page = adapter();
        assert_eq!(page.exact_probability(3, 4, 40.0), PValue::Saturated);
        assert_eq!(page.exact_probability(3, 4, 57.0), PValue::Value(0.0));
        assert_eq!(page.exact_probability(6, 4, 100.0), PValue::NotTabulated);
        assert_eq!(page.exact_probability(3, 1, 14.0), PValue::NotTabulated);
        // non-integer statistics round up to the next attainable value
        assert_eq!(page.exact_probability(3, 4, 52.5), page.exact_probability(3, 4, 53.0));
    }

    #[test]
    fn test_asymptotic() {
        let page = adapter();
        let p = value(page.asymptotic_probability(5, 6, 290.0));
        assert!((p - 0.051_235_217_429_874_69).abs() < 1e-9);
        assert_eq!(
            page.probability(7, 6, 700.0),
            page.asymptotic_probability(7, 6, 700.0)
        );
        assert_eq!(page.probability(3, 4, 53.0), page.exact_probability(3, 4, 53.0));
    }

    #[test]
    fn test_statistic_from_blocks() {
        let blocks = vec![vec![1.0, 2.0, 3.0], vec![1.0, 3.0, 2.0]];
        let stat = PageStatistic::from_blocks(&blocks).unwrap();
        assert_eq!(stat, PageStatistic { k: 3, n: 2, l: 27.0 });
        assert!(PageStatistic::from_blocks(&[]).is_err());
        let ragged = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        assert!(matches!(
            PageStatistic::from_blocks(&ragged),
            Err(Error::Arity { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_invalid_limits() {
        assert!(Page::new(2, 5).is_err());
        assert!(Page::new(10, 5).is_err());
        assert!(Page::new(4, 21).is_err());
    }
}
