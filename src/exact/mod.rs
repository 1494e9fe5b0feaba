//! Exact and asymptotic null distributions of rank statistics.
//!
//! Each adapter owns the finite tables for its statistic, built once from
//! combinatorial enumeration, and answers with a [`PValue`]:
//!
//! | Adapter | Statistic | Exact method |
//! |---|---|---|
//! | [`SignedRank`] | Wilcoxon T | subset-sum counts over 2ⁿ |
//! | [`RankSum`] | Mann–Whitney U | recurrence on (m, n) |
//! | [`Runs`] | Wald–Wolfowitz R | closed form over binomials |
//! | [`Spearman`] | S = Σd² | permutation enumeration |
//! | [`Kolmogorov`] | D | Marsaglia–Tsang–Wang, lattice paths |
//! | [`Page`] | L = Σ j·Rⱼ | convolution of per-block distributions |
//!
//! Every adapter offers `exact_probability`, `asymptotic_probability` and
//! `probability`; the last uses the exact answer when the
//! parameterization is tabulated and falls back to the asymptotic one
//! otherwise.
//!
//! [`DistributionRegistry`] hands out the adapters by reference and
//! builds each one on first use.
//!
//! [`PValue`]: crate::PValue

pub mod kolmogorov;
pub mod page;
pub mod rank_sum;
pub mod runs;
pub mod signed_rank;
pub mod spearman;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use kolmogorov::Kolmogorov;
pub use page::Page;
pub use rank_sum::RankSum;
pub use runs::Runs;
pub use signed_rank::SignedRank;
pub use spearman::Spearman;

/// Largest Spearman table size; enumeration visits n! permutations.
pub const SPEARMAN_ENUMERATION_CAP: usize = 10;

/// Largest Page block size; enumeration visits k! permutations per table.
pub const PAGE_ENUMERATION_CAP: usize = 9;

/// Largest number of Page blocks; the table width grows with n·k³.
pub const PAGE_BLOCK_CAP: usize = 20;

/// Table extents per adapter.
///
/// Missing fields in a JSON document take their default.
///
/// # Examples
/// ```
/// use u_nonparam::exact::ExactLimits;
///
/// let limits = ExactLimits::from_json(r#"{ "spearman_max_n": 7 }"#).unwrap();
/// assert_eq!(limits.spearman_max_n, 7);
/// assert_eq!(limits.signed_rank_max_n, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactLimits {
    /// Signed rank tables cover n = 1..=this.
    pub signed_rank_max_n: usize,
    /// Rank sum tables cover both sample sizes up to this.
    pub rank_sum_max_size: usize,
    /// Runs tables cover both group sizes up to this.
    pub runs_max_size: usize,
    /// Spearman tables cover n = 2..=this.
    pub spearman_max_n: usize,
    /// One-sample Kolmogorov exact computation up to this n.
    pub kolmogorov_one_sample_max_n: usize,
    /// Two-sample Kolmogorov exact computation for sizes up to this.
    pub kolmogorov_two_sample_max_n: usize,
    /// Page tables cover k = 3..=this treatments.
    pub page_max_k: usize,
    /// Page tables cover n = 2..=this blocks.
    pub page_max_n: usize,
}

impl Default for ExactLimits {
    fn default() -> Self {
        Self {
            signed_rank_max_n: 50,
            rank_sum_max_size: 20,
            runs_max_size: 20,
            spearman_max_n: 9,
            kolmogorov_one_sample_max_n: 100,
            kolmogorov_two_sample_max_n: 40,
            page_max_k: 8,
            page_max_n: 12,
        }
    }
}

impl ExactLimits {
    /// Parses limits from JSON and validates them.
    ///
    /// # Errors
    /// [`Error::Load`] for malformed JSON, [`Error::Domain`] for limits
    /// outside the supported ranges.
    pub fn from_json(json: &str) -> Result<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Checks every extent against its supported range.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, usize, usize, usize); 8] = [
            ("signed_rank_max_n", self.signed_rank_max_n, 1, 60),
            ("rank_sum_max_size", self.rank_sum_max_size, 1, 30),
            ("runs_max_size", self.runs_max_size, 1, 100),
            (
                "spearman_max_n",
                self.spearman_max_n,
                2,
                SPEARMAN_ENUMERATION_CAP,
            ),
            (
                "kolmogorov_one_sample_max_n",
                self.kolmogorov_one_sample_max_n,
                1,
                1000,
            ),
            (
                "kolmogorov_two_sample_max_n",
                self.kolmogorov_two_sample_max_n,
                1,
                100,
            ),
            ("page_max_k", self.page_max_k, 3, PAGE_ENUMERATION_CAP),
            ("page_max_n", self.page_max_n, 2, PAGE_BLOCK_CAP),
        ];
        for (name, value, lo, hi) in checks {
            if !(lo..=hi).contains(&value) {
                return Err(Error::Domain(format!(
                    "{name} = {value} outside supported range {lo}..={hi}"
                )));
            }
        }
        Ok(())
    }
}

/// Owner of the exact-distribution adapters.
///
/// Each adapter is built on first request and reused afterwards. The
/// build runs inside the adapter's one-time barrier: concurrent first
/// callers block until the single build finishes. A failed build is
/// remembered and reported to every later caller.
///
/// # Examples
/// ```
/// use u_nonparam::exact::DistributionRegistry;
/// use u_nonparam::PValue;
///
/// let registry = DistributionRegistry::default();
/// let p = registry.signed_rank().unwrap().exact_probability(10, 8.0);
/// assert_eq!(p, PValue::Value(25.0 / 1024.0));
/// ```
#[derive(Debug, Default)]
pub struct DistributionRegistry {
    limits: ExactLimits,
    signed_rank: Slot<SignedRank>,
    rank_sum: Slot<RankSum>,
    runs: Slot<Runs>,
    spearman: Slot<Spearman>,
    kolmogorov: Slot<Kolmogorov>,
    page: Slot<Page>,
}

/// One-time slot holding an adapter or the error its build raised.
type Slot<T> = OnceLock<Result<T>>;

fn lazy<T>(slot: &Slot<T>, build: impl FnOnce() -> Result<T>) -> Result<&T> {
    match slot.get_or_init(build) {
        Ok(adapter) => Ok(adapter),
        Err(e) => Err(Error::Domain(format!("table build failed: {e}"))),
    }
}

impl DistributionRegistry {
    /// # Errors
    /// [`Error::Domain`] if `limits` fails validation.
    pub fn new(limits: ExactLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self {
            limits,
            ..Self::default()
        })
    }

    /// Limits the adapters are built with.
    pub fn limits(&self) -> &ExactLimits {
        &self.limits
    }

    /// Signed-rank adapter, built on first call.
    pub fn signed_rank(&self) -> Result<&SignedRank> {
        lazy(&self.signed_rank, || {
            SignedRank::new(self.limits.signed_rank_max_n)
        })
    }

    /// Rank-sum adapter, built on first call.
    pub fn rank_sum(&self) -> Result<&RankSum> {
        lazy(&self.rank_sum, || RankSum::new(self.limits.rank_sum_max_size))
    }

    /// Runs adapter, built on first call.
    pub fn runs(&self) -> Result<&Runs> {
        lazy(&self.runs, || Runs::new(self.limits.runs_max_size))
    }

    /// Spearman adapter, built on first call.
    pub fn spearman(&self) -> Result<&Spearman> {
        lazy(&self.spearman, || Spearman::new(self.limits.spearman_max_n))
    }

    /// Kolmogorov adapter, built on first call.
    pub fn kolmogorov(&self) -> Result<&Kolmogorov> {
        lazy(&self.kolmogorov, || {
            Kolmogorov::new(
                self.limits.kolmogorov_one_sample_max_n,
                self.limits.kolmogorov_two_sample_max_n,
            )
        })
    }

    /// Page adapter, built on first call.
    pub fn page(&self) -> Result<&Page> {
        lazy(&self.page, || {
            Page::new(self.limits.page_max_k, self.limits.page_max_n)
        })
    }
}

/// Calls `visit` once for every permutation of `0..n` (Heap's algorithm).
pub(crate) fn for_each_permutation(n: usize, mut visit: impl FnMut(&[usize])) {
    let mut perm: Vec<usize> = (0..n).collect();
    let mut counters = vec![0_usize; n];
    visit(&perm);
    let mut i = 1;
    while i < n {
        if counters[i] < i {
            if i % 2 == 0 {
                perm.swap(0, i);
            } else {
                perm.swap(counters[i], i);
            }
            visit(&perm);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

/// Normal-approximation z with a continuity correction of 0.5 towards
/// the mean. A non-positive variance gives NaN.
pub(crate) fn corrected_z(statistic: f64, mean: f64, variance: f64) -> f64 {
    if variance.is_nan() || variance <= 0.0 {
        return f64::NAN;
    }
    let diff = statistic - mean;
    let corrected = if diff > 0.0 {
        (diff - 0.5).max(0.0)
    } else {
        (diff + 0.5).min(0.0)
    };
    corrected / variance.sqrt()
}
