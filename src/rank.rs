//! Midrank transform with tie correction.
//!
//! Every rank-based statistic in [`crate::exact`] starts here: a sample
//! is replaced by ranks 1..=n, tied values share the mean of the ranks
//! they span, and the tie-correction weight `Σ t(t² − 1)` over tie
//! groups of size `t` feeds the asymptotic variance adjustments.

use crate::error::{Error, Result};

/// Ranks of a sample, parallel to the input, with its tie weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSample {
    /// Midranks; `ranks[i]` belongs to `sample[i]`.
    pub ranks: Vec<f64>,
    /// `Σ t(t² − 1)` over tie groups of size `t`. Zero without ties.
    pub tie_weight: f64,
}

impl RankedSample {
    /// Sample size.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// True only for an empty sample, which [`rank`] never returns.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Sizes of the tie groups (only groups with more than one member),
    /// in ascending order of the tied value.
    pub fn tie_groups(&self) -> Vec<usize> {
        let mut sorted = self.ranks.clone();
        sorted.sort_by(f64::total_cmp);
        let mut groups = Vec::new();
        let mut i = 0;
        while i < sorted.len() {
            let mut j = i + 1;
            while j < sorted.len() && sorted[j] == sorted[i] {
                j += 1;
            }
            if j - i > 1 {
                groups.push(j - i);
            }
            i = j;
        }
        groups
    }

    /// Sum of the ranks at `indices`.
    ///
    /// # Errors
    /// [`Error::Domain`] if an index is past the end of the sample.
    pub fn rank_sum(&self, indices: impl IntoIterator<Item = usize>) -> Result<f64> {
        let mut sum = 0.0;
        for i in indices {
            let r = self.ranks.get(i).ok_or_else(|| {
                Error::Domain(format!("index {i} outside sample of {}", self.ranks.len()))
            })?;
            sum += r;
        }
        Ok(sum)
    }
}

/// Assigns midranks to `sample`.
///
/// # Algorithm
/// Sort indices by value, walk runs of equal values, give each run the
/// mean of its 1-based positions, and accumulate `t(t² − 1)` per run.
/// Ties are exact equality; O(n log n).
///
/// # Errors
/// [`Error::Domain`] for an empty sample or one containing NaN.
///
/// # Examples
/// ```
/// use u_nonparam::rank::rank;
///
/// let r = rank(&[1.0, 1.0, 2.0]).unwrap();
/// assert_eq!(r.ranks, vec![1.5, 1.5, 3.0]);
/// assert_eq!(r.tie_weight, 6.0);
/// ```
pub fn rank(sample: &[f64]) -> Result<RankedSample> {
    if sample.is_empty() {
        return Err(Error::Domain("cannot rank an empty sample".into()));
    }
    if sample.iter().any(|v| v.is_nan()) {
        return Err(Error::Domain("cannot rank a sample containing NaN".into()));
    }

    let n = sample.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| sample[a].total_cmp(&sample[b]));

    let mut ranks = vec![0.0; n];
    let mut tie_weight = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && sample[order[j]] == sample[order[i]] {
            j += 1;
        }
        // positions i..j share ranks i+1..=j
        let midrank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = midrank;
        }
        let t = (j - i) as f64;
        tie_weight += t * (t * t - 1.0);
        i = j;
    }

    Ok(RankedSample { ranks, tie_weight })
}
