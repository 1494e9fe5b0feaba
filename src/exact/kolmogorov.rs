//! Kolmogorov–Smirnov distributions.
//!
//! One sample: `P(D_n >= d)` where `D_n` is the supremum distance
//! between the empirical CDF of `n` observations and a fully specified
//! continuous CDF. Computed exactly by the Marsaglia–Tsang–Wang matrix
//! power up to the configured `n`; beyond that the limiting series
//! [`kolmogorov_tail`] evaluated at `d·√n`.
//!
//! Two samples: `P(D_{m,n} >= d)` by counting monotone lattice paths
//! from `(0, 0)` to `(m, n)` that stay within the band `|i/m − j/n| < d`.
//! Equal sizes are tabulated as `(n, k) ↦ P(D_{n,n} >= k/n)`; unequal
//! sizes are computed directly. The asymptotic form is
//! `kolmogorov_tail(d·√(mn/(m+n)))`.
//!
//! # References
//! - Marsaglia, Tsang & Wang (2003), "Evaluating Kolmogorov's
//!   distribution", *J. Stat. Software* 8(18).
//! - Hodges (1958), "The significance probability of the Smirnov
//!   two-sample test", *Arkiv för Matematik* 3.

use crate::distributions::ContinuousDistribution;
use crate::error::{Error, Result};
use crate::pvalue::PValue;
use crate::special::kolmogorov_tail;
use crate::table::SparseKeyedTable;

/// Sample-size configuration of a Kolmogorov test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Samples {
    /// One sample of size n against a reference distribution.
    One(usize),
    /// Two samples of sizes m and n.
    Two(usize, usize),
}

/// Scaling step for the matrix power, as a power of ten.
const SCALE_EXPONENT: i32 = 140;
const SCALE_UP: f64 = 1e140;
const SCALE_DOWN: f64 = 1e-140;

/// Largest supported two-sample size.
const MAX_TWO_SAMPLE: usize = 100;

/// Largest supported one-sample size.
const MAX_ONE_SAMPLE: usize = 1000;

// ============================================================================
// Statistics
// ============================================================================

fn sorted(sample: &[f64]) -> Result<Vec<f64>> {
    if sample.is_empty() {
        return Err(Error::Domain("Kolmogorov statistic of an empty sample".into()));
    }
    if sample.iter().any(|v| v.is_nan()) {
        return Err(Error::Domain("Kolmogorov statistic of a sample with NaN".into()));
    }
    let mut values = sample.to_vec();
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// `D_n = sup |F_n(x) − F(x)|` against `reference`.
///
/// # Errors
/// [`Error::Domain`] for an empty sample or NaN.
pub fn one_sample_statistic(
    sample: &[f64],
    reference: &impl ContinuousDistribution,
) -> Result<f64> {
    let values = sorted(sample)?;
    let n = values.len() as f64;
    let d = values
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = reference.cumulative_probability(x);
            ((i + 1) as f64 / n - f).max(f - i as f64 / n)
        })
        .fold(0.0, f64::max);
    Ok(d)
}

/// `D_{m,n} = sup |F_m(x) − G_n(x)|` between two empirical CDFs.
///
/// # Errors
/// [`Error::Domain`] if either sample is empty or contains NaN.
pub fn two_sample_statistic(x: &[f64], y: &[f64]) -> Result<f64> {
    let xs = sorted(x)?;
    let ys = sorted(y)?;
    let (m, n) = (xs.len(), ys.len());
    let (mut i, mut j) = (0, 0);
    let mut d = 0.0_f64;
    while i < m && j < n {
        let v = xs[i].min(ys[j]);
        while i < m && xs[i] <= v {
            i += 1;
        }
        while j < n && ys[j] <= v {
            j += 1;
        }
        d = d.max((i as f64 / m as f64 - j as f64 / n as f64).abs());
    }
    Ok(d)
}

// ============================================================================
// Exact computations
// ============================================================================

fn multiply(a: &[f64], b: &[f64], m: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * m];
    for i in 0..m {
        for k in 0..m {
            let aik = a[i * m + k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..m {
                c[i * m + j] += aik * b[k * m + j];
            }
        }
    }
    c
}

/// `a^n` for an m×m matrix, with a base-10 exponent carried separately.
fn matrix_power(a: &[f64], m: usize, n: usize) -> (Vec<f64>, i32) {
    if n == 1 {
        return (a.to_vec(), 0);
    }
    let (half, exponent) = matrix_power(a, m, n / 2);
    let mut b = multiply(&half, &half, m);
    let mut eb = 2 * exponent;
    if n % 2 == 1 {
        b = multiply(a, &b, m);
    }
    if b[(m / 2) * m + m / 2] > SCALE_UP {
        for v in &mut b {
            *v *= SCALE_DOWN;
        }
        eb += SCALE_EXPONENT;
    }
    (b, eb)
}

/// `P(D_n < d)` for `n >= 1`, `0 < d < 1`.
fn one_sample_cdf(n: usize, d: f64) -> f64 {
    let nf = n as f64;
    let s = d * d * nf;
    if s > 7.24 || (s > 3.76 && n > 99) {
        return 1.0 - 2.0 * (-(2.000_071 + 0.331 / nf.sqrt() + 1.409 / nf) * s).exp();
    }

    let k = (nf * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nf * d;
    let mut hm = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                hm[i * m + j] = 1.0;
            }
        }
    }
    for i in 0..m {
        hm[i * m] -= h.powi(i as i32 + 1);
        hm[(m - 1) * m + i] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        hm[(m - 1) * m] += (2.0 * h - 1.0).powi(m as i32);
    }
    // divide the (i, j) entry by (i − j + 1)!
    for i in 0..m {
        for j in 0..m.min(i + 1) {
            let factorial: f64 = (1..=(i + 1 - j)).map(|g| g as f64).product();
            hm[i * m + j] /= factorial;
        }
    }

    let (q, mut exponent) = matrix_power(&hm, m, n);
    let mut s = q[(k - 1) * m + (k - 1)];
    for i in 1..=n {
        s = s * i as f64 / nf;
        if s < SCALE_DOWN {
            s *= SCALE_UP;
            exponent -= SCALE_EXPONENT;
        }
    }
    s * 10_f64.powi(exponent)
}

/// `P(D_{m,n} < d)` by lattice-path counting, normalized row by row.
fn two_sample_cdf(m: usize, n: usize, d: f64) -> f64 {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    let (md, nd) = (m as f64, n as f64);
    // largest attainable distance strictly below d
    let q = (0.5 + (d * md * nd - 1e-7).floor()) / (md * nd);
    let mut u: Vec<f64> = (0..=n)
        .map(|j| if j as f64 / nd > q { 0.0 } else { 1.0 })
        .collect();
    for i in 1..=m {
        let w = i as f64 / (i + n) as f64;
        u[0] = if i as f64 / md > q { 0.0 } else { w * u[0] };
        for j in 1..=n {
            u[j] = if (i as f64 / md - j as f64 / nd).abs() > q {
                0.0
            } else {
                w * u[j] + u[j - 1]
            };
        }
    }
    u[n]
}

// ============================================================================
// Adapter
// ============================================================================

/// Exact and asymptotic Kolmogorov–Smirnov probabilities.
#[derive(Debug, Clone)]
pub struct Kolmogorov {
    one_sample_max_n: usize,
    two_sample_max_n: usize,
    equal_sizes: SparseKeyedTable<2>,
}

impl Kolmogorov {
    /// Tabulates the equal-size two-sample distribution up to
    /// `two_sample_max_n`.
    ///
    /// # Errors
    /// [`Error::Domain`] if either limit is 0 or above its supported
    /// maximum (1000 and 100).
    pub fn new(one_sample_max_n: usize, two_sample_max_n: usize) -> Result<Self> {
        if !(1..=MAX_ONE_SAMPLE).contains(&one_sample_max_n) {
            return Err(Error::Domain(format!(
                "one-sample limit must be in 1..={MAX_ONE_SAMPLE}, got {one_sample_max_n}"
            )));
        }
        if !(1..=MAX_TWO_SAMPLE).contains(&two_sample_max_n) {
            return Err(Error::Domain(format!(
                "two-sample limit must be in 1..={MAX_TWO_SAMPLE}, got {two_sample_max_n}"
            )));
        }
        let mut equal_sizes =
            SparseKeyedTable::new([1..=two_sample_max_n, 0..=two_sample_max_n])?;
        for n in 1..=two_sample_max_n {
            equal_sizes.set([n, 0], 1.0)?;
            for k in 1..=n {
                let d = k as f64 / n as f64;
                let p = 1.0 - two_sample_cdf(n, n, d);
                equal_sizes.set([n, k], p.clamp(0.0, 1.0))?;
            }
        }
        Ok(Self {
            one_sample_max_n,
            two_sample_max_n,
            equal_sizes,
        })
    }

    /// Largest one-sample n computed exactly.
    pub fn one_sample_max_n(&self) -> usize {
        self.one_sample_max_n
    }

    /// Largest two-sample size computed exactly.
    pub fn two_sample_max_n(&self) -> usize {
        self.two_sample_max_n
    }

    /// Exact `P(D >= d)`.
    pub fn exact_probability(&self, samples: Samples, d: f64) -> PValue {
        if d.is_nan() {
            return PValue::NotTabulated;
        }
        match samples {
            Samples::One(n) => {
                if n == 0 || n > self.one_sample_max_n {
                    return PValue::NotTabulated;
                }
                if d <= 0.0 {
                    return PValue::Saturated;
                }
                if d >= 1.0 {
                    return PValue::Value(0.0);
                }
                PValue::from_probability(1.0 - one_sample_cdf(n, d))
            }
            Samples::Two(m, n) => {
                if m == 0 || n == 0 || m.max(n) > self.two_sample_max_n {
                    return PValue::NotTabulated;
                }
                if d <= 0.0 {
                    return PValue::Saturated;
                }
                if d > 1.0 {
                    return PValue::Value(0.0);
                }
                if m == n {
                    let k = (d * n as f64 - 1e-9).ceil() as usize;
                    return match self.equal_sizes.get([n, k.min(n)]) {
                        Ok(Some(p)) => PValue::from_probability(p),
                        _ => PValue::NotTabulated,
                    };
                }
                PValue::from_probability(1.0 - two_sample_cdf(m, n, d))
            }
        }
    }

    /// Limiting distribution `P(D >= d) ≈ kolmogorov_tail(d·√n_eff)` with
    /// `n_eff = n` or `mn/(m+n)`.
    pub fn asymptotic_probability(&self, samples: Samples, d: f64) -> PValue {
        let effective = match samples {
            Samples::One(0) | Samples::Two(0, _) | Samples::Two(_, 0) => {
                return PValue::NotTabulated;
            }
            Samples::One(n) => n as f64,
            Samples::Two(m, n) => (m * n) as f64 / (m + n) as f64,
        };
        PValue::from_probability(kolmogorov_tail(d * effective.sqrt()))
    }

    /// Exact when within the limits, asymptotic otherwise.
    pub fn probability(&self, samples: Samples, d: f64) -> PValue {
        self.exact_probability(samples, d)
            .or_else(|| self.asymptotic_probability(samples, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Uniform;

    fn adapter() -> Kolmogorov {
        Kolmogorov::new(100, 40).unwrap()
    }

    fn value(p: PValue) -> f64 {
        p.probability().unwrap()
    }

    #[test]
    fn test_one_sample_exact_reference_value() {
        // Marsaglia, Tsang & Wang: K(10, 0.274) = 0.6284796154565043
        let k = adapter();
        let p = value(k.exact_probability(Samples::One(10), 0.274));
        assert!((p - (1.0 - 0.628_479_615_456_504_3)).abs() < 1e-12);
    }

    #[test]
    fn test_one_sample_exact_known_tails() {
        let k = adapter();
        let p = value(k.exact_probability(Samples::One(10), 0.409));
        assert!((p - 0.050_223_408_105_474_876).abs() < 1e-10);
        let p = value(k.exact_probability(Samples::One(5), 0.5));
        assert!((p - 0.112).abs() < 1e-12);
        let p = value(k.exact_probability(Samples::One(20), 0.294));
        assert!((p - 0.050_093_946_231_077_324).abs() < 1e-10);
    }

    #[test]
    fn test_one_sample_boundaries() {
        let k = adapter();
        assert_eq!(k.exact_probability(Samples::One(10), 0.0), PValue::Saturated);
        assert_eq!(k.exact_probability(Samples::One(10), 1.0), PValue::Value(0.0));
        assert_eq!(k.exact_probability(Samples::One(101), 0.1), PValue::NotTabulated);
        assert_eq!(
            k.probability(Samples::One(500), 0.05),
            k.asymptotic_probability(Samples::One(500), 0.05)
        );
    }

    #[test]
    fn test_two_sample_exact_equal_sizes() {
        let k = adapter();
        let cases = [
            (4, 0.75, 8.0 / 35.0),
            (5, 1.0, 2.0 / 252.0),
            (10, 0.4, 0.417_523_652_817_770_5),
            (40, 0.25, 0.164_972_699_502_242),
        ];
        for (n, d, expected) in cases {
            let p = value(k.exact_probability(Samples::Two(n, n), d));
            assert!((p - expected).abs() < 1e-12, "n={n}, d={d}: {p}");
        }
    }

    #[test]
    fn test_two_sample_exact_unequal_sizes() {
        let k = adapter();
        let p = value(k.exact_probability(Samples::Two(3, 5), 0.6));
        assert!((p - 13.0 / 28.0).abs() < 1e-12);
        let p = value(k.exact_probability(Samples::Two(6, 4), 0.5));
        assert!((p - 58.0 / 105.0).abs() < 1e-12);
        assert_eq!(
            k.exact_probability(Samples::Two(41, 3), 0.5),
            PValue::NotTabulated
        );
    }

    #[test]
    fn test_two_sample_asymptotic() {
        let k = adapter();
        let p = value(k.asymptotic_probability(Samples::Two(50, 50), 0.3));
        assert!((p - kolmogorov_tail(0.3 * 25.0_f64.sqrt())).abs() < 1e-15);
        assert_eq!(
            k.asymptotic_probability(Samples::Two(0, 5), 0.3),
            PValue::NotTabulated
        );
        // the exact tail converges to the limit for large equal sizes
        let exact = value(k.exact_probability(Samples::Two(40, 40), 0.25));
        let approx = value(k.asymptotic_probability(Samples::Two(40, 40), 0.25));
        assert!((exact - approx).abs() < 0.05);
    }

    #[test]
    fn test_statistics() {
        let u = Uniform::default();
        let d = one_sample_statistic(&[0.7, 0.1, 0.4], &u).unwrap();
        assert!((d - 0.3).abs() < 1e-12);
        assert_eq!(two_sample_statistic(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 1.0);
        let d = two_sample_statistic(&[1.0, 3.0, 5.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((d - 1.0 / 3.0).abs() < 1e-12);
        assert!(two_sample_statistic(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_invalid_limits() {
        assert!(Kolmogorov::new(0, 10).is_err());
        assert!(Kolmogorov::new(10, 101).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn one_sample_tail_decreasing(n in 1_usize..60, d in 0.01_f64..0.9) {
            let k = Kolmogorov::new(60, 1).unwrap();
            let a = k.exact_probability(Samples::One(n), d).probability().unwrap();
            let b = k.exact_probability(Samples::One(n), d + 0.05).probability().unwrap();
            prop_assert!(b <= a + 1e-12);
            prop_assert!((0.0..=1.0).contains(&a));
        }

        #[test]
        fn two_sample_symmetric_in_sizes(m in 1_usize..15, n in 1_usize..15, d in 0.05_f64..1.0) {
            let k = Kolmogorov::new(1, 15).unwrap();
            let ab = k.exact_probability(Samples::Two(m, n), d);
            let ba = k.exact_probability(Samples::Two(n, m), d);
            prop_assert_eq!(ab, ba);
        }
    }
}
