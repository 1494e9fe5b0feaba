//! Exact combinatorics.
//!
//! Factorials and binomial coefficients that stay exact for integers in
//! the hundreds. Arguments up to 20 are served from a fixed table (20! is
//! the largest factorial exactly representable in an `f64`); above that
//! the product is carried in arbitrary precision and converted once at
//! the end.

use num::bigint::BigUint;
use num::{One, ToPrimitive};

use crate::error::{Error, Result};
use crate::special::ln_gamma;

/// n! for n = 0..=20.
const FACTORIALS: [u64; 21] = [
    1,
    1,
    2,
    6,
    24,
    120,
    720,
    5_040,
    40_320,
    362_880,
    3_628_800,
    39_916_800,
    479_001_600,
    6_227_020_800,
    87_178_291_200,
    1_307_674_368_000,
    20_922_789_888_000,
    355_687_428_096_000,
    6_402_373_705_728_000,
    121_645_100_408_832_000,
    2_432_902_008_176_640_000,
];

/// Largest argument served from the fast-path table.
pub const FAST_PATH_LIMIT: u64 = 20;

/// Seed for the arbitrary-precision product.
const BIG_SEED: u64 = 11;

/// Exact n! as an arbitrary-precision integer.
///
/// # Examples
/// ```
/// use u_nonparam::combinatorics::factorial_exact;
/// let f = factorial_exact(25);
/// assert_eq!(f.to_string(), "15511210043330985984000000");
/// ```
pub fn factorial_exact(n: u64) -> BigUint {
    if n <= FAST_PATH_LIMIT {
        return BigUint::from(FACTORIALS[n as usize]);
    }
    let mut acc = BigUint::from(FACTORIALS[BIG_SEED as usize]);
    for k in (BIG_SEED + 1)..=n {
        acc *= k;
    }
    acc
}

/// n! as an `f64`.
///
/// Exact up to 20!, correctly rounded from the exact integer above that,
/// and `f64::INFINITY` beyond 170!.
///
/// # Errors
/// [`Error::Domain`] if `n < 0`.
///
/// # Examples
/// ```
/// use u_nonparam::combinatorics::factorial;
/// assert_eq!(factorial(5).unwrap(), 120.0);
/// assert_eq!(factorial(0).unwrap(), 1.0);
/// assert!(factorial(-1).is_err());
/// ```
pub fn factorial(n: i64) -> Result<f64> {
    if n < 0 {
        return Err(Error::Domain(format!("factorial of negative number {n}")));
    }
    let n = n as u64;
    if n <= FAST_PATH_LIMIT {
        return Ok(FACTORIALS[n as usize] as f64);
    }
    Ok(to_f64_saturating(&factorial_exact(n)))
}

/// Exact binomial coefficient C(m, n) = m! / (n!·(m−n)!).
///
/// The division is carried out on exact integers.
///
/// # Errors
/// [`Error::Domain`] if `n > m`.
pub fn binomial_exact(m: u64, n: u64) -> Result<BigUint> {
    if n > m {
        return Err(Error::Domain(format!("binomial({m}, {n}) with n > m")));
    }
    if n == 0 || n == m {
        return Ok(BigUint::one());
    }
    if m <= FAST_PATH_LIMIT {
        let value =
            FACTORIALS[m as usize] / (FACTORIALS[n as usize] * FACTORIALS[(m - n) as usize]);
        return Ok(BigUint::from(value));
    }
    let numerator = factorial_exact(m);
    let denominator = factorial_exact(n) * factorial_exact(m - n);
    Ok(numerator / denominator)
}

/// Binomial coefficient C(m, n) as an `f64`.
///
/// # Errors
/// [`Error::Domain`] if `n < 0` or `n > m`.
///
/// # Examples
/// ```
/// use u_nonparam::combinatorics::binomial;
/// assert_eq!(binomial(5, 2).unwrap(), 10.0);
/// assert_eq!(binomial(10, 0).unwrap(), 1.0);
/// assert!(binomial(3, 4).is_err());
/// ```
pub fn binomial(m: i64, n: i64) -> Result<f64> {
    if n < 0 || n > m {
        return Err(Error::Domain(format!(
            "binomial({m}, {n}) requires 0 <= n <= m"
        )));
    }
    Ok(to_f64_saturating(&binomial_exact(m as u64, n as u64)?))
}

/// ln(n!), exact table lookup up to 20 and `ln Γ(n+1)` beyond.
///
/// # Examples
/// ```
/// use u_nonparam::combinatorics::ln_factorial;
/// assert!((ln_factorial(5) - 120.0_f64.ln()).abs() < 1e-12);
/// ```
pub fn ln_factorial(n: u64) -> f64 {
    if n <= FAST_PATH_LIMIT {
        return (FACTORIALS[n as usize] as f64).ln();
    }
    ln_gamma(n as f64 + 1.0)
}

fn to_f64_saturating(value: &BigUint) -> f64 {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_small() {
        assert_eq!(factorial(0).unwrap(), 1.0);
        assert_eq!(factorial(1).unwrap(), 1.0);
        assert_eq!(factorial(5).unwrap(), 120.0);
        assert_eq!(factorial(20).unwrap(), 2_432_902_008_176_640_000.0);
    }

    #[test]
    fn test_factorial_negative_is_domain_error() {
        assert!(matches!(factorial(-3), Err(Error::Domain(_))));
    }

    #[test]
    fn test_factorial_big_path() {
        // 21! continues the table exactly
        assert_eq!(factorial(21).unwrap(), 51_090_942_171_709_440_000.0);
        let f30 = factorial_exact(30);
        assert_eq!(f30.to_string(), "265252859812191058636308480000000");
    }

    #[test]
    fn test_factorial_overflow_is_infinite() {
        assert!(factorial(170).unwrap().is_finite());
        assert_eq!(factorial(171).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_binomial_known() {
        assert_eq!(binomial(5, 2).unwrap(), 10.0);
        assert_eq!(binomial(10, 0).unwrap(), 1.0);
        assert_eq!(binomial(10, 10).unwrap(), 1.0);
        assert_eq!(binomial(40, 20).unwrap(), 137_846_528_820.0);
    }

    #[test]
    fn test_binomial_exact_large() {
        let c = binomial_exact(100, 50).unwrap();
        assert_eq!(c.to_string(), "100891344545564193334812497256");
    }

    #[test]
    fn test_binomial_domain() {
        assert!(binomial(5, -1).is_err());
        assert!(binomial(5, 6).is_err());
        assert!(binomial(-2, -3).is_err());
        assert!(binomial_exact(2, 3).is_err());
    }

    #[test]
    fn test_ln_factorial_continuity() {
        let direct = factorial(25).unwrap().ln();
        assert!((ln_factorial(25) - direct).abs() < 1e-10);
        assert_eq!(ln_factorial(0), 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn binomial_symmetric(m in 0_i64..120, frac in 0.0_f64..=1.0) {
            let n = ((m as f64) * frac).round() as i64;
            prop_assert_eq!(binomial(m, n).unwrap(), binomial(m, m - n).unwrap());
        }

        #[test]
        fn pascal_rule(m in 2_u64..150, frac in 0.0_f64..1.0) {
            let n = 1 + ((m - 1) as f64 * frac) as u64;
            let lhs = binomial_exact(m, n).unwrap();
            let rhs = binomial_exact(m - 1, n - 1).unwrap() + binomial_exact(m - 1, n).unwrap();
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn factorial_recurrence(n in 1_i64..60) {
            let lhs = factorial_exact(n as u64);
            let rhs = factorial_exact(n as u64 - 1) * (n as u64);
            prop_assert_eq!(lhs, rhs);
        }
    }
}
