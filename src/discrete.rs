//! Discrete probability distributions.
//!
//! | Distribution | Parameters | Support | Mean | Variance |
//! |---|---|---|---|---|
//! | [`Binomial`] | n, p | 0..=n | np | np(1−p) |
//! | [`Poisson`] | λ | 0.. | λ | λ |
//! | [`Geometric`] | p | 0.. (failures before success) | (1−p)/p | (1−p)/p² |
//! | [`DiscreteUniform`] | min, max | min..=max | (a+b)/2 | ((b−a+1)² − 1)/12 |
//!
//! Probabilities outside the support are 0. Constructors and setters
//! validate like the continuous families in [`crate::distributions`].

use crate::combinatorics::{binomial, ln_factorial};
use crate::error::{Error, Result};
use crate::special::regularized_gamma_q;

/// Common interface of the discrete families.
pub trait DiscreteDistribution {
    /// `P(X = k)`.
    fn probability(&self, k: i64) -> f64;

    /// `P(X <= k)`.
    fn cumulative_probability(&self, k: i64) -> f64;

    /// `P(X >= k)`, the tail used for one-sided p-values.
    fn upper_tail_probability(&self, k: i64) -> f64 {
        1.0 - self.cumulative_probability(k.saturating_sub(1))
    }

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;
}

fn probability_parameter(name: &'static str, p: f64, open_at_zero: bool) -> Result<()> {
    let lower_ok = if open_at_zero { p > 0.0 } else { p >= 0.0 };
    if lower_ok && p <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value: p })
    }
}

// ============================================================================
// Binomial Distribution
// ============================================================================

/// Largest trial count whose coefficient is computed exactly; C(1000, 500)
/// is still finite as an `f64`.
const EXACT_COEFFICIENT_TRIALS: u64 = 1000;

/// `ln C(n, k)`, from the exact coefficient within the working range.
fn ln_choose(n: u64, k: u64) -> f64 {
    if n <= EXACT_COEFFICIENT_TRIALS {
        if let Ok(c) = binomial(n as i64, k as i64) {
            return c.ln();
        }
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

/// Number of successes in `n` independent trials with success
/// probability `p`.
///
/// # Examples
/// ```
/// use u_nonparam::discrete::{Binomial, DiscreteDistribution};
/// let b = Binomial::new(4, 0.5).unwrap();
/// assert!((b.probability(2) - 0.375).abs() < 1e-12);
/// assert!((b.cumulative_probability(1) - 0.3125).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Binomial {
    trials: u64,
    p: f64,
}

impl Binomial {
    /// # Errors
    /// [`Error::InvalidParameter`] if `p` is outside `[0, 1]`.
    pub fn new(trials: u64, p: f64) -> Result<Self> {
        probability_parameter("p", p, false)?;
        Ok(Self { trials, p })
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn set_trials(&mut self, trials: u64) {
        self.trials = trials;
    }

    pub fn set_p(&mut self, p: f64) -> Result<()> {
        probability_parameter("p", p, false)?;
        self.p = p;
        Ok(())
    }
}

impl Default for Binomial {
    fn default() -> Self {
        Self { trials: 1, p: 0.5 }
    }
}

impl DiscreteDistribution for Binomial {
    fn probability(&self, k: i64) -> f64 {
        let n = self.trials;
        if k < 0 || k as u64 > n {
            return 0.0;
        }
        let k = k as u64;
        if self.p == 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if self.p == 1.0 {
            return if k == n { 1.0 } else { 0.0 };
        }
        (ln_choose(n, k) + k as f64 * self.p.ln() + (n - k) as f64 * (-self.p).ln_1p()).exp()
    }

    fn cumulative_probability(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        if k as u64 >= self.trials {
            return 1.0;
        }
        let sum: f64 = (0..=k).map(|i| self.probability(i)).sum();
        sum.min(1.0)
    }

    fn mean(&self) -> f64 {
        self.trials as f64 * self.p
    }

    fn variance(&self) -> f64 {
        self.trials as f64 * self.p * (1.0 - self.p)
    }
}

// ============================================================================
// Poisson Distribution
// ============================================================================

/// Poisson distribution with mean λ.
///
/// `P(X <= k) = Q(k + 1, λ)`, the regularized upper incomplete gamma.
#[derive(Debug, Clone, PartialEq)]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// [`Error::InvalidParameter`] if `lambda <= 0`.
    pub fn new(lambda: f64) -> Result<Self> {
        Self::check(lambda)?;
        Ok(Self { lambda })
    }

    fn check(lambda: f64) -> Result<()> {
        if lambda.is_finite() && lambda > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                name: "lambda",
                value: lambda,
            })
        }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) -> Result<()> {
        Self::check(lambda)?;
        self.lambda = lambda;
        Ok(())
    }
}

impl Default for Poisson {
    fn default() -> Self {
        Self { lambda: 1.0 }
    }
}

impl DiscreteDistribution for Poisson {
    fn probability(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        (k as f64 * self.lambda.ln() - self.lambda - ln_factorial(k as u64)).exp()
    }

    fn cumulative_probability(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        regularized_gamma_q(k as f64 + 1.0, self.lambda)
    }

    fn mean(&self) -> f64 {
        self.lambda
    }

    fn variance(&self) -> f64 {
        self.lambda
    }
}

// ============================================================================
// Geometric Distribution
// ============================================================================

/// Number of failures before the first success.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometric {
    p: f64,
}

impl Geometric {
    /// # Errors
    /// [`Error::InvalidParameter`] if `p` is outside `(0, 1]`.
    pub fn new(p: f64) -> Result<Self> {
        probability_parameter("p", p, true)?;
        Ok(Self { p })
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn set_p(&mut self, p: f64) -> Result<()> {
        probability_parameter("p", p, true)?;
        self.p = p;
        Ok(())
    }
}

impl Default for Geometric {
    fn default() -> Self {
        Self { p: 0.5 }
    }
}

impl DiscreteDistribution for Geometric {
    fn probability(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        self.p * (1.0 - self.p).powi(k.min(i32::MAX as i64) as i32)
    }

    fn cumulative_probability(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        // 1 − (1−p)^(k+1), via logs to stay accurate for small p
        -((k as f64 + 1.0) * (-self.p).ln_1p()).exp_m1()
    }

    fn mean(&self) -> f64 {
        (1.0 - self.p) / self.p
    }

    fn variance(&self) -> f64 {
        (1.0 - self.p) / (self.p * self.p)
    }
}

// ============================================================================
// Discrete Uniform Distribution
// ============================================================================

/// Uniform distribution on the integers `min..=max`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteUniform {
    min: i64,
    max: i64,
}

impl DiscreteUniform {
    /// # Errors
    /// [`Error::InvalidParameter`] if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidParameter {
                name: "max",
                value: max as f64,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn set_bounds(&mut self, min: i64, max: i64) -> Result<()> {
        *self = Self::new(min, max)?;
        Ok(())
    }

    /// Number of support points; the full `i64` range holds 2⁶⁴.
    fn count(&self) -> f64 {
        (i128::from(self.max) - i128::from(self.min) + 1) as f64
    }
}

impl Default for DiscreteUniform {
    fn default() -> Self {
        Self { min: 0, max: 1 }
    }
}

impl DiscreteDistribution for DiscreteUniform {
    fn probability(&self, k: i64) -> f64 {
        if k < self.min || k > self.max {
            0.0
        } else {
            1.0 / self.count()
        }
    }

    fn cumulative_probability(&self, k: i64) -> f64 {
        if k < self.min {
            0.0
        } else if k >= self.max {
            1.0
        } else {
            (i128::from(k) - i128::from(self.min) + 1) as f64 / self.count()
        }
    }

    fn mean(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    fn variance(&self) -> f64 {
        let n = self.count();
        (n * n - 1.0) / 12.0
    }
}

// ============================================================================
// Closed sum type
// ============================================================================

/// Any of the discrete families, dispatched by `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum Discrete {
    Binomial(Binomial),
    Poisson(Poisson),
    Geometric(Geometric),
    DiscreteUniform(DiscreteUniform),
}

impl Discrete {
    fn inner(&self) -> &dyn DiscreteDistribution {
        match self {
            Discrete::Binomial(d) => d,
            Discrete::Poisson(d) => d,
            Discrete::Geometric(d) => d,
            Discrete::DiscreteUniform(d) => d,
        }
    }

    /// Family name.
    pub fn name(&self) -> &'static str {
        match self {
            Discrete::Binomial(_) => "binomial",
            Discrete::Poisson(_) => "poisson",
            Discrete::Geometric(_) => "geometric",
            Discrete::DiscreteUniform(_) => "discrete-uniform",
        }
    }
}

impl DiscreteDistribution for Discrete {
    fn probability(&self, k: i64) -> f64 {
        self.inner().probability(k)
    }

    fn cumulative_probability(&self, k: i64) -> f64 {
        self.inner().cumulative_probability(k)
    }

    fn upper_tail_probability(&self, k: i64) -> f64 {
        self.inner().upper_tail_probability(k)
    }

    fn mean(&self) -> f64 {
        self.inner().mean()
    }

    fn variance(&self) -> f64 {
        self.inner().variance()
    }
}

impl From<Binomial> for Discrete {
    fn from(d: Binomial) -> Self {
        Discrete::Binomial(d)
    }
}

impl From<Poisson> for Discrete {
    fn from(d: Poisson) -> Self {
        Discrete::Poisson(d)
    }
}

impl From<Geometric> for Discrete {
    fn from(d: Geometric) -> Self {
        Discrete::Geometric(d)
    }
}

impl From<DiscreteUniform> for Discrete {
    fn from(d: DiscreteUniform) -> Self {
        Discrete::DiscreteUniform(d)
    }
}
