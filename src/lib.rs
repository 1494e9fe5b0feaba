//! # u-nonparam
//!
//! Probability engine for nonparametric hypothesis tests.
//!
//! This crate turns rank statistics into p-values. It knows how to rank a
//! sample, how the common rank statistics are distributed under the null
//! hypothesis, and how to read precomputed tables. It does not run tests
//! end to end or format reports.
//!
//! ## Modules
//!
//! - [`special`]: Log-gamma, incomplete gamma, Normal CDF and quantile,
//!   Kolmogorov tail
//! - [`combinatorics`]: Factorials and binomial coefficients, exact and
//!   floating-point
//! - [`table`]: Sparse keyed tables with optional header axis and
//!   fallback scans
//! - [`rank`]: Midrank transform with tie weights
//! - [`pvalue`]: Tagged p-value outcome and tail selection
//! - [`distributions`]: Continuous families behind one trait
//! - [`discrete`]: Discrete families behind one trait
//! - [`exact`]: Exact and asymptotic null distributions of rank statistics
//! - [`loader`]: JSON documents for precomputed tables
//!
//! ## Design Philosophy
//!
//! - **Exact where feasible**: Tables are built from exact counts and the
//!   Normal approximation takes over only outside them
//! - **Failure is explicit**: Out-of-range keys are errors and untabulated
//!   parameterizations are [`PValue::NotTabulated`], never a silent clamp
//! - **Property-based testing**: Distributional identities verified via
//!   proptest

pub mod combinatorics;
pub mod discrete;
pub mod distributions;
pub mod error;
pub mod exact;
pub mod loader;
pub mod pvalue;
pub mod rank;
pub mod special;
pub mod table;

pub use error::{Error, Result};
pub use pvalue::{PValue, Tail};
