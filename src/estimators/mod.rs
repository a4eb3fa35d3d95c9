//! Bayesian state estimator implementations.

#[cfg(feature = "std")]
pub mod enkf;
