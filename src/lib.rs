//! Ensemble Kalman estimation library.
//!
//! Bayesian filtering combines a mathematical model of a system with observations of that system.
//! For high dimensional or strongly non-linear systems maintaining the state covariance explicitly
//! is impractical, so the probability distribution of the state is instead represented by an
//! ensemble of sampled state realisations. The ensemble mean and sample covariance then take the
//! place of the x,X pair of a linearised Kalman estimator.
//!
//! This library implements the stochastic 'perturbed observation' Ensemble Kalman Filter.
//! Each filter cycle forecasts every ensemble member through the system model with additive
//! process noise, estimates the forecast statistics from the ensemble, and updates every member
//! with its own independently perturbed copy of the observation. Observations may be sparse:
//! they are mapped onto the state by a selection operator built from state element indices, and
//! individual observation slots may be missing in any cycle.
//!
//! State representations are modeled as structs. Common estimation operations are defined as
//! traits, and the numerical operations of the filter cycle are also available as pure functions.
//!
//! The implementation is numerically and dimensionally generic using nalgebra.
//!
//! # Licensing
//!
//! The source code is provided under the terms of the MIT license.

pub mod models;
pub mod noise;
pub mod estimators;
pub mod linalg;
#[cfg(feature = "std")]
pub mod observation;
mod matrix;
