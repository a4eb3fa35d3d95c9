//! Numerical linear algebra support for the estimators.

pub mod cholesky;
pub mod rcond;
