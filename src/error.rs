//! Configuration errors raised before an iteration runs

use thiserror::Error;

/// Inconsistent vector sizes between the target, the projected
/// operator and the initial guess.
///
/// Numerical trouble (NaN, divergence) and failure to converge
/// are never reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The projected operator applied to the target has a different
    /// length than the solution guess.
    #[error(
        "target, adjoint measurement operator and input vector have inconsistent sizes \
         (operator output {operator}, guess {guess})"
    )]
    OperatorSizeMismatch { operator: usize, guess: usize },
    /// The projected operator changes the length of the target, so
    /// residuals cannot be formed.
    #[error("projected operator maps the target of size {target} to size {operator}")]
    ProjectionSizeMismatch { operator: usize, target: usize },
    /// The target and the residual guess differ in length.
    #[error("target and residual vector have inconsistent sizes (target {target}, residual {residual})")]
    ResidualSizeMismatch { target: usize, residual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
