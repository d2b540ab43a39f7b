//! The `ndarray-forward-backward` crate provides the proximal
//! Forward-Backward splitting algorithm for composite problems over `ndarray`s:
//! ```math
//! \min_x \gamma f(x) + \|y - \Phi x\|_2^2
//! ```
//! where _f_ is a possibly non-smooth regularizer known only through its
//! proximal operator, and $`\Phi`$ a linear measurement operator.
//!
//! The engine, [`prox::ForwardBackward`], is configured once and can then be
//! called repeatedly, e.g. chaining calls by warm-starting from a previous result.
//! Linear operators live in [`linop`], a few common proximal operators in [`prox`].
//!
//! Diagnostics go through the `log` facade; install any logger to see them.
//! Only inconsistent vector sizes are reported as an [`Error`], failure to
//! converge is part of the returned [`prox::Diagnostic`].

#![cfg_attr(all(rustc_nightly, test), feature(test))]
#[cfg(all(rustc_nightly, test))]
extern crate test;

#[cfg(test)]
extern crate blis_src;

mod error;
pub use error::{Error, Result};

pub mod linop;
pub mod prox;
