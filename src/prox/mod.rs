//! Minimization for Composite Functions consisting of
//! a smooth least squares data term and a non-smooth prox-friendly _f_
//!
//! This includes common objective functions such as the LASSO
//! as well as constrained least squares, as a projection is
//! the proximal operator of a constraint set.
//!
//! Proximal operators are plain functions of `(x, step)`, where `step`
//! scales the regularizer:
//! ```math
//! \mathrm{prox}_{t f}(v) = \mathrm{arg}\!\min_x f(x) + \frac{1}{2t}\|x - v\|_2^2
//! ```
//! A few common ones are provided below.

mod forward_backward;
pub use forward_backward::*;

use ndarray::prelude::*;
use ndarray::NdFloat;

/// Proximal operator of $`f \equiv 0`$, i.e. plain least squares
pub fn identity_prox<S: NdFloat>(x: ArrayView1<S>, _step: S) -> Array1<S> {
    x.to_owned()
}

/// Proximal operator of $`\|x\|_1`$ (soft thresholding)
pub fn soft_threshold<S: NdFloat>(x: ArrayView1<S>, step: S) -> Array1<S> {
    x.mapv(|v| v.signum() * (v.abs() - step).max(S::zero()))
}

/// Proximal operator of the indicator of $`x \geq 0`$
///
/// The step is irrelevant for a projection.
pub fn nonneg_projection<S: NdFloat>(x: ArrayView1<S>, _step: S) -> Array1<S> {
    x.mapv(|v| v.max(S::zero()))
}

/// Sum of absolute values, $`\|x\|_1`$
pub fn l1_norm<S: NdFloat>(x: ArrayView1<S>) -> S {
    x.fold(S::zero(), |acc, v| acc + v.abs())
}

/// Euclidean norm, $`\|x\|_2`$
pub fn l2_norm<S: NdFloat>(x: ArrayView1<S>) -> S {
    x.dot(&x).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn soft_threshold_shrinks_toward_zero() {
        let x = array![3., -0.5, 0., -2., 1.];
        assert_abs_diff_eq!(soft_threshold(x.view(), 1.), array![2., 0., 0., -1., 0.]);
        // zero step is the identity
        assert_abs_diff_eq!(soft_threshold(x.view(), 0.), x);
    }

    #[test]
    fn nonneg_projection_clips() {
        let x = array![1.5f32, -3., 0.];
        assert_abs_diff_eq!(nonneg_projection(x.view(), 10.), array![1.5, 0., 0.]);
    }

    #[test]
    fn norms() {
        let x = array![3., -4.];
        assert_abs_diff_eq!(l1_norm(x.view()), 7.);
        assert_abs_diff_eq!(l2_norm(x.view()), 5.);
        assert_abs_diff_eq!(l2_norm(Array1::<f64>::zeros(0).view()), 0.);
    }

    #[test]
    fn identity_prox_copies() {
        let x = array![1., 2.];
        assert_eq!(identity_prox(x.view(), 0.5), x);
    }
}
