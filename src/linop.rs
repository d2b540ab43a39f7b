//! Linear Operators, Adjoints and Forward/Adjoint Pairs
//! building upon ndarray_linalg::operator
//!
//! The forward-backward engine only ever needs $`\Phi^T\Phi`$, so a
//! [`LinearTransform`] is the smallest thing it can be set up with:
//! a map and its adjoint acting on 1-D arrays.

use std::marker::PhantomData;

use ndarray::prelude::*;
use ndarray::{Data, DataMut, DataOwned, NdFloat};
pub use ndarray_linalg::diagonal::Diagonal;
pub use ndarray_linalg::operator::LinearOperator;
use ndarray_linalg::Scalar;
use num_traits::Float;

pub trait Adjoint<'a> {
    type Output;
    fn adj(&'a self) -> Self::Output;
}

impl<'a, A, S> Adjoint<'a> for ArrayBase<S, Ix2>
where
    A: 'a + Float,
    S: Data<Elem = A>,
{
    type Output = ArrayView<'a, A, Ix2>;

    fn adj(&'a self) -> Self::Output {
        self.t()
    }
}

impl<'a, A, Sa> Adjoint<'a> for Diagonal<Sa>
where
    A: 'a + Float,
    Sa: 'a + Data<Elem = A>,
{
    type Output = &'a Diagonal<Sa>;

    fn adj(&'a self) -> Self::Output {
        self
    }
}

/// Identity map, $`I x = x`$
#[derive(Default)]
pub struct Identity<A> {
    phantom: PhantomData<*const A>,
}

impl<A> Identity<A> {
    #[must_use]
    pub fn new() -> Identity<A> {
        Identity {
            phantom: PhantomData,
        }
    }
}

impl<A> LinearOperator for Identity<A>
where
    A: NdFloat + Scalar,
{
    type Elem = A;

    #[inline]
    fn apply<S>(&self, a: &ArrayBase<S, Ix1>) -> Array1<S::Elem>
    where
        S: Data<Elem = Self::Elem>,
    {
        a.to_owned()
    }

    #[inline]
    fn apply_mut<S>(&self, _a: &mut ArrayBase<S, Ix1>)
    where
        S: DataMut<Elem = Self::Elem>,
    {
    }

    #[inline]
    fn apply_into<S>(&self, a: ArrayBase<S, Ix1>) -> ArrayBase<S, Ix1>
    where
        S: DataOwned<Elem = Self::Elem> + DataMut,
    {
        a
    }
}

impl<'a, A: 'a> Adjoint<'a> for Identity<A> {
    type Output = &'a Identity<A>;

    fn adj(&'a self) -> Self::Output {
        self
    }
}

/// A linear map $`\Phi`$ together with its adjoint $`\Phi^T`$
///
/// Both directions must be pure. They need not preserve dimension,
/// i.e. $`\Phi`$ may map $`\mathbb{R}^n \to \mathbb{R}^m`$ as long as
/// `adjoint` maps back.
pub trait LinearTransform<A> {
    /// $`\Phi x`$
    fn forward(&self, x: ArrayView1<A>) -> Array1<A>;
    /// $`\Phi^T y`$
    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A>;
}

impl<'t, A, T> LinearTransform<A> for &'t T
where
    T: LinearTransform<A> + ?Sized,
{
    fn forward(&self, x: ArrayView1<A>) -> Array1<A> {
        (**self).forward(x)
    }

    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A> {
        (**self).adjoint(y)
    }
}

impl<A, S> LinearTransform<A> for ArrayBase<S, Ix2>
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    fn forward(&self, x: ArrayView1<A>) -> Array1<A> {
        self.dot(&x)
    }

    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A> {
        self.adj().dot(&y)
    }
}

impl<A, Sa> LinearTransform<A> for Diagonal<Sa>
where
    A: NdFloat + Scalar,
    Sa: Data<Elem = A>,
{
    fn forward(&self, x: ArrayView1<A>) -> Array1<A> {
        self.apply(&x)
    }

    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A> {
        self.adj().apply(&y)
    }
}

impl<A> LinearTransform<A> for Identity<A>
where
    A: NdFloat + Scalar,
{
    fn forward(&self, x: ArrayView1<A>) -> Array1<A> {
        self.apply(&x)
    }

    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A> {
        self.adj().apply(&y)
    }
}

/// Matrix-free operator built from two closures, see [`linear_transform`]
#[derive(Clone)]
pub struct FnTransform<F, B> {
    forward: F,
    adjoint: B,
}

/// Pairs a forward map with its adjoint
///
/// No check is made that `adjoint` is actually the adjoint of `forward`.
pub fn linear_transform<A, F, B>(forward: F, adjoint: B) -> FnTransform<F, B>
where
    F: Fn(ArrayView1<A>) -> Array1<A>,
    B: Fn(ArrayView1<A>) -> Array1<A>,
{
    FnTransform { forward, adjoint }
}

impl<A, F, B> LinearTransform<A> for FnTransform<F, B>
where
    F: Fn(ArrayView1<A>) -> Array1<A>,
    B: Fn(ArrayView1<A>) -> Array1<A>,
{
    fn forward(&self, x: ArrayView1<A>) -> Array1<A> {
        (self.forward)(x)
    }

    fn adjoint(&self, y: ArrayView1<A>) -> Array1<A> {
        (self.adjoint)(y)
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray_linalg::diagonal::AsDiagonal;

    #[test]
    fn ndarray_adj() {
        let A = array![[1., 2.], [3., 4.]];
        let B = array![[1., 3.], [2., 4.]];
        assert!(A.adj() == B);
        assert!(A.adj().adj() == A);
    }

    #[test]
    fn identity() {
        let I = Identity::new();
        let d = array![1., 2., 3., 4.];

        assert!(I.forward(d.view()) == d);
        assert!(I.adjoint(d.view()) == d);
    }

    #[test]
    fn matrix_transform_is_rectangular() {
        // R^2 -> R^3 and back
        let A = array![[1., 0.], [0., 2.], [1., 1.]];
        let x = array![1., -1.];
        let y = A.forward(x.view());
        assert_abs_diff_eq!(y, array![1., -2., 0.]);
        assert_abs_diff_eq!(A.adjoint(y.view()), array![1., -4.]);
    }

    #[test]
    fn diagonal_transform() {
        let d = array![1., 2., 3., 4.];
        let D = d.as_diagonal();
        let ones = Array1::ones(4);
        assert_abs_diff_eq!(D.forward(ones.view()), d);
        assert_abs_diff_eq!(D.adjoint(ones.view()), d);
    }

    #[test]
    fn closure_pair_matches_matrix() {
        let A = array![[2., 1.], [0., 3.]];
        let op = linear_transform(|x: ArrayView1<f64>| A.dot(&x), |y: ArrayView1<f64>| A.t().dot(&y));
        let x = array![1., 2.];
        assert_abs_diff_eq!(op.forward(x.view()), A.forward(x.view()));
        assert_abs_diff_eq!(op.adjoint(x.view()), A.adjoint(x.view()));
        // through a reference as well
        let by_ref = &op;
        assert_abs_diff_eq!(by_ref.adjoint(x.view()), array![2., 7.]);
    }
}
