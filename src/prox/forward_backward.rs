//! Proximal Forward-Backward Splitting
//!
//! Solves
//! ```math
//! \min_x \gamma f(x) + \|y - \Phi x\|_2^2
//! ```
//! where $`f`$ is only known through its proximal operator. Each iteration takes
//! an explicit gradient (forward) step on the data term and an implicit proximal
//! (backward) step on $`f`$.
//!
//! The engine never sees $`\Phi`$ itself, only the projected operator
//! $`\Phi^T\Phi`$, and the target is expected in the same space
//! (e.g. the back-projection $`\Phi^T y`$).
//!
//! ```
//! # extern crate blis_src;
//! use ndarray::prelude::*;
//! use ndarray_forward_backward::prox::{identity_prox, l2_norm, ForwardBackward};
//!
//! let fb = ForwardBackward::new(identity_prox, array![2.0_f64, 0.])
//!     .with_beta(0.5)
//!     .with_itermax(100)
//!     .with_convergence(|_x, residual| l2_norm(residual) < 1e-6);
//! let result = fb.solve_from(array![0., 0.].view(), array![-2., 0.].view()).unwrap();
//! assert!(result.diagnostic.converged);
//! assert!((result.x[0] - 2.).abs() < 1e-6);
//! ```

use log::{debug, info, trace, warn};
use ndarray::prelude::*;
use ndarray::NdFloat;

use super::{l1_norm, l2_norm};
use crate::error::{Error, Result};
use crate::linop::LinearTransform;

/// Stopping criterion checked after every iteration
///
/// Implemented for any `Fn(x, residual) -> bool`.
pub trait Convergence<S> {
    /// Whether a criterion is configured at all.
    fn is_set(&self) -> bool {
        true
    }

    fn is_converged(&self, x: ArrayView1<S>, residual: ArrayView1<S>) -> bool;
}

impl<S, F> Convergence<S> for F
where
    F: Fn(ArrayView1<S>, ArrayView1<S>) -> bool,
{
    fn is_converged(&self, x: ArrayView1<S>, residual: ArrayView1<S>) -> bool {
        self(x, residual)
    }
}

/// No stopping criterion: run exactly `itermax` iterations
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

impl<S> Convergence<S> for Unset {
    fn is_set(&self) -> bool {
        false
    }

    fn is_converged(&self, _x: ArrayView1<S>, _residual: ArrayView1<S>) -> bool {
        false
    }
}

/// Criterion that only looks at the solution, see
/// [`ForwardBackward::with_solution_convergence`]
#[derive(Clone)]
pub struct SolutionOnly<F>(F);

impl<S, F> Convergence<S> for SolutionOnly<F>
where
    F: Fn(ArrayView1<S>) -> bool,
{
    fn is_converged(&self, x: ArrayView1<S>, _residual: ArrayView1<S>) -> bool {
        (self.0)(x)
    }
}

/// Default projected operator, $`\Phi^T\Phi = I`$
pub type IdentityProjection<S> = fn(ArrayView1<S>) -> Array1<S>;

fn identity_projection<S: Clone>(x: ArrayView1<S>) -> Array1<S> {
    x.to_owned()
}

// pins down the higher-ranked signature of a projection closure
fn projection<S, F>(f: F) -> F
where
    F: Fn(ArrayView1<S>) -> Array1<S>,
{
    f
}

/// Outcome of a single call
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic<S> {
    /// Number of iterations performed
    pub niters: usize,
    /// Whether the convergence criterion was met
    pub converged: bool,
    /// Residual after the last iteration
    pub residual: Array1<S>,
}

/// [`Diagnostic`] together with the solution, usable as a warm start
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticAndResult<S> {
    pub diagnostic: Diagnostic<S>,
    pub x: Array1<S>,
}

/// Canonical starting point for a target $`y`$:
/// $`x_0 = y`$ with a zero residual.
pub fn initial_guess<S: NdFloat>(target: ArrayView1<S>) -> (Array1<S>, Array1<S>) {
    (target.to_owned(), Array1::zeros(target.len()))
}

/// Proximal Forward-Backward engine
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// x_{i+1} &= \mathrm{prox}_{\mu\beta f}\left(x_i - \frac{\beta}{\sigma} r_i\right) \\
/// r_{i+1} &= \Phi^T\Phi x_{i+1} - y
/// \end{aligned}
/// ```
///
/// Parameters
/// ----------
/// - __itermax:__      maximum number of iterations, unbounded by default
/// - __sigma:__        scale of the data term, defaults to 1
/// - __mu:__           multiplier of the proximal threshold, defaults to 1
/// - __beta:__         gradient step size, defaults to 1e-8
/// - __convergence:__  criterion evaluated on $`(x_i, r_i)`$ after each iteration
/// - __phi_t_phi:__    projected operator $`\Phi^T\Phi`$, identity by default
/// - __g_proximal:__   proximal operator of $`f`$ as `(x, step) -> x`
/// - __target:__       target vector $`y`$
///
/// Convergence requires $`\beta`$ small enough relative to
/// $`\|\Phi^T\Phi\|_2`$ and a non-expansive proximal operator.
/// Neither is checked.
///
/// Calls never modify the configuration, so the same engine can be
/// called repeatedly, e.g. to [`warm_start`](ForwardBackward::warm_start).
#[derive(Clone)]
pub struct ForwardBackward<S, G, P = IdentityProjection<S>, C = Unset> {
    itermax: usize,
    sigma: S,
    mu: S,
    beta: S,
    convergence: C,
    phi_t_phi: P,
    g_proximal: G,
    target: Array1<S>,
}

impl<S, G> ForwardBackward<S, G>
where
    S: NdFloat,
{
    pub fn new(g_proximal: G, target: Array1<S>) -> Self
    where
        G: Fn(ArrayView1<S>, S) -> Array1<S>,
    {
        ForwardBackward {
            itermax: usize::MAX,
            sigma: S::one(),
            mu: S::one(),
            beta: S::from(1e-8).unwrap(),
            convergence: Unset,
            phi_t_phi: identity_projection,
            g_proximal,
            target,
        }
    }
}

impl<S, G, P, C> ForwardBackward<S, G, P, C>
where
    S: NdFloat,
{
    pub fn itermax(&self) -> usize {
        self.itermax
    }

    #[must_use]
    pub fn with_itermax(mut self, itermax: usize) -> Self {
        self.itermax = itermax;
        self
    }

    /// σ parameter (spread of the l2 norm)
    pub fn sigma(&self) -> S {
        self.sigma
    }

    #[must_use]
    pub fn with_sigma(mut self, sigma: S) -> Self {
        self.sigma = sigma;
        self
    }

    /// μ parameter (threshold multiplier)
    pub fn mu(&self) -> S {
        self.mu
    }

    #[must_use]
    pub fn with_mu(mut self, mu: S) -> Self {
        self.mu = mu;
        self
    }

    /// Gradient step size β
    pub fn beta(&self) -> S {
        self.beta
    }

    #[must_use]
    pub fn with_beta(mut self, beta: S) -> Self {
        self.beta = beta;
        self
    }

    pub fn target(&self) -> ArrayView1<S> {
        self.target.view()
    }

    #[must_use]
    pub fn with_target(mut self, target: Array1<S>) -> Self {
        self.target = target;
        self
    }

    pub fn convergence(&self) -> &C {
        &self.convergence
    }

    /// Sets a criterion on the current solution and residual
    pub fn with_convergence<F>(self, convergence: F) -> ForwardBackward<S, G, P, F>
    where
        F: Fn(ArrayView1<S>, ArrayView1<S>) -> bool,
    {
        self.replace_convergence(convergence)
    }

    /// Sets a criterion on the current solution only
    pub fn with_solution_convergence<F>(
        self,
        convergence: F,
    ) -> ForwardBackward<S, G, P, SolutionOnly<F>>
    where
        F: Fn(ArrayView1<S>) -> bool,
    {
        self.replace_convergence(SolutionOnly(convergence))
    }

    /// Drops the criterion, the engine then always runs `itermax` iterations
    pub fn without_convergence(self) -> ForwardBackward<S, G, P, Unset> {
        self.replace_convergence(Unset)
    }

    fn replace_convergence<C2>(self, convergence: C2) -> ForwardBackward<S, G, P, C2> {
        ForwardBackward {
            itermax: self.itermax,
            sigma: self.sigma,
            mu: self.mu,
            beta: self.beta,
            convergence,
            phi_t_phi: self.phi_t_phi,
            g_proximal: self.g_proximal,
            target: self.target,
        }
    }

    /// Projection of the measurement operator
    pub fn phi_t_phi(&self) -> &P {
        &self.phi_t_phi
    }

    pub fn with_phi_t_phi<P2>(self, phi_t_phi: P2) -> ForwardBackward<S, G, P2, C>
    where
        P2: Fn(ArrayView1<S>) -> Array1<S>,
    {
        ForwardBackward {
            itermax: self.itermax,
            sigma: self.sigma,
            mu: self.mu,
            beta: self.beta,
            convergence: self.convergence,
            phi_t_phi,
            g_proximal: self.g_proximal,
            target: self.target,
        }
    }

    /// Sets $`\Phi^T\Phi`$ from $`\Phi`$ and its adjoint
    ///
    /// The operator is moved into the engine. `phi.forward` must accept
    /// vectors of the target's length; a matrix with the wrong column
    /// count panics inside `dot` on the first call.
    pub fn with_phi<L>(
        self,
        phi: L,
    ) -> ForwardBackward<S, G, impl Fn(ArrayView1<S>) -> Array1<S>, C>
    where
        L: LinearTransform<S>,
    {
        self.with_phi_t_phi(projection::<S, _>(move |x| phi.adjoint(phi.forward(x).view())))
    }

    pub fn g_proximal(&self) -> &G {
        &self.g_proximal
    }

    pub fn with_g_proximal<G2>(self, g_proximal: G2) -> ForwardBackward<S, G2, P, C>
    where
        G2: Fn(ArrayView1<S>, S) -> Array1<S>,
    {
        ForwardBackward {
            itermax: self.itermax,
            sigma: self.sigma,
            mu: self.mu,
            beta: self.beta,
            convergence: self.convergence,
            phi_t_phi: self.phi_t_phi,
            g_proximal,
            target: self.target,
        }
    }

    /// Starting point derived from the current target
    pub fn initial_guess(&self) -> (Array1<S>, Array1<S>) {
        initial_guess(self.target.view())
    }
}

impl<S, G, P, C> ForwardBackward<S, G, P, C>
where
    S: NdFloat,
    G: Fn(ArrayView1<S>, S) -> Array1<S>,
    P: Fn(ArrayView1<S>) -> Array1<S>,
    C: Convergence<S>,
{
    /// False whenever no criterion is set
    pub fn is_converged(&self, x: ArrayView1<S>, residual: ArrayView1<S>) -> bool {
        self.convergence.is_set() && self.convergence.is_converged(x, residual)
    }

    /// Objective $`f(x) + (\|y - \Phi^T\Phi x\|_2 / \sigma)^2`$ for a given _f_
    ///
    /// Not used by the iterations, handy for monitoring.
    pub fn objective_function<'a, F>(&'a self, f: F) -> impl Fn(ArrayView1<S>) -> S + 'a
    where
        F: Fn(ArrayView1<S>) -> S + 'a,
    {
        move |x| {
            let z = (self.phi_t_phi)(x.view());
            let misfit = l2_norm((&self.target - &z).view()) / self.sigma;
            f(x) + misfit * misfit
        }
    }

    /// Runs from [`initial_guess`](ForwardBackward::initial_guess)
    pub fn solve(&self) -> Result<DiagnosticAndResult<S>> {
        let (x, residual) = self.initial_guess();
        self.solve_from(x.view(), residual.view())
    }

    pub fn solve_from(
        &self,
        x_guess: ArrayView1<S>,
        residual_guess: ArrayView1<S>,
    ) -> Result<DiagnosticAndResult<S>> {
        let mut x = Array1::zeros(0);
        let diagnostic = self.solve_into(&mut x, x_guess, residual_guess)?;
        Ok(DiagnosticAndResult { diagnostic, x })
    }

    /// Continues from the output of a previous call
    pub fn warm_start(&self, previous: &DiagnosticAndResult<S>) -> Result<DiagnosticAndResult<S>> {
        self.solve_from(previous.x.view(), previous.diagnostic.residual.view())
    }

    /// Runs from the initial guess, writing the solution into `out`
    pub fn solve_into_default(&self, out: &mut Array1<S>) -> Result<Diagnostic<S>> {
        let (x, residual) = self.initial_guess();
        self.solve_into(out, x.view(), residual.view())
    }

    /// Runs the iterations from $`(x_0, r_0)`$, writing the solution into `out`
    ///
    /// `out` is resized as needed. The residual guess is taken as is and
    /// should follow $`r_0 = \Phi^T\Phi x_0 - y`$ for the first step to be exact.
    pub fn solve_into(
        &self,
        out: &mut Array1<S>,
        x_guess: ArrayView1<S>,
        residual_guess: ArrayView1<S>,
    ) -> Result<Diagnostic<S>> {
        debug!("Performing Forward-Backward");
        self.sanity_check(x_guess, residual_guess)?;

        let mut residual = residual_guess.to_owned();
        *out = x_guess.to_owned();

        let mut niters = 0;
        let mut converged = false;
        while !converged && niters < self.itermax {
            trace!("    - [FB] Iteration {}/{}", niters, self.itermax);
            self.iteration_step(out, &mut residual);
            trace!("      - [FB] Sum of residuals: {}", l1_norm(residual.view()));
            niters += 1;
            converged = self.is_converged(out.view(), residual.view());
        }

        if converged {
            info!("    - [FB] converged in {} of {} iterations", niters, self.itermax);
        } else if self.convergence.is_set() {
            warn!("    - [FB] did not converge within {} iterations", self.itermax);
        }
        Ok(Diagnostic {
            niters,
            converged,
            residual,
        })
    }

    fn iteration_step(&self, x: &mut Array1<S>, residual: &mut Array1<S>) {
        let mut forward = x.to_owned();
        forward.scaled_add(-self.beta / self.sigma, &*residual);
        *x = (self.g_proximal)(forward.view(), self.mu * self.beta);
        *residual = (self.phi_t_phi)(x.view()) - &self.target;
    }

    fn sanity_check(&self, x_guess: ArrayView1<S>, residual_guess: ArrayView1<S>) -> Result<()> {
        let target_out = (self.phi_t_phi)(self.target.view());
        if target_out.len() != x_guess.len() {
            return Err(Error::OperatorSizeMismatch {
                operator: target_out.len(),
                guess: x_guess.len(),
            });
        }
        if self.target.len() != residual_guess.len() {
            return Err(Error::ResidualSizeMismatch {
                target: self.target.len(),
                residual: residual_guess.len(),
            });
        }
        if target_out.len() != self.target.len() {
            return Err(Error::ProjectionSizeMismatch {
                operator: target_out.len(),
                target: self.target.len(),
            });
        }
        if !self.convergence.is_set() {
            warn!(
                "No convergence function was provided: algorithm will run for {} steps",
                self.itermax
            );
        }
        Ok(())
    }
}
