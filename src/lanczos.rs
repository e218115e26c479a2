use log::{debug, info, trace, warn};
use rand_mt::Mt64;
use std::marker::PhantomData;

use crate::basis::HilbertBasis;
use crate::errors::{LanczosError, Result};
use crate::models::ModelHamiltonian;
use crate::scalar::{axpy, dot, norm, scale, Scalar};
use crate::sparse::CrsMatrix;

/// Below this relative norm the Krylov space is exhausted.
pub const BREAKDOWN: f64 = 1e-12;

/// Anything the solver can multiply a vector with.
pub trait MatrixVectorProduct<S>: Sync {
    fn rows(&self) -> usize;
    /// $x\leftarrow x+Hy$
    fn matrix_vector_product(&self, x: &mut [S], y: &[S]);
}

/// Product through an assembled sparse matrix.
pub struct InternalProductStored<S> {
    matrix: CrsMatrix<S>,
}

impl<S: Scalar> InternalProductStored<S> {
    /// Assembles the Hamiltonian of `model` in `basis`.
    pub fn new<M: ModelHamiltonian<S>>(model: &M, basis: &M::Basis) -> Self {
        InternalProductStored { matrix: model.setup_hamiltonian(basis) }
    }

    pub fn matrix(&self) -> &CrsMatrix<S> {
        &self.matrix
    }
}

impl<S: Scalar> MatrixVectorProduct<S> for InternalProductStored<S> {
    fn rows(&self) -> usize {
        self.matrix.rows()
    }

    fn matrix_vector_product(&self, x: &mut [S], y: &[S]) {
        self.matrix.matrix_vector_product(x, y)
    }
}

/// Product regenerating the rows of the Hamiltonian at every call.
pub struct InternalProductOnTheFly<'m, S: Scalar, M: ModelHamiltonian<S>> {
    model: &'m M,
    basis: &'m M::Basis,
    _scalar: PhantomData<S>,
}

impl<'m, S: Scalar, M: ModelHamiltonian<S>> InternalProductOnTheFly<'m, S, M> {
    pub fn new(model: &'m M, basis: &'m M::Basis) -> Self {
        InternalProductOnTheFly { model, basis, _scalar: PhantomData }
    }
}

impl<'m, S: Scalar, M: ModelHamiltonian<S>> MatrixVectorProduct<S> for InternalProductOnTheFly<'m, S, M> {
    fn rows(&self) -> usize {
        self.basis.size()
    }

    fn matrix_vector_product(&self, x: &mut [S], y: &[S]) {
        self.model.matrix_vector_product(x, y, self.basis)
    }
}

/// How the Hamiltonian is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Stored,
    OnTheFly,
}

/// Lanczos parameters
/// # Fields
/// * __`steps`__ - Maximum size of the Krylov space.
/// * __`eps`__ - Convergence threshold on the change of the lowest Ritz
/// value between two steps.
/// * __`seed`__ - Seed of the random starting vector.
/// * __`product`__ - Stored matrix or on the fly product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanczosParams {
    pub steps: usize,
    pub eps: f64,
    pub seed: u64,
    pub product: ProductKind,
}

impl Default for LanczosParams {
    fn default() -> Self {
        LanczosParams { steps: 200, eps: 1e-12, seed: 343, product: ProductKind::Stored }
    }
}

/// Symmetric tridiagonal matrix of the Lanczos recurrence.
/// # Definition
/// `a[k]` is the diagonal, `b[k]` couples $k$ and $k+1$, so that
/// `b.len() == a.len() - 1` once the recurrence stops.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TridiagonalMatrix {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl TridiagonalMatrix {
    pub fn size(&self) -> usize {
        self.a.len()
    }

    /// Number of eigenvalues strictly below `x`, from the Sturm sequence.
    fn count_below(&self, x: f64) -> usize {
        let mut count = 0;
        let mut q = 1.0;
        for k in 0..self.a.len() {
            let off = if k == 0 { 0.0 } else { self.b[k - 1] * self.b[k - 1] };
            q = self.a[k] - x - if k == 0 { 0.0 } else { off / q };
            if q == 0.0 {
                q = f64::EPSILON * (self.a[k].abs() + 1.0);
            }
            if q < 0.0 {
                count += 1;
            }
        }
        count
    }

    /// Lowest eigenvalue by bisection inside the Gershgorin interval.
    pub fn lowest_eigenvalue(&self) -> f64 {
        let n = self.a.len();
        if n == 0 {
            return 0.0;
        }
        let mut lo = f64::MAX;
        let mut hi = f64::MIN;
        for k in 0..n {
            let left = if k > 0 { self.b[k - 1].abs() } else { 0.0 };
            let right = if k + 1 < n { self.b[k].abs() } else { 0.0 };
            lo = lo.min(self.a[k] - left - right);
            hi = hi.max(self.a[k] + left + right);
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            if self.count_below(mid) >= 1 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// Every eigenvalue and eigenvector, increasing order, column major.
    pub fn eigen(&self) -> (Vec<f64>, Vec<f64>) {
        let n = self.a.len();
        let mut dense = vec![0.0; n * n];
        for k in 0..n {
            dense[k + k * n] = self.a[k];
            if k + 1 < n {
                dense[k + (k + 1) * n] = self.b[k];
                dense[(k + 1) + k * n] = self.b[k];
            }
        }
        <f64 as Scalar>::hermitian_eigen(n, &dense)
    }
}

/// Ground state of a sector.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundState<S> {
    pub energy: f64,
    pub vector: Vec<S>,
    pub steps: usize,
}

/// Lanczos solver.
/// # Definition
/// Starting from a normalized $\vert v_0\rangle$, the recurrence
///
/// $$
/// \beta_{k+1}\vert v_{k+1}\rangle=H\vert v_k\rangle-\alpha_k\vert v_k\rangle-\beta_k\vert v_{k-1}\rangle,
/// \quad \alpha_k=\langle v_k\vert H\vert v_k\rangle
/// $$
///
/// builds the tridiagonal representation of $H$ in the Krylov space. Only
/// three vectors are kept in memory, the ground state is rebuilt with a
/// second pass of the same recurrence.
pub struct LanczosSolver<'p, S, P> {
    product: &'p P,
    params: LanczosParams,
    _scalar: PhantomData<S>,
}

impl<'p, S: Scalar, P: MatrixVectorProduct<S>> LanczosSolver<'p, S, P> {
    pub fn new(product: &'p P, params: LanczosParams) -> Self {
        LanczosSolver { product, params, _scalar: PhantomData }
    }

    /// Random vector from the Mersenne twister seeded with `params.seed`.
    pub fn random_vector(&self) -> Vec<S> {
        let mut rng = Mt64::new(self.params.seed);
        (0..self.product.rows()).map(|_| S::sample(&mut rng)).collect()
    }

    /// Runs the recurrence from `initial`, which does not need to be
    /// normalized.
    /// # Returns
    /// The tridiagonal matrix, empty when `initial` vanishes.
    pub fn decomposition(&self, initial: &[S]) -> TridiagonalMatrix {
        self.recurrence(initial, None).0
    }

    /// $\sum_kc_k\vert v_k\rangle$ over the Krylov vectors of `initial`.
    fn krylov_combination(&self, initial: &[S], coefficients: &[f64]) -> Vec<S> {
        self.recurrence(initial, Some(coefficients)).1
    }

    fn recurrence(&self, initial: &[S], coefficients: Option<&[f64]>) -> (TridiagonalMatrix, Vec<S>) {
        let n = self.product.rows();
        let mut tri = TridiagonalMatrix::default();
        let mut out = vec![S::zero(); if coefficients.is_some() { n } else { 0 }];
        let nrm = norm(initial);
        if nrm < BREAKDOWN || n == 0 {
            return (tri, out);
        }
        let max_steps = match coefficients {
            Some(c) => c.len(),
            None => self.params.steps.min(n).max(1),
        };

        let mut v_prev = vec![S::zero(); n];
        let mut v = initial.to_vec();
        scale(1.0 / nrm, &mut v);
        let mut w = vec![S::zero(); n];
        let mut beta_prev = 0.0;
        let mut e_old = f64::MAX;

        for k in 0..max_steps {
            if let Some(c) = coefficients {
                axpy(S::from(c[k]), &v, &mut out);
            }
            w.iter_mut().for_each(|x| *x = S::zero());
            self.product.matrix_vector_product(&mut w, &v);
            let alpha = dot(&v, &w).re();
            axpy(S::from(-alpha), &v, &mut w);
            axpy(S::from(-beta_prev), &v_prev, &mut w);
            let beta = norm(&w);
            tri.a.push(alpha);
            trace!("Lanczos step {}: alpha = {}, beta = {}", k, alpha, beta);

            if coefficients.is_none() {
                let e = tri.lowest_eigenvalue();
                if (e - e_old).abs() < self.params.eps {
                    debug!("Lanczos converged after {} steps, lowest = {}", k + 1, e);
                    break;
                }
                e_old = e;
            }
            if beta < BREAKDOWN * alpha.abs().max(1.0) {
                debug!("Lanczos invariant subspace after {} steps", k + 1);
                break;
            }
            if k + 1 == max_steps {
                if coefficients.is_none() && max_steps < n {
                    warn!("Lanczos reached {} steps without converging.", max_steps);
                }
                break;
            }
            tri.b.push(beta);
            std::mem::swap(&mut v_prev, &mut v);
            // v_prev now holds v_k, v receives v_{k+1}.
            v.copy_from_slice(&w);
            scale(1.0 / beta, &mut v);
            beta_prev = beta;
        }
        (tri, out)
    }

    /// Lowest eigenvalue and normalized eigenvector.
    /// # Errors
    /// Empty sector.
    pub fn ground_state(&self) -> Result<GroundState<S>> {
        if self.product.rows() == 0 {
            return Err(LanczosError::invalid("Ground state of an empty sector."));
        }
        let initial = self.random_vector();
        let tri = self.decomposition(&initial);
        let (vals, vecs) = tri.eigen();
        let m = tri.size();
        let energy = vals[0];
        let mut vector = self.krylov_combination(&initial, &vecs[0..m]);
        let nrm = norm(&vector);
        scale(1.0 / nrm, &mut vector);
        info!("Ground state energy {} after {} Lanczos steps.", energy, m);
        Ok(GroundState { energy, vector, steps: m })
    }
}

/// Tridiagonal decomposition of `model` in `basis` starting from `initial`,
/// with the product selected by `params`.
pub fn tridiagonalize<S: Scalar, M: ModelHamiltonian<S>>(
    model: &M,
    basis: &M::Basis,
    params: &LanczosParams,
    initial: &[S],
) -> TridiagonalMatrix {
    match params.product {
        ProductKind::Stored => {
            let product = InternalProductStored::new(model, basis);
            LanczosSolver::new(&product, *params).decomposition(initial)
        }
        ProductKind::OnTheFly => {
            let product = InternalProductOnTheFly::new(model, basis);
            LanczosSolver::new(&product, *params).decomposition(initial)
        }
    }
}

/// Ground state of `model` in its target sector.
pub fn ground_state<S: Scalar, M: ModelHamiltonian<S>>(model: &M, params: &LanczosParams) -> Result<GroundState<S>> {
    match params.product {
        ProductKind::Stored => {
            let product = InternalProductStored::new(model, model.basis());
            LanczosSolver::new(&product, *params).ground_state()
        }
        ProductKind::OnTheFly => {
            let product = InternalProductOnTheFly::new(model, model.basis());
            LanczosSolver::new(&product, *params).ground_state()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert::close;

    fn diagonal_matrix(d: &[f64]) -> InternalProductStored<f64> {
        let mut m = CrsMatrix::new(d.len(), d.len());
        for (k, &v) in d.iter().enumerate() {
            m.push_row(&[(k, v)]);
        }
        InternalProductStored { matrix: m }
    }

    #[test]
    fn sturm_bisection_matches_dense() {
        let tri = TridiagonalMatrix { a: vec![1.0, -2.0, 0.5, 3.0], b: vec![0.3, 1.1, -0.7] };
        let (vals, _) = tri.eigen();
        close(tri.lowest_eigenvalue(), vals[0], 1e-12);
    }

    #[test]
    fn diagonal_ground_state() {
        let p = diagonal_matrix(&[3.0, -1.0, 2.0, 0.5, 7.0]);
        let solver = LanczosSolver::new(&p, LanczosParams::default());
        let gs = solver.ground_state().unwrap();
        close(gs.energy, -1.0, 1e-10);
        close(gs.vector[1].abs(), 1.0, 1e-8);
        close(norm(&gs.vector), 1.0, 1e-12);
    }

    #[test]
    fn zero_start_gives_nothing() {
        let p = diagonal_matrix(&[1.0, 2.0]);
        let solver = LanczosSolver::new(&p, LanczosParams::default());
        assert_eq!(solver.decomposition(&[0.0, 0.0]).size(), 0);
    }

    #[test]
    fn eigenvector_start_stops_at_once() {
        let p = diagonal_matrix(&[1.0, 2.0, 3.0]);
        let solver = LanczosSolver::new(&p, LanczosParams::default());
        let tri = solver.decomposition(&[0.0, 2.0, 0.0]);
        assert_eq!(tri.a, vec![2.0]);
        assert!(tri.b.is_empty());
    }
}
