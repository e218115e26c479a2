use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::DMatrix;
use num::complex::Complex;
use rand::Rng;

/// Field of the matrix elements.
/// # Purpose
/// Every Hamiltonian, sparse matrix and Krylov vector is generic over this
/// trait. It is implemented for `f64` and `Complex<f64>`, and carries the
/// per-type dense kernels the engine needs.
pub trait Scalar:
    Add<Output = Self> +
    AddAssign +
    SubAssign +
    MulAssign +
    Mul<Output = Self> +
    Mul<f64, Output = Self> +
    Div<Output = Self> +
    Div<f64, Output = Self> +
    Neg<Output = Self> +
    PartialEq +
    From<f64> +
    Copy +
    Sub<Output = Self> +
    Display +
    Debug +
    Send +
    Sync +
    Sized +
    'static
{
    fn zero() -> Self {
        <Self as From<f64>>::from(0.0)
    }
    fn conj(self) -> Self;
    fn re(self) -> f64;
    fn im(self) -> f64;
    fn nrmsq(&self) -> f64;
    fn abs(self) -> f64;
    /// Builds a value from its parts. The imaginary part is dropped by real
    /// scalars.
    fn from_re_im(re: f64, im: f64) -> Self;
    /// Uniform sample centered on zero, used for random starting vectors.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self;
    /// Eigen decomposition of a dense hermitian matrix stored column major.
    /// # Returns
    /// * __`eigenvalues`__ - In increasing order.
    /// * __`eigenvectors`__ - Column major, column $k$ is the eigenvector of
    /// the $k$-th eigenvalue.
    fn hermitian_eigen(n: usize, a: &[Self]) -> (Vec<f64>, Vec<Self>);
}

fn ascending_order(vals: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vals.len()).collect();
    order.sort_by(|&a, &b| vals[a].total_cmp(&vals[b]));
    order
}

impl Scalar for f64 {
    fn conj(self) -> Self {
        self
    }

    fn re(self) -> f64 {
        self
    }

    fn im(self) -> f64 {
        0.0
    }

    fn nrmsq(&self) -> f64 {
        *self * *self
    }

    fn abs(self) -> f64 {
        <f64>::abs(self)
    }

    fn from_re_im(re: f64, _im: f64) -> Self {
        re
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen::<f64>() - 0.5
    }

    fn hermitian_eigen(n: usize, a: &[Self]) -> (Vec<f64>, Vec<Self>) {
        let eig = DMatrix::<f64>::from_column_slice(n, n, a).symmetric_eigen();
        let vals: Vec<f64> = eig.eigenvalues.iter().copied().collect();
        let order = ascending_order(&vals);
        let mut vecs = Vec::with_capacity(n * n);
        for &k in order.iter() {
            vecs.extend(eig.eigenvectors.column(k).iter().copied());
        }
        (order.iter().map(|&k| vals[k]).collect(), vecs)
    }
}

impl Scalar for Complex<f64> {
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    fn re(self) -> f64 {
        self.re
    }

    fn im(self) -> f64 {
        self.im
    }

    fn nrmsq(&self) -> f64 {
        self.norm_sqr()
    }

    fn abs(self) -> f64 {
        self.norm()
    }

    fn from_re_im(re: f64, im: f64) -> Self {
        Complex::new(re, im)
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Complex::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
    }

    fn hermitian_eigen(n: usize, a: &[Self]) -> (Vec<f64>, Vec<Self>) {
        let eig = DMatrix::<Complex<f64>>::from_column_slice(n, n, a).symmetric_eigen();
        let vals: Vec<f64> = eig.eigenvalues.iter().copied().collect();
        let order = ascending_order(&vals);
        let mut vecs = Vec::with_capacity(n * n);
        for &k in order.iter() {
            vecs.extend(eig.eigenvectors.column(k).iter().copied());
        }
        (order.iter().map(|&k| vals[k]).collect(), vecs)
    }
}

/// Scalar product $\langle x\vert y\rangle=\sum_i x_i^*y_i$.
pub fn dot<S: Scalar>(x: &[S], y: &[S]) -> S {
    x.iter().zip(y.iter()).fold(S::zero(), |acc, (a, b)| acc + a.conj() * *b)
}

/// Euclidean norm.
pub fn norm<S: Scalar>(x: &[S]) -> f64 {
    x.iter().map(|v| v.nrmsq()).sum::<f64>().sqrt()
}

/// $y\leftarrow y+\alpha x$
pub fn axpy<S: Scalar>(alpha: S, x: &[S], y: &mut [S]) {
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * *xi;
    }
}

/// $x\leftarrow \alpha x$
pub fn scale<S: Scalar>(alpha: f64, x: &mut [S]) {
    for xi in x.iter_mut() {
        *xi = *xi * alpha;
    }
}
