use log::{debug, trace};
use std::collections::HashMap;

use crate::basis::{HilbertBasis, SplitKey};
use crate::errors::{LanczosError, Result};
use crate::scalar::Scalar;

/// Below this eigenvalue a Schmidt weight does not enter the entropy.
pub const ENTROPY_CUTOFF: f64 = 1e-14;

/// Reduced density matrix of the left part of a bipartition.
/// # Fields
/// * __`keys`__ - Left states, in increasing order of their key.
/// * __`matrix`__ - $\rho_L$, column major.
/// * __`eigenvalues`__ - Spectrum of $\rho_L$, increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedDensityMatrix<S> {
    pub keys: Vec<SplitKey>,
    pub matrix: Vec<S>,
    pub eigenvalues: Vec<f64>,
}

impl<S: Scalar> ReducedDensityMatrix<S> {
    /// Cuts `psi` between sites `split - 1` and `split`.
    /// # Definition
    /// $$
    /// \rho_L(a,a')=\sum_b\psi(a,b)\psi^*(a',b)
    /// $$
    /// with $a$ the states of sites $[0,\text{split})$ and $b$ the rest. The
    /// reordering sign of the basis is folded into $\psi(a,b)$.
    /// # Errors
    /// `split` beyond the lattice or `psi` of the wrong size.
    pub fn new<B: HilbertBasis>(basis: &B, psi: &[S], split: usize) -> Result<Self> {
        if split > basis.sites() {
            return Err(LanczosError::invalid(format!(
                "Cannot split {} sites at site {}.",
                basis.sites(),
                split
            )));
        }
        if psi.len() != basis.size() {
            return Err(LanczosError::invalid(format!(
                "Vector of size {} in a basis of size {}.",
                psi.len(),
                basis.size()
            )));
        }

        let mut pieces: Vec<(SplitKey, SplitKey, S)> = Vec::with_capacity(basis.size());
        for (ispace, &amp) in psi.iter().enumerate() {
            let (left, right, sign) = basis.split(ispace, split);
            pieces.push((left, right, amp * sign));
        }
        let mut keys: Vec<SplitKey> = pieces.iter().map(|p| p.0).collect();
        keys.sort_unstable();
        keys.dedup();
        let index: HashMap<SplitKey, usize> = keys.iter().enumerate().map(|(k, &key)| (key, k)).collect();

        let mut by_right: HashMap<SplitKey, Vec<(usize, S)>> = HashMap::new();
        for (left, right, amp) in pieces.into_iter() {
            by_right.entry(right).or_default().push((index[&left], amp));
        }
        let n = keys.len();
        debug!("Reduced density matrix of size {} from {} right states", n, by_right.len());

        let mut matrix = vec![S::zero(); n * n];
        for column in by_right.values() {
            for &(a, pa) in column.iter() {
                for &(ap, pap) in column.iter() {
                    matrix[a + ap * n] += pa * pap.conj();
                }
            }
        }
        let (eigenvalues, _) = S::hermitian_eigen(n, &matrix);
        trace!("Density matrix spectrum {:?}", eigenvalues);
        Ok(ReducedDensityMatrix { keys, matrix, eigenvalues })
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// $-\text{Tr}\,\rho_L\ln\rho_L$
    pub fn entanglement_entropy(&self) -> f64 {
        self.eigenvalues
            .iter()
            .filter(|&&l| l > ENTROPY_CUTOFF)
            .map(|&l| -l * l.ln())
            .sum()
    }
}
