use log::{debug, trace};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::basis::HilbertBasis;
use crate::bit_basis::BasisTables;
use crate::errors::{LanczosError, Result};
use crate::geometry::Geometry;
use crate::params::ModelParams;
use crate::scalar::Scalar;
use crate::spin_basis::SpinBasis;
use crate::sparse::SparseRow;

use super::{check_geometry, ModelHamiltonian, TERM_EXTENDED, TERM_HOPPINGS};

/// Spin one half Heisenberg model.
/// # Definition
/// $$
/// H=\sum_{i\neq j}\frac12J^\pm_{ij}S^+_iS^-_j+\sum_{i<j}J^{zz}_{ij}S^z_iS^z_j
/// +\sum_ih_iS^z_i
/// $$
/// with $J^\pm$ the first geometry term and $J^{zz}$ the second.
pub struct Heisenberg<'a, S, G> {
    geometry: &'a G,
    magnetic_field: Vec<f64>,
    basis: SpinBasis,
    _scalar: PhantomData<S>,
}

impl<'a, S: Scalar, G: Geometry<S>> Heisenberg<'a, S, G> {
    /// # Arguments
    /// * __`params`__ - `twice_the_spin` must be 1, `target.up` is the number
    /// of up spins and `magnetic_field` holds one value per site or nothing.
    /// * __`geometry`__ - Two terms, $J^\pm$ then $J^{zz}$.
    /// * __`tables`__ - Shared basis lookup tables.
    pub fn new(params: &ModelParams, geometry: &'a G, tables: Arc<BasisTables>) -> Result<Self> {
        if params.twice_the_spin != 1 {
            return Err(LanczosError::invalid(format!(
                "Heisenberg supports spin 1/2 only, got TwiceTheSpin = {}.",
                params.twice_the_spin
            )));
        }
        if params.orbitals != 1 {
            return Err(LanczosError::invalid("Heisenberg has one orbital."));
        }
        if params.target.up + params.target.down != params.sites {
            return Err(LanczosError::invalid(format!(
                "Heisenberg sector {} does not cover {} sites.",
                params.target, params.sites
            )));
        }
        check_geometry("Heisenberg", geometry, params, 2)?;
        let magnetic_field = ModelParams::sized("magneticField", &params.magnetic_field, params.sites)?;
        let basis = SpinBasis::new(params.sites, params.target.up, tables)?;
        debug!("Heisenberg on {} sites, sector {}, size {}", params.sites, params.target, basis.size());
        Ok(Heisenberg { geometry, magnetic_field, basis, _scalar: PhantomData })
    }

    fn jpm(&self, i: usize, j: usize) -> S {
        self.geometry.coefficient(i, 0, j, 0, TERM_HOPPINGS)
    }

    fn jzz(&self, i: usize, j: usize) -> S {
        self.geometry.coefficient(i, 0, j, 0, TERM_EXTENDED)
    }
}

impl<'a, S: Scalar, G: Geometry<S>> ModelHamiltonian<S> for Heisenberg<'a, S, G> {
    type Basis = SpinBasis;

    fn name(&self) -> &str {
        "Heisenberg"
    }

    fn basis(&self) -> &SpinBasis {
        &self.basis
    }

    fn fill_row(&self, basis: &SpinBasis, ispace: usize, row: &mut SparseRow<S>) {
        let ket = basis.state(ispace);
        let nsites = basis.sites();

        let mut s = S::zero();
        for i in 0..nsites {
            let szi = basis.sz(ket, i);
            s += S::from(self.magnetic_field[i] * szi);
            for j in (i + 1)..nsites {
                s += self.jzz(i, j) * (szi * basis.sz(ket, j));
            }
        }
        debug_assert!(s.im().abs() < 1e-12);
        row.add(ispace, S::from(s.re()));

        // S+_i S-_j, site i down and site j up.
        for i in 0..nsites {
            if basis.is_up(ket, i) {
                continue;
            }
            for j in 0..nsites {
                if j == i || !basis.is_up(ket, j) {
                    continue;
                }
                let value = self.jpm(i, j);
                if value == S::zero() {
                    continue;
                }
                let bra = ket ^ basis.bitmask(i) ^ basis.bitmask(j);
                if let Some(col) = basis.perfect_index(bra) {
                    trace!("Flip {} <-> {}: row {} col {}", i, j, ispace, col);
                    row.add(col, (value * 0.5).conj());
                }
            }
        }
    }
}
