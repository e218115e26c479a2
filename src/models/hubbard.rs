use log::{debug, trace};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::basis::HilbertBasis;
use crate::bit_basis::BasisTables;
use crate::errors::{LanczosError, Result};
use crate::fermion_basis::FermionBasis;
use crate::geometry::Geometry;
use crate::params::ModelParams;
use crate::scalar::Scalar;
use crate::sparse::SparseRow;
use crate::{Spin, Word, FERMION_SIGN};

use super::{check_geometry, ModelHamiltonian, HUBBARD_OPERATORS, TERM_EXTENDED, TERM_HOPPINGS};

/// One band Hubbard model.
/// # Definition
/// $$
/// H=\sum_{i<j,\sigma}\left(t_{ij}c^\dagger_{i\sigma}c_{j\sigma}+\text{h.c.}\right)
/// +\sum_iU_in_{i\uparrow}n_{i\downarrow}+\sum_iV_in_i
/// +\sum_{i<j}W_{ij}n_in_j
/// $$
/// with $t_{ij}$ the hopping term of the geometry and $W_{ij}$ its second
/// term, present only for the extended model.
pub struct HubbardOneOrbital<'a, S, G> {
    geometry: &'a G,
    hubbard_u: Vec<f64>,
    potential_v: Vec<f64>,
    extended: bool,
    basis: FermionBasis,
    _scalar: PhantomData<S>,
}

impl<'a, S: Scalar, G: Geometry<S>> HubbardOneOrbital<'a, S, G> {
    /// # Arguments
    /// * __`params`__ - `hubbard_u` and `potential_v` hold one value per site.
    /// * __`geometry`__ - One term, two for the extended model.
    /// * __`extended`__ - Adds the density-density term.
    /// * __`tables`__ - Shared basis lookup tables.
    pub fn new(params: &ModelParams, geometry: &'a G, extended: bool, tables: Arc<BasisTables>) -> Result<Self> {
        let name = if extended { "HubbardOneBandExtended" } else { "HubbardOneBand" };
        if params.orbitals != 1 {
            return Err(LanczosError::invalid(format!("{} has one orbital, got {}.", name, params.orbitals)));
        }
        check_geometry(name, geometry, params, if extended { 2 } else { 1 })?;
        let hubbard_u = ModelParams::sized("hubbardU", &params.hubbard_u, params.sites)?;
        let potential_v = ModelParams::sized("potentialV", &params.potential_v, params.sites)?;
        let basis = FermionBasis::new(params.sites, 1, params.target, HUBBARD_OPERATORS, tables)?;
        debug!("{} on {} sites, sector {}, size {}", name, params.sites, params.target, basis.size());
        Ok(HubbardOneOrbital {
            geometry,
            hubbard_u,
            potential_v,
            extended,
            basis,
            _scalar: PhantomData,
        })
    }

    fn hopping(&self, i: usize, j: usize) -> S {
        self.geometry.coefficient(i, 0, j, 0, TERM_HOPPINGS)
    }

    fn diagonal(&self, basis: &FermionBasis, up: Word, down: Word) -> f64 {
        let nsites = basis.sites();
        let mut s = 0.0;
        for i in 0..nsites {
            let nu = basis.get_n(up, down, i, Spin::Up, 0) as f64;
            let nd = basis.get_n(up, down, i, Spin::Down, 0) as f64;
            s += self.hubbard_u[i] * nu * nd + self.potential_v[i] * (nu + nd);
            if self.extended {
                for j in (i + 1)..nsites {
                    let w = self.geometry.coefficient(i, 0, j, 0, TERM_EXTENDED).re();
                    if w == 0.0 {
                        continue;
                    }
                    let nj = (basis.get_n(up, down, j, Spin::Up, 0) + basis.get_n(up, down, j, Spin::Down, 0)) as f64;
                    s += w * (nu + nd) * nj;
                }
            }
        }
        s
    }
}

impl<'a, S: Scalar, G: Geometry<S>> ModelHamiltonian<S> for HubbardOneOrbital<'a, S, G> {
    type Basis = FermionBasis;

    fn name(&self) -> &str {
        if self.extended {
            "HubbardOneBandExtended"
        } else {
            "HubbardOneBand"
        }
    }

    fn basis(&self) -> &FermionBasis {
        &self.basis
    }

    fn fill_row(&self, basis: &FermionBasis, ispace: usize, row: &mut SparseRow<S>) {
        let (up, down) = basis.states(ispace);
        let nsites = basis.sites();
        row.add(ispace, S::from(self.diagonal(basis, up, down)));

        for i in 0..nsites {
            for j in (i + 1)..nsites {
                let h = self.hopping(i, j);
                if h == S::zero() {
                    continue;
                }
                let mask = basis.up().bitmask(i, 0) | basis.up().bitmask(j, 0);
                for spin in [Spin::Up, Spin::Down] {
                    let ni = basis.is_there_an_electron_at(up, down, i, spin, 0);
                    let nj = basis.is_there_an_electron_at(up, down, j, spin, 0);
                    if ni == nj {
                        continue;
                    }
                    let (bu, bd) = match spin {
                        Spin::Up => (up ^ mask, down),
                        Spin::Down => (up, down ^ mask),
                    };
                    let col = match basis.perfect_index(bu, bd) {
                        Some(c) => c,
                        None => continue,
                    };
                    let extra = if ni { FERMION_SIGN } else { 1.0 };
                    let sign = extra * basis.do_sign(up, down, i, 0, j, 0, spin);
                    let value = if ni { h } else { h.conj() };
                    trace!("Hop {} <-> {} spin {}: row {} col {} value {}", i, j, spin, ispace, col, value * sign);
                    row.add(col, value * sign);
                }
            }
        }
    }
}
