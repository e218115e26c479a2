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

use super::{check_geometry, ModelHamiltonian, FEAS_OPERATORS, TERM_EXTENDED, TERM_HOPPINGS};

/// Multi-orbital Hubbard model of the iron pnictides.
/// # Definition
/// With $a,b$ orbitals and $n_{ia}=n_{ia\uparrow}+n_{ia\downarrow}$,
///
/// $$
/// \begin{aligned}
/// H=&-\sum_{ia,jb,\sigma}t^{ab}_{ij}c^\dagger_{ia\sigma}c_{jb\sigma}
/// +U_0\sum_{ia}n_{ia\uparrow}n_{ia\downarrow}
/// +U_1\sum_{i,a<b}n_{ia}n_{ib}
/// +U_2\sum_{i,a<b}\left(S^z_{ia}S^z_{ib}+\tfrac12(S^+_{ia}S^-_{ib}+S^-_{ia}S^+_{ib})\right)\\\\
/// &+U_3\sum_{i,a\neq b}c^\dagger_{ia\uparrow}c^\dagger_{ia\downarrow}c_{ib\downarrow}c_{ib\uparrow}
/// +\sum_{ia\sigma}V_{ia\sigma}n_{ia\sigma}
/// +\sum_{i\neq j,ab}J_{ij}\,\mathbf S_{ia}\cdot\mathbf S_{jb}
/// \end{aligned}
/// $$
///
/// The $J_{ij}$ term is read from the second geometry term and only exists
/// for the extended model.
pub struct FeAsBasedSc<'a, S, G> {
    geometry: &'a G,
    orbitals: usize,
    hubbard_u: [f64; 4],
    potential_v: Vec<f64>,
    extended: bool,
    basis: FermionBasis,
    _scalar: PhantomData<S>,
}

impl<'a, S: Scalar, G: Geometry<S>> FeAsBasedSc<'a, S, G> {
    /// # Arguments
    /// * __`params`__ - `hubbard_u` holds $U_0..U_3$, `potential_v` holds
    /// $2n_{\text{orb}}N_s$ values.
    /// * __`geometry`__ - Hoppings, plus $J_{ij}$ for the extended model.
    /// * __`extended`__ - Adds the $J_{ij}$ exchange.
    /// * __`tables`__ - Shared basis lookup tables.
    pub fn new(params: &ModelParams, geometry: &'a G, extended: bool, tables: Arc<BasisTables>) -> Result<Self> {
        let name = if extended { "FeAsBasedScExtended" } else { "FeAsBasedSc" };
        check_geometry(name, geometry, params, if extended { 2 } else { 1 })?;
        if params.hubbard_u.len() != 4 {
            return Err(LanczosError::invalid(format!(
                "{} needs 4 values in hubbardU, got {}.",
                name,
                params.hubbard_u.len()
            )));
        }
        let hubbard_u = [params.hubbard_u[0], params.hubbard_u[1], params.hubbard_u[2], params.hubbard_u[3]];
        let potential_v = ModelParams::sized("potentialV", &params.potential_v, 2 * params.orbitals * params.sites)?;
        let basis = FermionBasis::new(params.sites, params.orbitals, params.target, FEAS_OPERATORS, tables)?;
        debug!(
            "{} on {} sites x {} orbitals, sector {}, size {}",
            name,
            params.sites,
            params.orbitals,
            params.target,
            basis.size()
        );
        Ok(FeAsBasedSc {
            geometry,
            orbitals: params.orbitals,
            hubbard_u,
            potential_v,
            extended,
            basis,
            _scalar: PhantomData,
        })
    }

    fn hoppings(&self, i: usize, orb1: usize, j: usize, orb2: usize) -> S {
        -self.geometry.coefficient(i, orb1, j, orb2, TERM_HOPPINGS)
    }

    fn j_coupling(&self, i: usize, j: usize) -> f64 {
        if !self.extended {
            return 0.0;
        }
        self.geometry.coefficient(i, 0, j, 0, TERM_EXTENDED).re()
    }

    fn nix(&self, basis: &FermionBasis, up: Word, down: Word, i: usize, orb: usize) -> f64 {
        (basis.get_n(up, down, i, Spin::Up, orb) + basis.get_n(up, down, i, Spin::Down, orb)) as f64
    }

    fn sz_term(&self, basis: &FermionBasis, up: Word, down: Word, i: usize, orb: usize) -> f64 {
        let nu = basis.get_n(up, down, i, Spin::Up, orb) as f64;
        let nd = basis.get_n(up, down, i, Spin::Down, orb) as f64;
        0.5 * (nu - nd)
    }

    fn diagonal(&self, basis: &FermionBasis, up: Word, down: Word) -> f64 {
        let nsites = basis.sites();
        let o = self.orbitals;
        let mut s = 0.0;
        for i in 0..nsites {
            for orb in 0..o {
                s += self.hubbard_u[0]
                    * (basis.get_n(up, down, i, Spin::Up, orb) * basis.get_n(up, down, i, Spin::Down, orb)) as f64;

                for orb2 in (orb + 1)..o {
                    s += self.hubbard_u[1] * self.nix(basis, up, down, i, orb) * self.nix(basis, up, down, i, orb2);
                    s += self.hubbard_u[2]
                        * self.sz_term(basis, up, down, i, orb)
                        * self.sz_term(basis, up, down, i, orb2);
                }

                // Ordered pairs, each bond counted twice.
                for j in 0..nsites {
                    let value = self.j_coupling(i, j);
                    if value == 0.0 {
                        continue;
                    }
                    for orb2 in 0..o {
                        s += value
                            * 0.5
                            * self.sz_term(basis, up, down, i, orb)
                            * self.sz_term(basis, up, down, j, orb2);
                    }
                }

                s += self.potential_v[i + orb * nsites] * basis.get_n(up, down, i, Spin::Up, orb) as f64
                    + self.potential_v[i + (orb + o) * nsites] * basis.get_n(up, down, i, Spin::Down, orb) as f64;
            }
        }
        s
    }

    fn set_hopping_term(&self, basis: &FermionBasis, ispace: usize, up: Word, down: Word, i: usize, orb: usize, row: &mut SparseRow<S>) {
        let nsites = basis.sites();
        let mi = basis.up().bitmask(i, orb);
        for j in i..nsites {
            for orb2 in 0..self.orbitals {
                // On-site pairs once.
                if j == i && orb2 <= orb {
                    continue;
                }
                let h = self.hoppings(i, orb, j, orb2);
                if h == S::zero() {
                    continue;
                }
                let mask = mi | basis.up().bitmask(j, orb2);
                for spin in [Spin::Up, Spin::Down] {
                    let ni = basis.is_there_an_electron_at(up, down, i, spin, orb);
                    let nj = basis.is_there_an_electron_at(up, down, j, spin, orb2);
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
                    let sign = extra * basis.do_sign(up, down, i, orb, j, orb2, spin);
                    let value = if ni { h } else { h.conj() };
                    trace!("Hop row {} col {} value {}", ispace, col, value * sign);
                    row.add(col, value * sign);
                }
            }
        }
    }

    /// Adds $S^+_{ia}S^-_{jb}$ with the given value when it does not vanish.
    fn set_splus_sminus(
        &self,
        basis: &FermionBasis,
        up: Word,
        down: Word,
        (i, orb1): (usize, usize),
        (j, orb2): (usize, usize),
        value: f64,
        row: &mut SparseRow<S>,
    ) {
        if !basis.is_there_an_electron_at(up, down, j, Spin::Up, orb2)
            || basis.is_there_an_electron_at(up, down, i, Spin::Up, orb1)
            || !basis.is_there_an_electron_at(up, down, i, Spin::Down, orb1)
            || basis.is_there_an_electron_at(up, down, j, Spin::Down, orb2)
        {
            return;
        }
        let mask = basis.up().bitmask(i, orb1) | basis.up().bitmask(j, orb2);
        if let Some(col) = basis.perfect_index(up ^ mask, down ^ mask) {
            row.add(col, S::from(value));
        }
    }

    fn set_u2_off_diagonal_term(&self, basis: &FermionBasis, up: Word, down: Word, i: usize, orb1: usize, row: &mut SparseRow<S>) {
        let val = self.hubbard_u[2] * 0.5;
        if val == 0.0 {
            return;
        }
        for orb2 in (orb1 + 1)..self.orbitals {
            let sign = basis.spin_flip_sign(up, down, i, orb1, i, orb2);
            self.set_splus_sminus(basis, up, down, (i, orb1), (i, orb2), val * sign, row);
            self.set_splus_sminus(basis, up, down, (i, orb2), (i, orb1), val * sign, row);
        }
    }

    /// Moves a doubly occupied `orb2` to an empty `orb1` on site `i`.
    fn set_u3_term(&self, basis: &FermionBasis, up: Word, down: Word, i: usize, orb1: usize, orb2: usize, row: &mut SparseRow<S>) {
        debug_assert!(orb1 != orb2);
        if !basis.is_there_an_electron_at(up, down, i, Spin::Up, orb2)
            || basis.is_there_an_electron_at(up, down, i, Spin::Up, orb1)
            || basis.is_there_an_electron_at(up, down, i, Spin::Down, orb1)
            || !basis.is_there_an_electron_at(up, down, i, Spin::Down, orb2)
        {
            return;
        }
        // The start slot orb1 is empty in both species, the signs are the
        // plain parities between the two orbitals.
        let sign = basis.do_sign(up, down, i, orb1, i, orb2, Spin::Up)
            * basis.do_sign(up, down, i, orb1, i, orb2, Spin::Down);
        let mask = basis.up().bitmask(i, orb1) | basis.up().bitmask(i, orb2);
        if let Some(col) = basis.perfect_index(up ^ mask, down ^ mask) {
            row.add(col, S::from(FERMION_SIGN * self.hubbard_u[3] * sign));
        }
    }

    fn set_j_term_off_diagonal(&self, basis: &FermionBasis, up: Word, down: Word, i: usize, orb: usize, row: &mut SparseRow<S>) {
        for j in 0..basis.sites() {
            if j == i {
                continue;
            }
            // Ordered pairs, each bond counted twice.
            let value = self.j_coupling(i, j) * 0.5 * 0.5;
            if value == 0.0 {
                continue;
            }
            for orb2 in 0..self.orbitals {
                let sign = basis.spin_flip_sign(up, down, i, orb, j, orb2);
                self.set_splus_sminus(basis, up, down, (i, orb), (j, orb2), value * sign, row);
                self.set_splus_sminus(basis, up, down, (j, orb2), (i, orb), value * sign, row);
            }
        }
    }
}

impl<'a, S: Scalar, G: Geometry<S>> ModelHamiltonian<S> for FeAsBasedSc<'a, S, G> {
    type Basis = FermionBasis;

    fn name(&self) -> &str {
        if self.extended {
            "FeAsBasedScExtended"
        } else {
            "FeAsBasedSc"
        }
    }

    fn basis(&self) -> &FermionBasis {
        &self.basis
    }

    fn fill_row(&self, basis: &FermionBasis, ispace: usize, row: &mut SparseRow<S>) {
        let (up, down) = basis.states(ispace);
        row.add(ispace, S::from(self.diagonal(basis, up, down)));
        for i in 0..basis.sites() {
            for orb in 0..self.orbitals {
                self.set_hopping_term(basis, ispace, up, down, i, orb, row);
                self.set_u2_off_diagonal_term(basis, up, down, i, orb, row);
                if self.hubbard_u[3] != 0.0 {
                    for orb2 in 0..self.orbitals {
                        if orb2 != orb {
                            self.set_u3_term(basis, up, down, i, orb, orb2, row);
                        }
                    }
                }
                if self.extended {
                    self.set_j_term_off_diagonal(basis, up, down, i, orb, row);
                }
            }
        }
    }
}
