use log::{debug, info, warn};
use num::complex::Complex;
use std::f64::consts::PI;

use crate::basis::HilbertBasis;
use crate::errors::Result;
use crate::lanczos::{tridiagonalize, GroundState, LanczosParams, TridiagonalMatrix};
use crate::models::ModelHamiltonian;
use crate::scalar::{dot, norm, Scalar};
use crate::sector::Sector;
use crate::{OperatorKind, Spin};

/// Which side of the spectrum a fraction describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionKind {
    /// Excitations $H-E_0$ above the ground state.
    Particle,
    /// Excitations $E_0-H$ below the ground state.
    Hole,
}

/// One continued fraction of a dynamical function.
/// # Definition
/// With $e_k=a_k-E_0$ for particles and $e_k=E_0-a_k$ for holes,
///
/// $$
/// G(z)=\cfrac{w}{z-e_0-\cfrac{b_0^2}{z-e_1-\cfrac{b_1^2}{z-e_2-\cdots}}}
/// $$
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuedFraction {
    pub ab: TridiagonalMatrix,
    pub weight: f64,
    pub energy: f64,
    pub kind: FractionKind,
}

impl ContinuedFraction {
    pub fn green(&self, z: Complex<f64>) -> Complex<f64> {
        let n = self.ab.a.len();
        if n == 0 || self.weight == 0.0 {
            return Complex::new(0.0, 0.0);
        }
        let mut g = Complex::new(0.0, 0.0);
        for k in (0..n).rev() {
            let e = match self.kind {
                FractionKind::Particle => self.ab.a[k] - self.energy,
                FractionKind::Hole => self.energy - self.ab.a[k],
            };
            let tail = if k + 1 < n { self.ab.b[k] * self.ab.b[k] * g } else { Complex::new(0.0, 0.0) };
            g = 1.0 / (z - e - tail);
        }
        g * self.weight
    }

    /// $A(\omega)=-\frac1\pi\text{Im}\,G(\omega+i\eta)$
    pub fn spectral(&self, omega: f64, eta: f64) -> f64 {
        -self.green(Complex::new(omega, eta)).im / PI
    }
}

/// Sum of continued fractions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContinuedFractionCollection {
    pub fractions: Vec<ContinuedFraction>,
}

impl ContinuedFractionCollection {
    pub fn push(&mut self, fraction: ContinuedFraction) {
        self.fractions.push(fraction)
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Total spectral weight.
    pub fn weight(&self) -> f64 {
        self.fractions.iter().map(|f| f.weight).sum()
    }

    pub fn green(&self, z: Complex<f64>) -> Complex<f64> {
        self.fractions.iter().fold(Complex::new(0.0, 0.0), |acc, f| acc + f.green(z))
    }

    pub fn spectral(&self, omega: f64, eta: f64) -> f64 {
        self.fractions.iter().map(|f| f.spectral(omega, eta)).sum()
    }

    /// $A(\omega)$ at every point of `grid`.
    pub fn spectrum(&self, grid: &FrequencyGrid) -> Vec<(f64, f64)> {
        grid.points().map(|w| (w, self.spectral(w, grid.eta))).collect()
    }
}

/// Real frequencies $\omega_k=\omega_0+k\,\delta\omega$ with a broadening $\eta$.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyGrid {
    pub begin: f64,
    pub end: f64,
    pub total: usize,
    pub eta: f64,
}

impl FrequencyGrid {
    /// `total` points from `begin` to `end` included.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        let step = if self.total > 1 { (self.end - self.begin) / (self.total - 1) as f64 } else { 0.0 };
        (0..self.total).map(move |k| self.begin + k as f64 * step)
    }
}

/// Applies $\sum_{s}A_s$ over `sites` to the ground state.
/// # Returns
/// The target basis and the vector in it, `None` when the operator leaves
/// the Hilbert space.
fn apply<S: Scalar, M: ModelHamiltonian<S>>(
    model: &M,
    gs: &GroundState<S>,
    what: OperatorKind,
    sites: &[(usize, usize)],
    spin: Spin,
    orbs: (usize, usize),
) -> Result<Option<(M::Basis, Vec<S>)>> {
    let target: Sector = match model.has_new_parts(what, spin, orbs)? {
        Some(s) => s,
        None => return Ok(None),
    };
    let source = model.basis();
    let basis = model.create_basis(target)?;
    let mut out = vec![S::zero(); basis.size()];
    for ispace in 0..source.size() {
        let amp = gs.vector[ispace];
        if amp == S::zero() {
            continue;
        }
        for &(site, orb) in sites.iter() {
            if let Some((bra, value)) = source.bra_index(ispace, what, site, spin, orb, &basis)? {
                out[bra] += amp * value;
            }
        }
    }
    Ok(Some((basis, out)))
}

/// Dynamical function of `what` between orbital `orbs.0` of `site_i` and
/// orbital `orbs.1` of `site_j`.
/// # Definition
/// When both name the same slot, the fractions of $A^\dagger_i\vert\psi_0\rangle$
/// (particle) and $A_i\vert\psi_0\rangle$ (hole). Otherwise the same with
/// $A_i+A_j$, from which the off diagonal part follows by subtracting the
/// diagonal ones.
/// Sectors outside the Hilbert space contribute nothing.
/// # Errors
/// Operator not supported by the model.
pub fn spectral_function<S: Scalar, M: ModelHamiltonian<S>>(
    model: &M,
    gs: &GroundState<S>,
    params: &LanczosParams,
    what: OperatorKind,
    site_i: usize,
    site_j: usize,
    spin: Spin,
    orbs: (usize, usize),
) -> Result<ContinuedFractionCollection> {
    let sites: Vec<(usize, usize)> = if (site_i, orbs.0) == (site_j, orbs.1) {
        vec![(site_i, orbs.0)]
    } else {
        vec![(site_i, orbs.0), (site_j, orbs.1)]
    };
    let mut collection = ContinuedFractionCollection::default();
    for (op, kind) in [(what.dagger(), FractionKind::Particle), (what, FractionKind::Hole)] {
        let (basis, phi) = match apply(model, gs, op, &sites, spin, orbs)? {
            Some(v) => v,
            None => {
                debug!("{} on sites {:?} leaves the Hilbert space.", op, sites);
                continue;
            }
        };
        let weight = norm(&phi).powi(2);
        if weight < 1e-24 {
            debug!("{} on sites {:?} annihilates the ground state.", op, sites);
            continue;
        }
        let ab = tridiagonalize(model, &basis, params, &phi);
        info!("{} {:?}: {} steps, weight {}", op, kind, ab.size(), weight);
        collection.push(ContinuedFraction { ab, weight, energy: gs.energy, kind });
    }
    if collection.is_empty() {
        warn!("Dynamical function of {} between {} and {} vanishes.", what, site_i, site_j);
    }
    Ok(collection)
}

/// Equal time correlations $C_{ij}=\langle\psi_0\vert A^\dagger_iA_j\vert\psi_0\rangle$.
/// # Returns
/// `sites` rows of `sites` values, orbital `orbs.0` on $i$ and `orbs.1` on $j$.
pub fn two_point<S: Scalar, M: ModelHamiltonian<S>>(
    model: &M,
    gs: &GroundState<S>,
    what: OperatorKind,
    spin: Spin,
    orbs: (usize, usize),
) -> Result<Vec<Vec<S>>> {
    let nsites = model.basis().sites();
    let mut left: Vec<Vec<S>> = Vec::with_capacity(nsites);
    let mut right: Vec<Vec<S>> = Vec::with_capacity(nsites);
    for site in 0..nsites {
        // Both orbitals land in the same sector, so either both vanish or neither.
        match apply(model, gs, what, &[(site, orbs.0)], spin, orbs)? {
            Some((_, v)) => left.push(v),
            None => return Ok(vec![vec![S::zero(); nsites]; nsites]),
        }
        if orbs.0 != orbs.1 {
            match apply(model, gs, what, &[(site, orbs.1)], spin, orbs)? {
                Some((_, v)) => right.push(v),
                None => return Ok(vec![vec![S::zero(); nsites]; nsites]),
            }
        }
    }
    let right = if orbs.0 == orbs.1 { &left } else { &right };
    Ok((0..nsites)
        .map(|i| (0..nsites).map(|j| dot(&left[i], &right[j])).collect())
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bit_basis::BasisTables;
    use crate::geometry::GeometryTable;
    use crate::lanczos::ground_state;
    use crate::models::{FeAsBasedSc, Heisenberg, HubbardOneOrbital};
    use crate::params::ModelParams;
    use assert::close;

    fn feas_params(sites: usize, target: Sector) -> ModelParams {
        ModelParams::new("FeAsBasedSc", sites, 2, target, vec![2.0, 1.0, 0.5, 0.2], Vec::new(), Vec::new(), 1)
    }

    #[test]
    fn single_pole_fraction() {
        let f = ContinuedFraction {
            ab: TridiagonalMatrix { a: vec![3.0], b: vec![] },
            weight: 0.5,
            energy: 1.0,
            kind: FractionKind::Particle,
        };
        let g = f.green(Complex::new(4.0, 0.0));
        close(g.re, 0.25, 1e-14);
        let h = ContinuedFraction { kind: FractionKind::Hole, ..f.clone() };
        // Pole of the hole part at E0 - a = -2.
        close(h.green(Complex::new(-1.0, 0.0)).re, 0.5, 1e-14);
    }

    #[test]
    fn local_green_function_sums_to_one() {
        let g = GeometryTable::chain(4, 1, &[-1.0], true).unwrap();
        let p = ModelParams::hubbard(4, Sector::new(2, 2), 2.0);
        let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(4).unwrap()).unwrap();
        let params = LanczosParams::default();
        let gs = ground_state(&m, &params).unwrap();
        let gf = spectral_function(&m, &gs, &params, OperatorKind::C, 1, 1, Spin::Up, (0, 0)).unwrap();
        assert_eq!(gf.len(), 2);
        close(gf.weight(), 1.0, 1e-10);
        // Far from the spectrum G(z) ~ w / z.
        let z = Complex::new(1e6, 0.0);
        close(gf.green(z).re * 1e6, 1.0, 1e-4);
    }

    #[test]
    fn densities_sum_to_the_particle_number() {
        let g = GeometryTable::chain(4, 1, &[-1.0], false).unwrap();
        let p = ModelParams::hubbard(4, Sector::new(3, 1), 1.0);
        let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(4).unwrap()).unwrap();
        let gs = ground_state(&m, &LanczosParams::default()).unwrap();
        let c = two_point(&m, &gs, OperatorKind::C, Spin::Up, (0, 0)).unwrap();
        let trace: f64 = (0..4).map(|i| c[i][i]).sum();
        close(trace, 3.0, 1e-10);
        let n = two_point(&m, &gs, OperatorKind::N, Spin::Down, (0, 0)).unwrap();
        let trace: f64 = (0..4).map(|i| n[i][i]).sum();
        close(trace, 1.0, 1e-10);
    }

    #[test]
    fn empty_sector_gives_only_one_fraction() {
        let g = GeometryTable::chain(2, 1, &[-1.0], false).unwrap();
        let p = ModelParams::hubbard(2, Sector::new(2, 0), 0.0);
        let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(2).unwrap()).unwrap();
        let params = LanczosParams::default();
        let gs = ground_state(&m, &params).unwrap();
        let gf = spectral_function(&m, &gs, &params, OperatorKind::C, 0, 0, Spin::Up, (0, 0)).unwrap();
        assert_eq!(gf.len(), 1);
        assert_eq!(gf.fractions[0].kind, FractionKind::Hole);
    }

    #[test]
    fn same_site_orbital_pair_uses_both_orbitals() {
        // One site, two orbitals mixed by an on-site bond.
        let mut g: GeometryTable<f64> = GeometryTable::new(1, &[2]);
        g.set_bond(0, 0, 0, 0, 1, 0.3).unwrap();
        let p = feas_params(1, Sector::new(1, 1));
        let m = FeAsBasedSc::new(&p, &g, false, BasisTables::new(2).unwrap()).unwrap();
        let params = LanczosParams::default();
        let gs = ground_state(&m, &params).unwrap();
        // {A, A^dagger} = 2 for A = c_a + c_b.
        let gf = spectral_function(&m, &gs, &params, OperatorKind::C, 0, 0, Spin::Up, (0, 1)).unwrap();
        close(gf.weight(), 2.0, 1e-10);
        let gf = spectral_function(&m, &gs, &params, OperatorKind::C, 0, 0, Spin::Up, (1, 1)).unwrap();
        close(gf.weight(), 1.0, 1e-10);
    }

    #[test]
    fn orbital_correlations_are_symmetric() {
        let mut g = GeometryTable::chain(2, 2, &[-1.0], false).unwrap();
        g.set_bond(0, 0, 0, 1, 1, 0.4).unwrap();
        g.set_bond(0, 1, 0, 1, 1, 0.3).unwrap();
        let p = feas_params(2, Sector::new(2, 2));
        let m = FeAsBasedSc::new(&p, &g, false, BasisTables::new(4).unwrap()).unwrap();
        let gs = ground_state(&m, &LanczosParams::default()).unwrap();
        let nab = two_point(&m, &gs, OperatorKind::N, Spin::Up, (0, 1)).unwrap();
        let nba = two_point(&m, &gs, OperatorKind::N, Spin::Up, (1, 0)).unwrap();
        let cab = two_point(&m, &gs, OperatorKind::C, Spin::Up, (0, 1)).unwrap();
        let cba = two_point(&m, &gs, OperatorKind::C, Spin::Up, (1, 0)).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                close(nab[i][j], nba[j][i], 1e-10);
                close(cab[i][j], cba[j][i], 1e-10);
            }
        }
        // Occupations of both orbitals add up to the up electrons.
        let mut total = 0.0;
        for orb in 0..2 {
            let c = two_point(&m, &gs, OperatorKind::C, Spin::Up, (orb, orb)).unwrap();
            total += c[0][0] + c[1][1];
        }
        close(total, 2.0, 1e-10);
    }

    #[test]
    fn singlet_sz_correlations() {
        let g = GeometryTable::chain(2, 1, &[1.0, 1.0], false).unwrap();
        let p = ModelParams::heisenberg(2, 1);
        let m = Heisenberg::new(&p, &g, BasisTables::new(2).unwrap()).unwrap();
        let gs = ground_state(&m, &LanczosParams::default()).unwrap();
        let c = two_point(&m, &gs, OperatorKind::Sz, Spin::Up, (0, 0)).unwrap();
        close(c[0][0], 0.25, 1e-10);
        close(c[0][1], -0.25, 1e-10);
    }

    #[test]
    fn spectrum_on_a_grid() {
        let f = ContinuedFraction {
            ab: TridiagonalMatrix { a: vec![3.0], b: vec![] },
            weight: 1.0,
            energy: 1.0,
            kind: FractionKind::Particle,
        };
        let gf = ContinuedFractionCollection { fractions: vec![f] };
        let grid = FrequencyGrid { begin: 0.0, end: 4.0, total: 5, eta: 0.1 };
        let a = gf.spectrum(&grid);
        assert_eq!(a.len(), 5);
        close(a[4].0, 4.0, 1e-14);
        // Lorentzian of width eta at the pole 2.
        close(a[2].1, 1.0 / (PI * 0.1), 1e-12);
        assert!(a[0].1 < a[2].1);
    }
}
