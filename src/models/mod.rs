use log::{debug, info};
use rayon::prelude::*;
use std::sync::Arc;

use crate::basis::HilbertBasis;
use crate::bit_basis::BasisTables;
use crate::errors::{LanczosError, Result};
use crate::geometry::Geometry;
use crate::params::ModelParams;
use crate::scalar::Scalar;
use crate::sector::Sector;
use crate::sparse::{CrsMatrix, SparseRow};
use crate::{OperatorKind, Spin};

/// One band Hubbard model, with an optional density-density term.
pub mod hubbard;
/// Multi-orbital model of the iron based superconductors.
pub mod feas;
/// Spin one half Heisenberg model.
pub mod heisenberg;

pub use feas::FeAsBasedSc;
pub use heisenberg::Heisenberg;
pub use hubbard::HubbardOneOrbital;

/// Geometry term holding the hoppings, or the $J^\pm$ exchange.
pub const TERM_HOPPINGS: usize = 0;
/// Geometry term holding the second coupling of a model, $V_{ij}$, $J_{ij}$
/// or $J^{zz}$.
pub const TERM_EXTENDED: usize = 1;

/// Operators of the one band Hubbard model.
pub const HUBBARD_OPERATORS: &[OperatorKind] = &[
    OperatorKind::C,
    OperatorKind::CDagger,
    OperatorKind::N,
    OperatorKind::Sz,
];
/// Operators of the multi-orbital model.
pub const FEAS_OPERATORS: &[OperatorKind] = &[
    OperatorKind::C,
    OperatorKind::CDagger,
    OperatorKind::N,
    OperatorKind::Sz,
    OperatorKind::SPlus,
    OperatorKind::SMinus,
];

/// A Hamiltonian acting on one basis flavour.
/// # Purpose
/// A model only has to say what a single row of $H$ looks like, in
/// [ModelHamiltonian::fill_row]. The explicit sparse matrix and the on the fly
/// product are both built from that single generator, so they enumerate the
/// same terms with the same signs.
/// # Convention
/// Row $r$ holds $\langle r\vert H\vert c\rangle$. Generating $H\vert r\rangle$
/// gives $\langle c\vert H\vert r\rangle$, rows store its conjugate.
pub trait ModelHamiltonian<S: Scalar>: Send + Sync {
    type Basis: HilbertBasis;

    fn name(&self) -> &str;

    /// Basis of the target sector, owned by the model.
    fn basis(&self) -> &Self::Basis;

    fn orbitals(&self) -> usize {
        self.basis().orbitals()
    }

    /// Accumulates every non zero element of row `ispace` of the Hamiltonian
    /// restricted to `basis`.
    fn fill_row(&self, basis: &Self::Basis, ispace: usize, row: &mut SparseRow<S>);

    /// Basis over the same lattice in another sector, owned by the caller.
    fn create_basis(&self, sector: Sector) -> Result<Self::Basis> {
        self.basis().with_sector(sector)
    }

    /// Sector reached by applying `what` to the target sector.
    fn has_new_parts(&self, what: OperatorKind, spin: Spin, orbs: (usize, usize)) -> Result<Option<Sector>> {
        self.basis().has_new_parts(what, spin, orbs)
    }

    /// Full sparse matrix in `basis`, rows generated in parallel.
    fn setup_hamiltonian(&self, basis: &Self::Basis) -> CrsMatrix<S> {
        let n = basis.size();
        let rows: Vec<Vec<(usize, S)>> = (0..n)
            .into_par_iter()
            .map_init(SparseRow::new, |row, r| {
                self.fill_row(basis, r, row);
                row.take()
            })
            .collect();
        let mut matrix = CrsMatrix::new(n, n);
        for entries in rows.iter() {
            matrix.push_row(entries);
        }
        info!(
            "{}: assembled sector {} of size {} with {} non zeros.",
            self.name(),
            basis.sector(),
            n,
            matrix.nonzeros()
        );
        debug_assert!(matrix.check_validity());
        debug_assert!(matrix.is_hermitian(1e-10));
        matrix
    }

    /// $x\leftarrow x+Hy$ without storing $H$.
    fn matrix_vector_product(&self, x: &mut [S], y: &[S], basis: &Self::Basis) {
        debug_assert_eq!(x.len(), basis.size());
        debug_assert_eq!(y.len(), basis.size());
        x.par_iter_mut()
            .enumerate()
            .for_each_init(SparseRow::new, |row, (r, xr)| {
                self.fill_row(basis, r, row);
                *xr += row.finalize_dot(y);
            });
    }
}

/// Model chosen at run time from its name.
/// # Names
/// | name | model | geometry terms |
/// |------|-------|----------------|
/// | `HubbardOneBand` | [HubbardOneOrbital] | 1 |
/// | `HubbardOneBandExtended` | [HubbardOneOrbital] with $V_{ij}n_in_j$ | 2 |
/// | `FeAsBasedSc` | [FeAsBasedSc] | 1 |
/// | `FeAsBasedScExtended` | [FeAsBasedSc] with $J_{ij}$ | 2 |
/// | `Heisenberg` | [Heisenberg] | 2 |
pub enum ModelSelector<'a, S: Scalar, G: Geometry<S>> {
    Hubbard(HubbardOneOrbital<'a, S, G>),
    FeAs(FeAsBasedSc<'a, S, G>),
    Heisenberg(Heisenberg<'a, S, G>),
}

impl<'a, S: Scalar, G: Geometry<S>> ModelSelector<'a, S, G> {
    /// Builds the model named by `params.model` in its target sector.
    /// # Errors
    /// Unknown model name, or parameters inconsistent with the model.
    pub fn new(params: &'a ModelParams, geometry: &'a G) -> Result<Self> {
        let tables: Arc<BasisTables> = BasisTables::new(params.sites * params.orbitals)?;
        debug!("Selecting model {}", params.model);
        match params.model.as_str() {
            "HubbardOneBand" => Ok(ModelSelector::Hubbard(HubbardOneOrbital::new(params, geometry, false, tables)?)),
            "HubbardOneBandExtended" => {
                Ok(ModelSelector::Hubbard(HubbardOneOrbital::new(params, geometry, true, tables)?))
            }
            "FeAsBasedSc" => Ok(ModelSelector::FeAs(FeAsBasedSc::new(params, geometry, false, tables)?)),
            "FeAsBasedScExtended" => Ok(ModelSelector::FeAs(FeAsBasedSc::new(params, geometry, true, tables)?)),
            "Heisenberg" => Ok(ModelSelector::Heisenberg(Heisenberg::new(params, geometry, tables)?)),
            _ => Err(LanczosError::UnknownModel { name: params.model.clone() }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ModelSelector::Hubbard(m) => m.name(),
            ModelSelector::FeAs(m) => m.name(),
            ModelSelector::Heisenberg(m) => m.name(),
        }
    }
}

/// Checks that `geometry` fits a model.
pub(crate) fn check_geometry<S: Scalar, G: Geometry<S>>(
    name: &str,
    geometry: &G,
    params: &ModelParams,
    terms: usize,
) -> Result<()> {
    if geometry.number_of_sites() != params.sites {
        return Err(LanczosError::Geometry {
            details: format!(
                "{}: geometry has {} sites, parameters have {}",
                name,
                geometry.number_of_sites(),
                params.sites
            ),
        });
    }
    if geometry.terms() != terms {
        return Err(LanczosError::Geometry {
            details: format!("{}: needs {} terms, geometry has {}", name, terms, geometry.terms()),
        });
    }
    if geometry.orbitals(TERM_HOPPINGS) != params.orbitals {
        return Err(LanczosError::Geometry {
            details: format!(
                "{}: geometry has {} orbitals, parameters have {}",
                name,
                geometry.orbitals(TERM_HOPPINGS),
                params.orbitals
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::GeometryTable;

    #[test]
    fn unknown_model_is_an_error() {
        let g = GeometryTable::chain(2, 1, &[1.0], false).unwrap();
        let mut p = ModelParams::hubbard(2, Sector::new(1, 1), 0.0);
        p.model = "Hofstadter".to_owned();
        match ModelSelector::new(&p, &g) {
            Err(LanczosError::UnknownModel { name }) => assert_eq!(name, "Hofstadter"),
            _ => panic!("expected an unknown model error"),
        }
    }

    #[test]
    fn names_select_models() {
        let g = GeometryTable::chain(2, 1, &[1.0], false).unwrap();
        let p = ModelParams::hubbard(2, Sector::new(1, 1), 0.0);
        assert!(matches!(ModelSelector::new(&p, &g).unwrap(), ModelSelector::Hubbard(_)));
        let g2 = GeometryTable::chain(2, 1, &[1.0, 1.0], false).unwrap();
        let p = ModelParams::heisenberg(2, 1);
        assert!(matches!(ModelSelector::new(&p, &g2).unwrap(), ModelSelector::Heisenberg(_)));
        // Heisenberg needs two terms.
        assert!(ModelSelector::new(&p, &g).is_err());
    }
}
