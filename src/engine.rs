use log::info;

use crate::basis::HilbertBasis;
use crate::density::ReducedDensityMatrix;
use crate::errors::Result;
use crate::green::{spectral_function, two_point, ContinuedFractionCollection};
use crate::lanczos::{ground_state, GroundState, LanczosParams};
use crate::models::ModelHamiltonian;
use crate::scalar::Scalar;
use crate::{OperatorKind, Spin};

/// Ground state of a model and everything measured on it.
pub struct Engine<'m, S, M> {
    model: &'m M,
    params: LanczosParams,
    gs: GroundState<S>,
}

impl<'m, S: Scalar, M: ModelHamiltonian<S>> Engine<'m, S, M> {
    /// Computes the ground state right away.
    pub fn new(model: &'m M, params: LanczosParams) -> Result<Self> {
        info!("{}: ground state in a sector of size {}", model.name(), model.basis().size());
        let gs = ground_state(model, &params)?;
        Ok(Engine { model, params, gs })
    }

    pub fn model(&self) -> &M {
        self.model
    }

    pub fn gs_energy(&self) -> f64 {
        self.gs.energy
    }

    pub fn eigenvector(&self) -> &[S] {
        &self.gs.vector
    }

    pub fn ground_state(&self) -> &GroundState<S> {
        &self.gs
    }

    pub fn spectral_function(
        &self,
        what: OperatorKind,
        site_i: usize,
        site_j: usize,
        spin: Spin,
        orbs: (usize, usize),
    ) -> Result<ContinuedFractionCollection> {
        spectral_function(self.model, &self.gs, &self.params, what, site_i, site_j, spin, orbs)
    }

    pub fn two_point(&self, what: OperatorKind, spin: Spin, orbs: (usize, usize)) -> Result<Vec<Vec<S>>> {
        two_point(self.model, &self.gs, what, spin, orbs)
    }

    pub fn reduced_density_matrix(&self, split: usize) -> Result<ReducedDensityMatrix<S>> {
        ReducedDensityMatrix::new(self.model.basis(), &self.gs.vector, split)
    }
}
