#[cfg(feature = "python-interface")]
use pyo3::prelude::*;
use std::fmt;

/// Occupation word, bit $k$ is slot $k=\text{site}\cdot n_{\text{orb}}+\text{orb}$.
pub type Word = u64;

/// Sign picked up by exchanging two fermion operators.
pub const FERMION_SIGN: f64 = -1.0;

/// Spin of a fermion, or the species a one site operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Up,
    Down,
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Spin::Up => write!(f, "{}", strings::UPARROW),
            Spin::Down => write!(f, "{}", strings::DOWNARROW),
        }
    }
}

/// Display helpers.
pub mod strings;

/// Error type of the crate.
pub mod errors;
pub use errors::{LanczosError, Result};

/// One site operators.
/// # Names
/// | operator | name | sector change $(\Delta n_\uparrow,\Delta n_\downarrow)$ |
/// |----------|------|----------------------|
/// | $c_\sigma$ | `c` | $-1$ on $\sigma$ |
/// | $c^\dagger_\sigma$ | `cdagger` | $+1$ on $\sigma$ |
/// | $n_\sigma$ | `n` | none |
/// | $S^+$ | `splus` | $(+1,-1)$ |
/// | $S^-$ | `sminus` | $(-1,+1)$ |
/// | $S^z$ | `sz` | none |
pub mod operators;
pub use operators::OperatorKind;

/// Matrix element field, real or complex.
pub mod scalar;

/// Fixed particle number basis of one species.
/// # Definition
/// The states with $N$ particles in $M$ slots are the $\binom{M}{N}$ words
/// with $N$ bits set, enumerated in increasing numerical order. The index of
/// a word is its rank in the combinatorial number system
///
/// $$
/// \text{rank}(w)=\sum_{k=1}^{N}\binom{s_k}{k}
/// $$
///
/// with $s_1<s_2<\dots<s_N$ the positions of its set bits, so that a state is
/// located in $O(N)$ without any search.
pub mod bit_basis;

/// Capabilities shared by every basis flavour.
pub mod basis;

/// Product basis of the up and down species.
/// # Definition
/// State $k$ is the pair $(\text{up}[k\bmod n_\uparrow], \text{down}[k/n_\uparrow])$
/// where $n_\uparrow$ is the size of the up basis. The operator order is all
/// the up operators, then all the down ones, each in increasing slot order.
pub mod fermion_basis;

/// Spin one half basis at fixed $S^z$.
pub mod spin_basis;

/// Particle number sectors and the sector arithmetic of one site operators.
pub mod sector;

/// Row by row sparse matrices.
pub mod sparse;

/// Lattice couplings.
pub mod geometry;

/// Model parameters.
pub mod params;

/// Model Hamiltonians.
/// # Models
/// * __`HubbardOneOrbital`__ - One orbital Hubbard model.
/// * __`FeAsBasedSc`__ - Multi-orbital model with inter-orbital Coulomb, Hund
/// and pair hopping terms.
/// * __`Heisenberg`__ - Spin one half exchange model.
pub mod models;

/// Lanczos tridiagonalization and ground state.
pub mod lanczos;

/// Dynamical functions as continued fractions and equal time correlations.
/// # Definition
/// For an operator $A$ and the ground state $\vert\psi_0\rangle$ of energy
/// $E_0$,
///
/// $$
/// G(z)=\langle\psi_0\vert A\frac{1}{z-(H-E_0)}A^\dagger\vert\psi_0\rangle
/// +\langle\psi_0\vert A^\dagger\frac{1}{z+(H-E_0)}A\vert\psi_0\rangle
/// $$
///
/// Each term is the first diagonal element of a resolvent in the Krylov space
/// of $A^\dagger\vert\psi_0\rangle$ or $A\vert\psi_0\rangle$, a continued
/// fraction of the Lanczos coefficients.
pub mod green;

/// Reduced density matrix of a bipartition and its entanglement entropy.
pub mod density;

/// Ground state driver.
pub mod engine;

/// Input file parsing util.
/// # Subfiles
/// * __`input`__ - `Key=value` file describing the model, the geometry, the
/// solver and the observables.
/// * __`geometry`__ - Bonds in csv format, `term,i,orb_i,j,orb_j,re[,im]`.
pub mod parse;

/// Ground state energy of a one band Hubbard chain.
#[cfg(feature = "python-interface")]
#[pyfunction]
pub fn ground_state_energy(sites: usize, nup: usize, ndown: usize, t: f64, u: f64, periodic: bool) -> PyResult<f64> {
    use crate::geometry::GeometryTable;
    use crate::lanczos::{ground_state, LanczosParams};
    use crate::models::ModelSelector;
    use crate::params::ModelParams;
    use crate::sector::Sector;

    let to_py = |e: LanczosError| pyo3::exceptions::PyValueError::new_err(e.to_string());
    let params = ModelParams::hubbard(sites, Sector::new(nup, ndown), u);
    let geometry = GeometryTable::chain(sites, 1, &[t], periodic).map_err(to_py)?;
    match ModelSelector::new(&params, &geometry).map_err(to_py)? {
        ModelSelector::Hubbard(m) => Ok(ground_state(&m, &LanczosParams::default()).map_err(to_py)?.energy),
        other => Err(pyo3::exceptions::PyValueError::new_err(format!("unexpected model {}", other.name()))),
    }
}

#[cfg(feature = "python-interface")]
#[pymodule]
#[pyo3(name = "lanczos")]
fn lanczos_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use pyo3::wrap_pyfunction;

    m.add_function(wrap_pyfunction!(ground_state_energy, m)?)?;
    Ok(())
}
