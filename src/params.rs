use crate::errors::{LanczosError, Result};
use crate::sector::Sector;

/// Model parameters
/// # Fields
/// * __`model`__ - Model name, see [ModelSelector](crate::models::ModelSelector).
/// * __`sites`__ - Number of lattice sites.
/// * __`orbitals`__ - Orbitals per site.
/// * __`target`__ - Sector of the ground state. For spin models `up` is the
/// number of up spins.
/// * __`hubbard_u`__ - One value per site for one band models, $U_0..U_3$ for
/// multi-orbital models.
/// * __`potential_v`__ - On-site potentials. One band models take one value
/// per site, multi-orbital models take $V_{i,a,\sigma}$ at index
/// $i+(a+n_{\text{orb}}\sigma)N_s$.
/// * __`magnetic_field`__ - Field along $z$ per site, spin models only.
/// * __`twice_the_spin`__ - $2S$ for spin models.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub sites: usize,
    pub orbitals: usize,
    pub target: Sector,
    pub hubbard_u: Vec<f64>,
    pub potential_v: Vec<f64>,
    pub magnetic_field: Vec<f64>,
    pub twice_the_spin: usize,
}

impl ModelParams {
    pub fn new(
        model: &str,
        sites: usize,
        orbitals: usize,
        target: Sector,
        hubbard_u: Vec<f64>,
        potential_v: Vec<f64>,
        magnetic_field: Vec<f64>,
        twice_the_spin: usize,
    ) -> Self {
        ModelParams {
            model: model.to_owned(),
            sites,
            orbitals,
            target,
            hubbard_u,
            potential_v,
            magnetic_field,
            twice_the_spin,
        }
    }

    /// Parameters of a one band Hubbard model with uniform $U$ and no
    /// potential.
    pub fn hubbard(sites: usize, target: Sector, u: f64) -> Self {
        ModelParams::new("HubbardOneBand", sites, 1, target, vec![u; sites], vec![0.0; sites], Vec::new(), 1)
    }

    /// Parameters of a spin one half Heisenberg model without field.
    pub fn heisenberg(sites: usize, nup: usize) -> Self {
        ModelParams::new(
            "Heisenberg",
            sites,
            1,
            Sector::new(nup, sites.saturating_sub(nup)),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            1,
        )
    }

    /// Fails unless `values` has exactly `expected` entries. An empty vector
    /// is replaced by zeros.
    pub(crate) fn sized(name: &str, values: &[f64], expected: usize) -> Result<Vec<f64>> {
        if values.is_empty() {
            return Ok(vec![0.0; expected]);
        }
        if values.len() != expected {
            return Err(LanczosError::invalid(format!(
                "{} has {} entries, expected {}.",
                name,
                values.len(),
                expected
            )));
        }
        Ok(values.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sized_fills_and_checks() {
        assert_eq!(ModelParams::sized("v", &[], 3).unwrap(), vec![0.0; 3]);
        assert_eq!(ModelParams::sized("v", &[1.0, 2.0], 2).unwrap(), vec![1.0, 2.0]);
        assert!(ModelParams::sized("v", &[1.0], 2).is_err());
    }

    #[test]
    fn heisenberg_sector_fills_the_lattice() {
        let p = ModelParams::heisenberg(4, 1);
        assert_eq!(p.target, Sector::new(1, 3));
    }
}
