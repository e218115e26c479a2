use log::trace;
use std::fmt;

use crate::errors::{LanczosError, Result};
use crate::{OperatorKind, Spin};

/// Particle numbers of a basis.
/// For spin models `up` is the number of up spins and `down` the number of
/// down spins, their sum is the number of sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sector {
    pub up: usize,
    pub down: usize,
}

impl Sector {
    pub fn new(up: usize, down: usize) -> Self {
        Sector { up, down }
    }

    /// $S^z=\frac12(n_\uparrow-n_\downarrow)$
    pub fn sz(&self) -> f64 {
        0.5 * (self.up as f64 - self.down as f64)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.up, self.down)
    }
}

/// Decides which sector an operator leads to.
/// # Purpose
/// Before building a basis for $A\vert\psi\rangle$ the caller asks the
/// navigator for the target sector. The navigator knows how many slots each
/// species has and which operators the model supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorNavigator {
    nslots: usize,
    orbitals: usize,
    supported: &'static [OperatorKind],
}

impl SectorNavigator {
    /// # Arguments
    /// * __`nslots`__ - Slots available to each species.
    /// * __`orbitals`__ - Orbitals per site, bounds the orbital pair.
    /// * __`supported`__ - Operators the model can apply.
    pub fn new(nslots: usize, orbitals: usize, supported: &'static [OperatorKind]) -> Self {
        SectorNavigator { nslots, orbitals, supported }
    }

    pub fn supports(&self, what: OperatorKind) -> bool {
        self.supported.contains(&what)
    }

    /// Sector reached by applying `what` with spin `spin` to `current`.
    /// # Returns
    /// * __`Ok(Some(sector))`__ - The new sector.
    /// * __`Ok(None)`__ - A count leaves $[0, n_{\text{slots}}]$ or both
    /// counts vanish, there is nothing to build.
    /// # Errors
    /// Unsupported operator, or orbital out of range.
    pub fn has_new_parts(
        &self,
        current: Sector,
        what: OperatorKind,
        spin: Spin,
        orbs: (usize, usize),
    ) -> Result<Option<Sector>> {
        if !self.supports(what) {
            return Err(LanczosError::unsupported(what, "has_new_parts"));
        }
        if orbs.0 >= self.orbitals || orbs.1 >= self.orbitals {
            return Err(LanczosError::invalid(format!(
                "Orbital pair ({}, {}) out of range for {} orbitals.",
                orbs.0, orbs.1, self.orbitals
            )));
        }
        let (dup, ddown) = match what.particle_change(spin == Spin::Up) {
            Some(d) => d,
            None => return Err(LanczosError::unsupported(what, "has_new_parts")),
        };
        let up = current.up as i64 + dup;
        let down = current.down as i64 + ddown;
        let max = self.nslots as i64;
        if up < 0 || down < 0 || up > max || down > max || (up == 0 && down == 0) {
            trace!("Operator {} {} leaves sector {} to nothing.", what, spin, current);
            return Ok(None);
        }
        let out = Sector::new(up as usize, down as usize);
        trace!("Operator {} {} maps sector {} to {}.", what, spin, current, out);
        Ok(Some(out))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FERMIONS: &[OperatorKind] = &[
        OperatorKind::C,
        OperatorKind::CDagger,
        OperatorKind::N,
        OperatorKind::SPlus,
        OperatorKind::SMinus,
        OperatorKind::Sz,
    ];

    #[test]
    fn creation_on_two_sites() {
        let nav = SectorNavigator::new(2, 1, FERMIONS);
        let s = nav
            .has_new_parts(Sector::new(1, 1), OperatorKind::CDagger, Spin::Up, (0, 0))
            .unwrap();
        assert_eq!(s, Some(Sector::new(2, 1)));
        let s = nav
            .has_new_parts(s.unwrap(), OperatorKind::CDagger, Spin::Up, (0, 0))
            .unwrap();
        assert_eq!(s, None);
    }

    #[test]
    fn annihilation_to_vacuum_is_empty() {
        let nav = SectorNavigator::new(4, 1, FERMIONS);
        let s = nav
            .has_new_parts(Sector::new(0, 1), OperatorKind::C, Spin::Down, (0, 0))
            .unwrap();
        assert_eq!(s, None);
        let s = nav
            .has_new_parts(Sector::new(0, 0), OperatorKind::C, Spin::Down, (0, 0))
            .unwrap();
        assert_eq!(s, None);
    }

    #[test]
    fn spin_flips_move_both_counts() {
        let nav = SectorNavigator::new(4, 1, FERMIONS);
        let s = nav
            .has_new_parts(Sector::new(1, 2), OperatorKind::SPlus, Spin::Up, (0, 0))
            .unwrap();
        assert_eq!(s, Some(Sector::new(2, 1)));
        let s = nav
            .has_new_parts(Sector::new(1, 2), OperatorKind::SMinus, Spin::Down, (0, 0))
            .unwrap();
        assert_eq!(s, Some(Sector::new(0, 3)));
        let s = nav
            .has_new_parts(Sector::new(4, 0), OperatorKind::SPlus, Spin::Up, (0, 0))
            .unwrap();
        assert_eq!(s, None);
    }

    #[test]
    fn diagonal_operators_keep_the_sector() {
        let nav = SectorNavigator::new(4, 1, FERMIONS);
        for what in [OperatorKind::N, OperatorKind::Sz] {
            let s = nav.has_new_parts(Sector::new(2, 1), what, Spin::Up, (0, 0)).unwrap();
            assert_eq!(s, Some(Sector::new(2, 1)));
        }
    }

    #[test]
    fn unsupported_is_an_error() {
        let nav = SectorNavigator::new(4, 1, &[OperatorKind::SPlus, OperatorKind::SMinus]);
        assert!(nav
            .has_new_parts(Sector::new(2, 2), OperatorKind::C, Spin::Up, (0, 0))
            .is_err());
        assert!(nav
            .has_new_parts(Sector::new(2, 2), OperatorKind::Nil, Spin::Up, (0, 0))
            .is_err());
        assert!(nav
            .has_new_parts(Sector::new(2, 2), OperatorKind::SPlus, Spin::Up, (1, 0))
            .is_err());
    }
}
