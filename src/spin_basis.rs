use log::trace;
use std::sync::Arc;

use crate::basis::{HilbertBasis, SplitKey};
use crate::bit_basis::{BasisTables, BitBasis};
use crate::errors::{LanczosError, Result};
use crate::sector::{Sector, SectorNavigator};
use crate::strings::render_slots;
use crate::{OperatorKind, Spin, Word};

/// Operators a spin one half basis can apply.
pub const SPIN_OPERATORS: &[OperatorKind] = &[OperatorKind::SPlus, OperatorKind::SMinus, OperatorKind::Sz];

/// Basis of a spin one half lattice with a fixed number of up spins.
/// # Definition
/// One bit per site, set for $\uparrow$ and clear for $\downarrow$. The
/// sector is $(n_\uparrow, N_s-n_\uparrow)$, so $S^z$ is fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinBasis {
    ups: BitBasis,
}

impl SpinBasis {
    /// # Arguments
    /// * __`sites`__ - Number of spins.
    /// * __`nup`__ - Number of up spins.
    /// * __`tables`__ - Shared lookup tables.
    pub fn new(sites: usize, nup: usize, tables: Arc<BasisTables>) -> Result<Self> {
        let ups = BitBasis::new(sites, 1, nup, tables)?;
        trace!("SpinBasis {} sites, {} up, size {}", sites, nup, ups.size());
        Ok(SpinBasis { ups })
    }

    #[inline(always)]
    pub fn state(&self, i: usize) -> Word {
        self.ups.state(i)
    }

    #[inline(always)]
    pub fn perfect_index(&self, ket: Word) -> Option<usize> {
        self.ups.perfect_index(ket)
    }

    #[inline(always)]
    pub fn is_up(&self, ket: Word, site: usize) -> bool {
        self.ups.is_there_an_electron_at(ket, site, 0)
    }

    /// $S^z_i$ of the word, $\pm\frac12$.
    #[inline(always)]
    pub fn sz(&self, ket: Word, site: usize) -> f64 {
        if self.is_up(ket, site) {
            0.5
        } else {
            -0.5
        }
    }

    #[inline(always)]
    pub fn bitmask(&self, site: usize) -> Word {
        self.ups.bitmask(site, 0)
    }
}

impl HilbertBasis for SpinBasis {
    fn size(&self) -> usize {
        self.ups.size()
    }

    fn sector(&self) -> Sector {
        Sector::new(self.ups.particles(), self.ups.sites() - self.ups.particles())
    }

    fn sites(&self) -> usize {
        self.ups.sites()
    }

    fn orbitals(&self) -> usize {
        1
    }

    fn navigator(&self) -> SectorNavigator {
        SectorNavigator::new(self.sites(), 1, SPIN_OPERATORS)
    }

    fn with_sector(&self, sector: Sector) -> Result<Self> {
        if sector.up + sector.down != self.sites() {
            return Err(LanczosError::invalid(format!(
                "Spin sector {} does not cover {} sites.",
                sector,
                self.sites()
            )));
        }
        SpinBasis::new(self.sites(), sector.up, self.ups.tables().clone())
    }

    fn bra_index(
        &self,
        ispace: usize,
        what: OperatorKind,
        site: usize,
        _spin: Spin,
        _orb: usize,
        target: &Self,
    ) -> Result<Option<(usize, f64)>> {
        let ket = self.state(ispace);
        let (bra, value) = match what {
            OperatorKind::SPlus if !self.is_up(ket, site) => (ket ^ self.bitmask(site), 1.0),
            OperatorKind::SMinus if self.is_up(ket, site) => (ket ^ self.bitmask(site), 1.0),
            OperatorKind::SPlus | OperatorKind::SMinus => return Ok(None),
            OperatorKind::Sz => (ket, self.sz(ket, site)),
            _ => return Err(LanczosError::unsupported(what, "SpinBasis::bra_index")),
        };
        match target.perfect_index(bra) {
            Some(i) => Ok(Some((i, value))),
            None => Err(LanczosError::invalid(format!(
                "Operator {} leads outside of target sector {}.",
                what,
                target.sector()
            ))),
        }
    }

    fn split(&self, ispace: usize, site: usize) -> (SplitKey, SplitKey, f64) {
        let ket = self.state(ispace);
        let left_mask: Word = (1 << site) - 1;
        ((ket & left_mask) as SplitKey, (ket >> site) as SplitKey, 1.0)
    }

    fn describe(&self, ispace: usize) -> String {
        let ket = self.state(ispace);
        let all: Word = (1 << self.sites()) - 1;
        render_slots(ket, !ket & all, self.sites())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn basis(sites: usize, nup: usize) -> SpinBasis {
        SpinBasis::new(sites, nup, BasisTables::new(sites).unwrap()).unwrap()
    }

    #[test]
    fn sector_counts_down_spins() {
        let b = basis(4, 1);
        assert_eq!(b.size(), 4);
        assert_eq!(b.sector(), Sector::new(1, 3));
        assert_eq!(b.sector().sz(), -1.0);
    }

    #[test]
    fn describe_shows_arrows() {
        use crate::strings::{DOWNARROW, UPARROW};
        let b = basis(3, 1);
        let k = b.perfect_index(0b001).unwrap();
        assert_eq!(b.describe(k), format!("{}{}{}", UPARROW, DOWNARROW, DOWNARROW));
    }

    #[test]
    fn raising_and_lowering() {
        let b = basis(3, 1);
        let up2 = b.with_sector(Sector::new(2, 1)).unwrap();
        let k = b.perfect_index(0b001).unwrap();
        let (kk, v) = b
            .bra_index(k, OperatorKind::SPlus, 2, Spin::Up, 0, &up2)
            .unwrap()
            .unwrap();
        assert_eq!(up2.state(kk), 0b101);
        assert_eq!(v, 1.0);
        assert!(b
            .bra_index(k, OperatorKind::SPlus, 0, Spin::Up, 0, &up2)
            .unwrap()
            .is_none());
        let (_, sz) = b.bra_index(k, OperatorKind::Sz, 1, Spin::Up, 0, &b).unwrap().unwrap();
        assert_eq!(sz, -0.5);
    }

    #[test]
    fn fermion_operators_are_rejected() {
        let b = basis(3, 1);
        assert!(b.bra_index(0, OperatorKind::C, 0, Spin::Up, 0, &b).is_err());
        assert!(b.with_sector(Sector::new(1, 1)).is_err());
    }
}
