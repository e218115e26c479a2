use log::trace;
use std::sync::Arc;

use crate::basis::{HilbertBasis, SplitKey};
use crate::bit_basis::{BasisTables, BitBasis};
use crate::errors::{LanczosError, Result};
use crate::sector::{Sector, SectorNavigator};
use crate::strings::render_slots;
use crate::{OperatorKind, Spin, Word, FERMION_SIGN};

/// Basis of spin up times spin down electrons.
/// # Definition
/// The global index of the pair $(w_\uparrow, w_\downarrow)$ is
///
/// $$
/// k=\text{rank}_\uparrow(w_\uparrow)+\text{rank}_\downarrow(w_\downarrow)\,D_\uparrow
/// $$
///
/// with $D_\uparrow$ the size of the up sector. The fermionic order puts every
/// up operator to the left of every down operator, so a down operator crosses
/// all the up electrons.
#[derive(Debug, Clone, PartialEq)]
pub struct FermionBasis {
    up: BitBasis,
    down: BitBasis,
    supported: &'static [OperatorKind],
}

impl FermionBasis {
    /// # Arguments
    /// * __`sites`__ - Number of lattice sites.
    /// * __`orbitals`__ - Orbitals per site.
    /// * __`sector`__ - Number of up and down electrons.
    /// * __`supported`__ - One site operators the owning model allows.
    /// * __`tables`__ - Shared lookup tables.
    pub fn new(
        sites: usize,
        orbitals: usize,
        sector: Sector,
        supported: &'static [OperatorKind],
        tables: Arc<BasisTables>,
    ) -> Result<Self> {
        let up = BitBasis::new(sites, orbitals, sector.up, tables.clone())?;
        let down = BitBasis::new(sites, orbitals, sector.down, tables)?;
        trace!(
            "FermionBasis sector {} of size {} x {}",
            sector,
            up.size(),
            down.size()
        );
        Ok(FermionBasis { up, down, supported })
    }

    pub fn up(&self) -> &BitBasis {
        &self.up
    }

    pub fn down(&self) -> &BitBasis {
        &self.down
    }

    pub fn species(&self, spin: Spin) -> &BitBasis {
        match spin {
            Spin::Up => &self.up,
            Spin::Down => &self.down,
        }
    }

    pub fn nslots(&self) -> usize {
        self.up.nslots()
    }

    /// The pair of words of global index `i`.
    #[inline(always)]
    pub fn states(&self, i: usize) -> (Word, Word) {
        let n = self.up.size();
        (self.up.state(i % n), self.down.state(i / n))
    }

    /// The word of species `spin` of global index `i`.
    #[inline(always)]
    pub fn get(&self, i: usize, spin: Spin) -> Word {
        let n = self.up.size();
        match spin {
            Spin::Up => self.up.state(i % n),
            Spin::Down => self.down.state(i / n),
        }
    }

    /// Global index of a pair of words, the inverse of [FermionBasis::states].
    #[inline(always)]
    pub fn perfect_index(&self, up: Word, down: Word) -> Option<usize> {
        let iu = self.up.perfect_index(up)?;
        let id = self.down.perfect_index(down)?;
        Some(iu + id * self.up.size())
    }

    #[inline(always)]
    pub fn get_n(&self, up: Word, down: Word, site: usize, spin: Spin, orb: usize) -> usize {
        usize::from(self.is_there_an_electron_at(up, down, site, spin, orb))
    }

    #[inline(always)]
    pub fn is_there_an_electron_at(&self, up: Word, down: Word, site: usize, spin: Spin, orb: usize) -> bool {
        match spin {
            Spin::Up => self.up.is_there_an_electron_at(up, site, orb),
            Spin::Down => self.down.is_there_an_electron_at(down, site, orb),
        }
    }

    /// Two operator sign within species `spin`, see [BitBasis::do_sign].
    #[inline(always)]
    pub fn do_sign(&self, up: Word, down: Word, i: usize, orb1: usize, j: usize, orb2: usize, spin: Spin) -> f64 {
        match spin {
            Spin::Up => self.up.do_sign(up, i, orb1, j, orb2),
            Spin::Down => self.down.do_sign(down, i, orb1, j, orb2),
        }
    }

    /// One operator sign. A down operator also crosses every up electron.
    pub fn do_sign_gf(&self, up: Word, down: Word, site: usize, spin: Spin, orb: usize) -> f64 {
        match spin {
            Spin::Up => self.up.do_sign_gf(up, site, orb),
            Spin::Down => {
                let s = if up.count_ones() & 1 == 1 { FERMION_SIGN } else { 1.0 };
                s * self.down.do_sign_gf(down, site, orb)
            }
        }
    }

    /// Sign of $S^+_{ia}S^-_{jb}$ and of its reverse for the same ket.
    /// # Definition
    /// Product of the up and down two operator signs, with the sites put in
    /// order first. Exactly one species has its start slot occupied, so the
    /// result is $-(-1)^{n^\uparrow_{\text{between}}+n^\downarrow_{\text{between}}}$.
    pub fn spin_flip_sign(&self, up: Word, down: Word, i: usize, orb1: usize, j: usize, orb2: usize) -> f64 {
        if i > j {
            return self.spin_flip_sign(up, down, j, orb2, i, orb1);
        }
        self.up.do_sign(up, i, orb1, j, orb2) * self.down.do_sign(down, i, orb1, j, orb2)
    }

    fn locate(&self, target: &Self, up: Word, down: Word, what: OperatorKind) -> Result<usize> {
        target.perfect_index(up, down).ok_or_else(|| {
            LanczosError::invalid(format!(
                "Operator {} leads outside of target sector {}.",
                what,
                target.sector()
            ))
        })
    }
}

impl HilbertBasis for FermionBasis {
    fn size(&self) -> usize {
        self.up.size() * self.down.size()
    }

    fn sector(&self) -> Sector {
        Sector::new(self.up.particles(), self.down.particles())
    }

    fn sites(&self) -> usize {
        self.up.sites()
    }

    fn orbitals(&self) -> usize {
        self.up.orbitals()
    }

    fn navigator(&self) -> SectorNavigator {
        SectorNavigator::new(self.nslots(), self.orbitals(), self.supported)
    }

    fn with_sector(&self, sector: Sector) -> Result<Self> {
        FermionBasis::new(
            self.sites(),
            self.orbitals(),
            sector,
            self.supported,
            self.up.tables().clone(),
        )
    }

    fn bra_index(
        &self,
        ispace: usize,
        what: OperatorKind,
        site: usize,
        spin: Spin,
        orb: usize,
        target: &Self,
    ) -> Result<Option<(usize, f64)>> {
        if !self.navigator().supports(what) {
            return Err(LanczosError::unsupported(what, "FermionBasis::bra_index"));
        }
        let (up, down) = self.states(ispace);
        match what {
            OperatorKind::C | OperatorKind::CDagger | OperatorKind::N => {
                let bra = self.species(spin).get_bra(self.get(ispace, spin), what, site, orb)?;
                let bra = match bra {
                    Some(b) => b,
                    None => return Ok(None),
                };
                let (bu, bd) = match spin {
                    Spin::Up => (bra, down),
                    Spin::Down => (up, bra),
                };
                let sign = if what == OperatorKind::N {
                    1.0
                } else {
                    self.do_sign_gf(up, down, site, spin, orb)
                };
                Ok(Some((self.locate(target, bu, bd, what)?, sign)))
            }
            OperatorKind::Sz => {
                let nu = self.get_n(up, down, site, Spin::Up, orb) as f64;
                let nd = self.get_n(up, down, site, Spin::Down, orb) as f64;
                let sz = 0.5 * (nu - nd);
                if sz == 0.0 {
                    return Ok(None);
                }
                Ok(Some((self.locate(target, up, down, what)?, sz)))
            }
            OperatorKind::SPlus | OperatorKind::SMinus => {
                // S+ moves a down electron to up, S- the reverse.
                let (from, to) = if what == OperatorKind::SPlus {
                    (Spin::Down, Spin::Up)
                } else {
                    (Spin::Up, Spin::Down)
                };
                if !self.is_there_an_electron_at(up, down, site, from, orb)
                    || self.is_there_an_electron_at(up, down, site, to, orb)
                {
                    return Ok(None);
                }
                let mask = self.up.bitmask(site, orb);
                let mut sign = self.do_sign_gf(up, down, site, Spin::Up, orb)
                    * self.do_sign_gf(up, down, site, Spin::Down, orb);
                if what == OperatorKind::SMinus {
                    sign *= FERMION_SIGN;
                }
                Ok(Some((self.locate(target, up ^ mask, down ^ mask, what)?, sign)))
            }
            OperatorKind::Nil => Err(LanczosError::unsupported(what, "FermionBasis::bra_index")),
        }
    }

    fn split(&self, ispace: usize, site: usize) -> (SplitKey, SplitKey, f64) {
        let (up, down) = self.states(ispace);
        let cut = site * self.orbitals();
        let left_mask: Word = (1 << cut) - 1;
        let (ul, ur) = (up & left_mask, up >> cut);
        let (dl, dr) = (down & left_mask, down >> cut);
        let crossings = ur.count_ones() * dl.count_ones();
        let sign = if crossings & 1 == 1 { FERMION_SIGN } else { 1.0 };
        let left = (ul as SplitKey) | ((dl as SplitKey) << 64);
        let right = (ur as SplitKey) | ((dr as SplitKey) << 64);
        (left, right, sign)
    }

    fn describe(&self, ispace: usize) -> String {
        let (up, down) = self.states(ispace);
        render_slots(up, down, self.nslots())
    }
}
