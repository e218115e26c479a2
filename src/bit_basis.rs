use log::{error, trace};
use std::sync::Arc;

use crate::errors::{LanczosError, Result};
use crate::{OperatorKind, Word, FERMION_SIGN};

/// Largest number of slots a [Word] can hold while keeping one spare bit for
/// the enumeration arithmetic.
pub const MAX_SLOTS: usize = 63;

/// Lookup tables shared by every basis of a run.
/// # Purpose
/// Holds the single bit masks $2^i$ and the binomial coefficients needed to
/// rank a bit pattern. Built once for the largest slot count of the run and
/// handed to the bases behind an [Arc], so that differently sized lattices in
/// the same process never share stale state.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisTables {
    nslots: usize,
    bitmask: Vec<Word>,
    binomial: Vec<Vec<usize>>,
}

impl BasisTables {
    pub fn new(nslots: usize) -> Result<Arc<Self>> {
        if nslots > MAX_SLOTS {
            return Err(LanczosError::invalid(format!(
                "{} slots do not fit in a {} bits word.",
                nslots,
                MAX_SLOTS + 1
            )));
        }
        let bitmask: Vec<Word> = (0..=nslots).map(|i| 1 << i).collect();
        // Pascal's triangle, binomial[n][k] = 0 for k > n.
        let mut binomial = vec![vec![0usize; nslots + 1]; nslots + 1];
        for n in 0..=nslots {
            binomial[n][0] = 1;
            for k in 1..=n {
                binomial[n][k] = binomial[n - 1][k - 1] + if k < n { binomial[n - 1][k] } else { 0 };
            }
        }
        trace!("Built basis tables for {} slots.", nslots);
        Ok(Arc::new(BasisTables { nslots, bitmask, binomial }))
    }

    pub fn nslots(&self) -> usize {
        self.nslots
    }

    #[inline(always)]
    pub fn bitmask(&self, i: usize) -> Word {
        self.bitmask[i]
    }

    /// $\binom{n}{k}$, zero when $k>n$.
    #[inline(always)]
    pub fn binomial(&self, n: usize, k: usize) -> usize {
        if k > n {
            0
        } else {
            self.binomial[n][k]
        }
    }
}

/// Basis of one spin species in a fixed particle number sector.
/// # Definition
/// A state is a [Word] whose bit $s=i\cdot n_{\text{orb}}+a$ marks orbital $a$
/// of site $i$ as occupied. The basis holds every word with exactly
/// `npart` set bits among the `sites * orbitals` lowest bits, in increasing
/// numerical order. The position of a word in that list is its perfect
/// index, computed without search with the combinatorial number system
///
/// $$
/// \text{rank}(w)=\sum_{k=1}^{n}\binom{s_k}{k},\quad s_1<s_2<\dots<s_n
/// $$
///
/// where $s_k$ are the occupied slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BitBasis {
    sites: usize,
    orbitals: usize,
    npart: usize,
    tables: Arc<BasisTables>,
    data: Vec<Word>,
}

impl BitBasis {
    /// Enumerates the sector.
    /// # Arguments
    /// * __`sites`__ - Number of lattice sites.
    /// * __`orbitals`__ - Number of orbitals per site.
    /// * __`npart`__ - Number of particles of this species.
    /// * __`tables`__ - Shared lookup tables, must cover `sites * orbitals`.
    pub fn new(sites: usize, orbitals: usize, npart: usize, tables: Arc<BasisTables>) -> Result<Self> {
        let nslots = sites * orbitals;
        if nslots > tables.nslots() {
            return Err(LanczosError::invalid(format!(
                "Basis of {} slots built with tables for {} slots.",
                nslots,
                tables.nslots()
            )));
        }
        if npart > nslots {
            return Err(LanczosError::invalid(format!(
                "Cannot place {} particles in {} slots.",
                npart, nslots
            )));
        }
        let size = tables.binomial(nslots, npart);
        let mut data: Vec<Word> = Vec::with_capacity(size);
        if npart == 0 {
            data.push(0);
        } else {
            let mut w: Word = (1 << npart) - 1;
            let last: Word = w << (nslots - npart);
            loop {
                data.push(w);
                if w == last {
                    break;
                }
                w = next_permutation(w);
            }
        }
        debug_assert_eq!(data.len(), size);
        trace!(
            "BitBasis sites = {}, orbitals = {}, particles = {}, size = {}",
            sites,
            orbitals,
            npart,
            data.len()
        );
        Ok(BitBasis { sites, orbitals, npart, tables, data })
    }

    /// Dimension $\binom{n_{\text{slots}}}{n}$ of the sector.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn sites(&self) -> usize {
        self.sites
    }

    pub fn orbitals(&self) -> usize {
        self.orbitals
    }

    pub fn nslots(&self) -> usize {
        self.sites * self.orbitals
    }

    pub fn particles(&self) -> usize {
        self.npart
    }

    pub fn tables(&self) -> &Arc<BasisTables> {
        &self.tables
    }

    /// The $i$-th state, in increasing order.
    #[inline(always)]
    pub fn state(&self, i: usize) -> Word {
        self.data[i]
    }

    pub fn states(&self) -> &[Word] {
        &self.data
    }

    /// Rank of `ket` in the sector. `None` if the word does not belong to the
    /// sector.
    pub fn perfect_index(&self, ket: Word) -> Option<usize> {
        if ket.count_ones() as usize != self.npart || (ket >> self.nslots()) != 0 {
            return None;
        }
        let mut rank = 0;
        let mut w = ket;
        let mut k = 1;
        while w != 0 {
            let pos = w.trailing_zeros() as usize;
            rank += self.tables.binomial(pos, k);
            k += 1;
            w &= w - 1;
        }
        Some(rank)
    }

    #[inline(always)]
    pub fn slot(&self, site: usize, orb: usize) -> usize {
        site * self.orbitals + orb
    }

    #[inline(always)]
    pub fn bitmask(&self, site: usize, orb: usize) -> Word {
        self.tables.bitmask(self.slot(site, orb))
    }

    /// Occupation, 0 or 1, of orbital `orb` at `site`.
    #[inline(always)]
    pub fn get_n(&self, ket: Word, site: usize, orb: usize) -> usize {
        usize::from(self.is_there_an_electron_at(ket, site, orb))
    }

    #[inline(always)]
    pub fn is_there_an_electron_at(&self, ket: Word, site: usize, orb: usize) -> bool {
        ket & self.bitmask(site, orb) != 0
    }

    /// Number of particles in the word.
    #[inline(always)]
    pub fn electrons(&self, ket: Word) -> usize {
        ket.count_ones() as usize
    }

    /// Sign of the two operator string moving a particle between slots
    /// $(i, a)$ and $(j, b)$.
    /// # Definition
    /// Parity of the occupied slots strictly between the two positions,
    /// multiplied by [FERMION_SIGN] when the start slot $(i,a)$ is occupied.
    /// The caller compensates the start slot factor so that the hop carries
    /// $(-1)^{n_{\text{between}}}$ in both directions.
    /// # Panics
    /// When $i>j$, the caller is in charge of the ordering.
    pub fn do_sign(&self, ket: Word, i: usize, orb1: usize, j: usize, orb2: usize) -> f64 {
        if i > j {
            error!("do_sign called with i = {} > j = {}, ket = {:b}", i, j, ket);
            panic!("do_sign requires i <= j, got i = {}, j = {}", i, j);
        }
        let a = self.slot(i, orb1);
        let b = self.slot(j, orb2);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let mut sign = self.parity(ket & self.mask_between(lo, hi));
        if ket & self.tables.bitmask(a) != 0 {
            sign *= FERMION_SIGN;
        }
        sign
    }

    /// Sign of a single creation or annihilation operator at `(site, orb)`:
    /// parity of the occupied slots below it.
    pub fn do_sign_gf(&self, ket: Word, site: usize, orb: usize) -> f64 {
        let slot = self.slot(site, orb);
        self.parity(ket & (self.tables.bitmask(slot) - 1))
    }

    /// Applies `what` to `ket` at `(site, orb)`.
    /// # Returns
    /// * __`Some(bra)`__ - The resulting word.
    /// * __`None`__ - The operator annihilates the state.
    /// # Errors
    /// Operators other than `C`, `CDagger` and `N` are not single species.
    pub fn get_bra(&self, ket: Word, what: OperatorKind, site: usize, orb: usize) -> Result<Option<Word>> {
        let mask = self.bitmask(site, orb);
        let occupied = ket & mask != 0;
        match what {
            OperatorKind::C => Ok(if occupied { Some(ket ^ mask) } else { None }),
            OperatorKind::CDagger => Ok(if occupied { None } else { Some(ket ^ mask) }),
            OperatorKind::N => Ok(if occupied { Some(ket) } else { None }),
            _ => Err(LanczosError::unsupported(what, "BitBasis::get_bra")),
        }
    }

    /// Mask of the slots strictly between `lo` and `hi`.
    #[inline(always)]
    fn mask_between(&self, lo: usize, hi: usize) -> Word {
        if hi <= lo + 1 {
            return 0;
        }
        self.tables.bitmask(hi) - self.tables.bitmask(lo + 1)
    }

    #[inline(always)]
    fn parity(&self, w: Word) -> f64 {
        if w.count_ones() & 1 == 1 {
            FERMION_SIGN
        } else {
            1.0
        }
    }
}

/// Next word with the same number of set bits, in increasing order.
#[inline(always)]
fn next_permutation(w: Word) -> Word {
    let c = w & w.wrapping_neg();
    let r = w + c;
    (((r ^ w) >> 2) / c) | r
}
