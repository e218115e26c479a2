use log::{debug, trace};

use crate::errors::{LanczosError, Result};
use crate::scalar::Scalar;

/// Read only table of couplings between lattice slots.
/// # Definition
/// A geometry is a function $(i, a, j, b, \tau)\mapsto C^\tau_{ia,jb}$ for
/// sites $i,j$, orbitals $a,b$ and term $\tau$. Models decide what each term
/// means, hoppings, exchange or density-density couplings.
pub trait Geometry<S>: Send + Sync {
    fn number_of_sites(&self) -> usize;
    fn terms(&self) -> usize;
    /// Orbitals per site used by `term`.
    fn orbitals(&self, term: usize) -> usize;
    fn coefficient(&self, i: usize, orb1: usize, j: usize, orb2: usize, term: usize) -> S;
}

/// Dense geometry table.
/// # Usage
/// Start from [GeometryTable::new] and fill bonds with
/// [GeometryTable::set_bond], or use the [GeometryTable::chain] and
/// [GeometryTable::ladder] builders. Setting a bond also sets its hermitian
/// conjugate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryTable<S> {
    sites: usize,
    orbitals: Vec<usize>,
    data: Vec<Vec<S>>,
}

impl<S: Scalar> GeometryTable<S> {
    /// Empty table.
    /// # Arguments
    /// * __`sites`__ - Number of sites.
    /// * __`orbitals`__ - Orbitals per site for each term, its length is the
    /// number of terms.
    pub fn new(sites: usize, orbitals: &[usize]) -> Self {
        let data = orbitals
            .iter()
            .map(|&o| vec![S::zero(); (sites * o) * (sites * o)])
            .collect();
        GeometryTable { sites, orbitals: orbitals.to_vec(), data }
    }

    #[inline(always)]
    fn offset(&self, i: usize, orb1: usize, j: usize, orb2: usize, term: usize) -> usize {
        let n = self.sites * self.orbitals[term];
        let a = orb1 + i * self.orbitals[term];
        let b = orb2 + j * self.orbitals[term];
        a + b * n
    }

    fn check(&self, i: usize, orb1: usize, j: usize, orb2: usize, term: usize) -> Result<()> {
        if term >= self.orbitals.len() {
            return Err(LanczosError::Geometry {
                details: format!("term {} but only {} terms", term, self.orbitals.len()),
            });
        }
        if i >= self.sites || j >= self.sites {
            return Err(LanczosError::Geometry {
                details: format!("bond ({}, {}) outside of {} sites", i, j, self.sites),
            });
        }
        let o = self.orbitals[term];
        if orb1 >= o || orb2 >= o {
            return Err(LanczosError::Geometry {
                details: format!("orbitals ({}, {}) outside of {} orbitals", orb1, orb2, o),
            });
        }
        Ok(())
    }

    /// Sets $C^\tau_{ia,jb}=v$ and $C^\tau_{jb,ia}=v^*$.
    pub fn set_bond(&mut self, term: usize, i: usize, orb1: usize, j: usize, orb2: usize, value: S) -> Result<()> {
        self.check(i, orb1, j, orb2, term)?;
        if i == j && orb1 == orb2 && value.im() != 0.0 {
            return Err(LanczosError::Geometry {
                details: format!("complex on-site coupling at site {}", i),
            });
        }
        let ab = self.offset(i, orb1, j, orb2, term);
        let ba = self.offset(j, orb2, i, orb1, term);
        self.data[term][ab] = value;
        self.data[term][ba] = value.conj();
        trace!("Bond term {} ({}, {}) - ({}, {}) = {}", term, i, orb1, j, orb2, value);
        Ok(())
    }

    /// Open or periodic chain with orbital diagonal nearest neighbour bonds.
    /// # Arguments
    /// * __`sites`__ - Chain length.
    /// * __`orbitals`__ - Orbitals per site, same for every term.
    /// * __`couplings`__ - One bond value per term.
    /// * __`periodic`__ - Close the chain between the last and first site.
    pub fn chain(sites: usize, orbitals: usize, couplings: &[S], periodic: bool) -> Result<Self> {
        let mut g = GeometryTable::new(sites, &vec![orbitals; couplings.len()]);
        for (term, &t) in couplings.iter().enumerate() {
            for i in 0..sites.saturating_sub(1) {
                for orb in 0..orbitals {
                    g.set_bond(term, i, orb, i + 1, orb, t)?;
                }
            }
            // Two sites would double the single bond.
            if periodic && sites > 2 {
                for orb in 0..orbitals {
                    g.set_bond(term, sites - 1, orb, 0, orb, t)?;
                }
            }
        }
        debug!("Chain of {} sites, {} terms, periodic = {}", sites, couplings.len(), periodic);
        Ok(g)
    }

    /// Ladder with `legs` sites per rung, site $x\cdot\text{legs}+y$.
    /// # Arguments
    /// * __`sites`__ - Total number of sites, a multiple of `legs`.
    /// * __`legs`__ - Sites per rung.
    /// * __`orbitals`__ - Orbitals per site.
    /// * __`along`__ - Bond value along the legs, one per term.
    /// * __`rung`__ - Bond value along the rungs, one per term.
    pub fn ladder(sites: usize, legs: usize, orbitals: usize, along: &[S], rung: &[S]) -> Result<Self> {
        if legs == 0 || sites % legs != 0 || along.len() != rung.len() {
            return Err(LanczosError::Geometry {
                details: format!("ladder of {} sites with {} legs", sites, legs),
            });
        }
        let mut g = GeometryTable::new(sites, &vec![orbitals; along.len()]);
        let length = sites / legs;
        for term in 0..along.len() {
            for x in 0..length {
                for y in 0..legs {
                    let i = x * legs + y;
                    for orb in 0..orbitals {
                        if x + 1 < length {
                            g.set_bond(term, i, orb, i + legs, orb, along[term])?;
                        }
                        if y + 1 < legs {
                            g.set_bond(term, i, orb, i + 1, orb, rung[term])?;
                        }
                    }
                }
            }
        }
        debug!("Ladder of {} x {} sites, {} terms", length, legs, along.len());
        Ok(g)
    }
}

impl<S: Scalar> Geometry<S> for GeometryTable<S> {
    fn number_of_sites(&self) -> usize {
        self.sites
    }

    fn terms(&self) -> usize {
        self.orbitals.len()
    }

    fn orbitals(&self, term: usize) -> usize {
        self.orbitals[term]
    }

    #[inline(always)]
    fn coefficient(&self, i: usize, orb1: usize, j: usize, orb2: usize, term: usize) -> S {
        self.data[term][self.offset(i, orb1, j, orb2, term)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num::complex::Complex;

    #[test]
    fn chain_bonds() {
        let g = GeometryTable::chain(4, 1, &[1.0], true).unwrap();
        assert_eq!(g.number_of_sites(), 4);
        assert_eq!(g.terms(), 1);
        assert_eq!(g.coefficient(0, 0, 1, 0, 0), 1.0);
        assert_eq!(g.coefficient(1, 0, 0, 0, 0), 1.0);
        assert_eq!(g.coefficient(3, 0, 0, 0, 0), 1.0);
        assert_eq!(g.coefficient(0, 0, 2, 0, 0), 0.0);
        let g = GeometryTable::chain(2, 1, &[1.0], true).unwrap();
        assert_eq!(g.coefficient(0, 0, 1, 0, 0), 1.0);
    }

    #[test]
    fn bonds_are_hermitian() {
        let mut g = GeometryTable::new(3, &[2]);
        g.set_bond(0, 0, 1, 2, 0, Complex::new(1.0, 2.0)).unwrap();
        assert_eq!(g.coefficient(2, 0, 0, 1, 0), Complex::new(1.0, -2.0));
        assert!(g.set_bond(0, 0, 2, 1, 0, Complex::new(1.0, 0.0)).is_err());
        assert!(g.set_bond(1, 0, 0, 1, 0, Complex::new(1.0, 0.0)).is_err());
        assert!(g.set_bond(0, 1, 0, 1, 0, Complex::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn ladder_rungs_and_legs() {
        let g = GeometryTable::ladder(6, 2, 1, &[1.0], &[0.5]).unwrap();
        assert_eq!(g.coefficient(0, 0, 1, 0, 0), 0.5);
        assert_eq!(g.coefficient(0, 0, 2, 0, 0), 1.0);
        assert_eq!(g.coefficient(1, 0, 2, 0, 0), 0.0);
        assert!(GeometryTable::ladder(5, 2, 1, &[1.0], &[0.5]).is_err());
    }
}
