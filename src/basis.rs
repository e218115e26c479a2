use crate::errors::Result;
use crate::sector::{Sector, SectorNavigator};
use crate::{OperatorKind, Spin};

/// Key identifying one half of a bipartitioned basis state. Both species fit,
/// the up word in the low 64 bits and the down word in the high ones.
pub type SplitKey = u128;

/// Capabilities shared by every basis flavour.
/// # Purpose
/// The models, the observables and the reduced density matrix only talk to
/// bases through this trait. It is implemented by
/// [FermionBasis](crate::fermion_basis::FermionBasis) for the Hubbard like
/// models and by [SpinBasis](crate::spin_basis::SpinBasis) for spin models.
pub trait HilbertBasis: Sized + Send + Sync {
    /// Dimension of the sector.
    fn size(&self) -> usize;
    fn sector(&self) -> Sector;
    fn sites(&self) -> usize;
    fn orbitals(&self) -> usize;
    /// Sector arithmetic for the operators this basis can apply.
    fn navigator(&self) -> SectorNavigator;
    /// New basis over the same lattice in another sector. Lookup tables are
    /// shared with `self`.
    fn with_sector(&self, sector: Sector) -> Result<Self>;

    /// Sector reached by `what`, see [SectorNavigator::has_new_parts].
    fn has_new_parts(&self, what: OperatorKind, spin: Spin, orbs: (usize, usize)) -> Result<Option<Sector>> {
        self.navigator().has_new_parts(self.sector(), what, spin, orbs)
    }

    /// Applies the one site operator `what` to basis state `ispace`.
    /// # Arguments
    /// * __`ispace`__ - Index of the ket in `self`.
    /// * __`what`__ - Operator to apply.
    /// * __`site`__ - Site it acts on.
    /// * __`spin`__ - Species, ignored by spin flips and $S^z$.
    /// * __`orb`__ - Orbital it acts on.
    /// * __`target`__ - Basis of the bra sector.
    /// # Returns
    /// * __`Some((index, amplitude))`__ - The bra index in `target` and the
    /// matrix element, fermion sign included.
    /// * __`None`__ - The operator annihilates the ket.
    /// # Errors
    /// Operator not supported by this basis, or `target` not in the sector
    /// the operator leads to.
    fn bra_index(
        &self,
        ispace: usize,
        what: OperatorKind,
        site: usize,
        spin: Spin,
        orb: usize,
        target: &Self,
    ) -> Result<Option<(usize, f64)>>;

    /// Cuts state `ispace` between sites `site - 1` and `site`.
    /// # Returns
    /// * __`left`__ - Key of the sites below `site`.
    /// * __`right`__ - Key of the remaining sites.
    /// * __`sign`__ - Reordering sign bringing the operators of each half
    /// next to each other.
    fn split(&self, ispace: usize, site: usize) -> (SplitKey, SplitKey, f64);

    /// Human readable rendering of a basis state.
    fn describe(&self, ispace: usize) -> String;
}
