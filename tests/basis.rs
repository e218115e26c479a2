use lanczos::basis::HilbertBasis;
use lanczos::bit_basis::{BasisTables, BitBasis};
use lanczos::fermion_basis::FermionBasis;
use lanczos::models::FEAS_OPERATORS;
use lanczos::sector::{Sector, SectorNavigator};
use lanczos::{OperatorKind, Spin};

#[test]
fn every_state_is_found_at_its_index() {
    let tables = BasisTables::new(12).unwrap();
    for npart in 0..=12 {
        let b = BitBasis::new(6, 2, npart, tables.clone()).unwrap();
        assert_eq!(b.size(), tables.binomial(12, npart));
        for i in 0..b.size() {
            assert_eq!(b.perfect_index(b.state(i)), Some(i));
            assert_eq!(b.state(i).count_ones() as usize, npart);
        }
        for w in b.states().windows(2) {
            assert!(w[0] < w[1]);
        }
    }
}

#[test]
fn composite_index_decomposes() {
    let tables = BasisTables::new(8).unwrap();
    let b = FermionBasis::new(4, 2, Sector::new(3, 2), FEAS_OPERATORS, tables).unwrap();
    let nup = b.up().size();
    assert_eq!(b.size(), nup * b.down().size());
    for k in 0..b.size() {
        let (up, down) = b.states(k);
        assert_eq!(up, b.up().state(k % nup));
        assert_eq!(down, b.down().state(k / nup));
        assert_eq!(b.perfect_index(up, down), Some(k));
    }
}

#[test]
fn creation_walks_through_sectors() {
    let nav = SectorNavigator::new(2, 1, &[OperatorKind::C, OperatorKind::CDagger]);
    let s = nav.has_new_parts(Sector::new(1, 1), OperatorKind::CDagger, Spin::Up, (0, 0)).unwrap();
    assert_eq!(s, Some(Sector::new(2, 1)));
    let s = nav.has_new_parts(s.unwrap(), OperatorKind::CDagger, Spin::Up, (0, 0)).unwrap();
    assert_eq!(s, None);
    assert!(nav.has_new_parts(Sector::new(1, 1), OperatorKind::N, Spin::Up, (0, 0)).is_err());
}

#[test]
fn bases_in_other_sectors_share_tables() {
    let tables = BasisTables::new(6).unwrap();
    let b = FermionBasis::new(6, 1, Sector::new(3, 3), FEAS_OPERATORS, tables).unwrap();
    let target = b.has_new_parts(OperatorKind::SPlus, Spin::Up, (0, 0)).unwrap().unwrap();
    assert_eq!(target, Sector::new(4, 2));
    let other = b.with_sector(target).unwrap();
    assert_eq!(other.size(), 15 * 15);
    let mut found = 0;
    for k in 0..b.size() {
        if let Some((bra, sign)) = b.bra_index(k, OperatorKind::SPlus, 2, Spin::Up, 0, &other).unwrap() {
            assert!(bra < other.size());
            assert_eq!(sign.abs(), 1.0);
            found += 1;
        }
    }
    // Site 2 must hold a lone down electron.
    assert_eq!(found, 10 * 10);
}
