use assert::close;
use num::complex::Complex;

use lanczos::bit_basis::BasisTables;
use lanczos::engine::Engine;
use lanczos::geometry::GeometryTable;
use lanczos::lanczos::{ground_state, LanczosParams, ProductKind};
use lanczos::models::{Heisenberg, HubbardOneOrbital, ModelSelector};
use lanczos::params::ModelParams;
use lanczos::sector::Sector;
use lanczos::{OperatorKind, Spin};

#[test]
fn single_electron_on_a_dimer() {
    let g = GeometryTable::chain(2, 1, &[1.0], false).unwrap();
    let p = ModelParams::hubbard(2, Sector::new(1, 0), 0.0);
    let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(2).unwrap()).unwrap();
    let gs = ground_state(&m, &LanczosParams::default()).unwrap();
    close(gs.energy, -1.0, 1e-12);
    close(gs.vector[0].abs(), 1.0 / 2f64.sqrt(), 1e-10);
}

#[test]
fn heisenberg_dimer_singlet() {
    let g = GeometryTable::chain(2, 1, &[1.0, 1.0], false).unwrap();
    let p = ModelParams::heisenberg(2, 1);
    let m = Heisenberg::new(&p, &g, BasisTables::new(2).unwrap()).unwrap();
    let e = Engine::new(&m, LanczosParams::default()).unwrap();
    close(e.gs_energy(), -0.75, 1e-12);
    close(e.reduced_density_matrix(1).unwrap().entanglement_entropy(), 2f64.ln(), 1e-10);
}

#[test]
fn hubbard_ring_products_agree() {
    // Six site ring at half filling, U = 4.
    let g = GeometryTable::chain(6, 1, &[-1.0], true).unwrap();
    let p = ModelParams::hubbard(6, Sector::new(3, 3), 4.0);
    let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(6).unwrap()).unwrap();
    let stored = ground_state(&m, &LanczosParams::default()).unwrap();
    let params = LanczosParams { product: ProductKind::OnTheFly, ..LanczosParams::default() };
    let fly = ground_state(&m, &params).unwrap();
    close(stored.energy, fly.energy, 1e-10);
    assert!(stored.energy < 0.0);
}

#[test]
fn complex_arithmetic_with_real_bonds() {
    let g = GeometryTable::chain(4, 1, &[-1.0], true).unwrap();
    let gc = GeometryTable::chain(4, 1, &[Complex::new(-1.0, 0.0)], true).unwrap();
    let p = ModelParams::hubbard(4, Sector::new(2, 2), 2.0);
    let e_real = match ModelSelector::new(&p, &g).unwrap() {
        ModelSelector::Hubbard(m) => ground_state(&m, &LanczosParams::default()).unwrap().energy,
        _ => panic!("expected a Hubbard model"),
    };
    let e_complex = match ModelSelector::new(&p, &gc).unwrap() {
        ModelSelector::Hubbard(m) => ground_state(&m, &LanczosParams::default()).unwrap().energy,
        _ => panic!("expected a Hubbard model"),
    };
    close(e_real, e_complex, 1e-10);
}

#[test]
fn green_function_weights() {
    let g = GeometryTable::chain(4, 1, &[-1.0], false).unwrap();
    let p = ModelParams::hubbard(4, Sector::new(2, 2), 3.0);
    let m = HubbardOneOrbital::new(&p, &g, false, BasisTables::new(4).unwrap()).unwrap();
    let e = Engine::new(&m, LanczosParams::default()).unwrap();
    let local = e.spectral_function(OperatorKind::C, 0, 0, Spin::Down, (0, 0)).unwrap();
    close(local.weight(), 1.0, 1e-10);
    // c_0 + c_1 and its adjoint anticommute to 2.
    let pair = e.spectral_function(OperatorKind::C, 0, 1, Spin::Down, (0, 0)).unwrap();
    close(pair.weight(), 2.0, 1e-10);
    assert!(e.spectral_function(OperatorKind::SPlus, 0, 0, Spin::Up, (0, 0)).is_err());
}
