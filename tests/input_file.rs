use assert::close;
use num::complex::Complex;
use std::path::Path;

use lanczos::engine::Engine;
use lanczos::geometry::{Geometry, GeometryTable};
use lanczos::lanczos::ProductKind;
use lanczos::models::ModelSelector;
use lanczos::parse::geometry::{build_geometry, is_complex, parse_bonds};
use lanczos::parse::input::InputFile;
use lanczos::LanczosError;

#[test]
fn free_ring_from_files() {
    let input = InputFile::from_path(Path::new("tests/inputs/hubbard_ring.inp")).unwrap();
    assert!(!input.is_complex().unwrap());
    let params = input.model_params().unwrap();
    let lanczos = input.lanczos_params().unwrap();
    assert_eq!(lanczos.seed, 7);
    let geometry: GeometryTable<f64> = input.geometry().unwrap();
    let m = match ModelSelector::new(&params, &geometry).unwrap() {
        ModelSelector::Hubbard(m) => m,
        _ => panic!("expected a Hubbard model"),
    };
    let e = Engine::new(&m, lanczos).unwrap();
    // Levels -2, 0, 0, 2: two electrons per spin fill -2 and 0.
    close(e.gs_energy(), -4.0, 1e-10);
    let options = input.run_options().unwrap();
    assert_eq!(options.rdm_split, Some(2));
}

#[test]
fn complex_bonds_are_detected() {
    let bonds = parse_bonds(Path::new("tests/inputs/flux_ring.csv")).unwrap();
    assert!(is_complex(&bonds));
    let g: GeometryTable<Complex<f64>> = build_geometry(&bonds, 3, &[1]).unwrap();
    assert_eq!(g.coefficient(0, 0, 2, 0, 0), Complex::new(0.0, 1.0));
}

#[test]
fn decoupled_dimers_on_a_ladder() {
    let input = InputFile::from_path(Path::new("tests/inputs/heisenberg_ladder.inp")).unwrap();
    let params = input.model_params().unwrap();
    let lanczos = input.lanczos_params().unwrap();
    assert_eq!(lanczos.product, ProductKind::OnTheFly);
    let geometry: GeometryTable<f64> = input.geometry().unwrap();
    let m = match ModelSelector::new(&params, &geometry).unwrap() {
        ModelSelector::Heisenberg(m) => m,
        _ => panic!("expected a Heisenberg model"),
    };
    // Two singlets along the legs.
    close(Engine::new(&m, lanczos).unwrap().gs_energy(), -1.5, 1e-10);
}

#[test]
fn missing_file_is_an_io_error() {
    match InputFile::from_path(Path::new("tests/inputs/does_not_exist.inp")) {
        Err(LanczosError::Io { .. }) => (),
        _ => panic!("Should have errored."),
    }
}
