use criterion::{criterion_group, BenchmarkId, Criterion};
use lanczos::bit_basis::BasisTables;
use lanczos::geometry::GeometryTable;
use lanczos::models::{HubbardOneOrbital, ModelHamiltonian};
use lanczos::params::ModelParams;
use lanczos::scalar::Scalar;
use lanczos::sector::Sector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const MAX_SITES: usize = 10;

pub fn bench_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("Produit matrice vecteur Hubbard");
    group.significance_level(0.1).sample_size(20);
    let mut rng = SmallRng::seed_from_u64(42);

    for sites in (4..=MAX_SITES).step_by(2) {
        let geometry = GeometryTable::chain(sites, 1, &[-1.0], true).unwrap();
        let params = ModelParams::hubbard(sites, Sector::new(sites / 2, sites / 2), 4.0);
        let model = HubbardOneOrbital::new(&params, &geometry, false, BasisTables::new(sites).unwrap()).unwrap();
        let basis = model.basis();
        let y: Vec<f64> = (0..basis_size(&model)).map(|_| f64::sample(&mut rng)).collect();
        let matrix = model.setup_hamiltonian(basis);
        let mut x = vec![0.0; y.len()];

        group.bench_with_input(BenchmarkId::new("Assemblage", sites), &sites, |b, _| {
            b.iter(|| model.setup_hamiltonian(basis))
        });
        group.bench_with_input(BenchmarkId::new("Stockée", sites), &sites, |b, _| {
            b.iter(|| matrix.matrix_vector_product(&mut x, &y))
        });
        group.bench_with_input(BenchmarkId::new("À la volée", sites), &sites, |b, _| {
            b.iter(|| model.matrix_vector_product(&mut x, &y, basis))
        });
    }
    group.finish();
}

fn basis_size<M: ModelHamiltonian<f64>>(model: &M) -> usize {
    use lanczos::basis::HilbertBasis;
    model.basis().size()
}

criterion_group!(benches, bench_products,);
