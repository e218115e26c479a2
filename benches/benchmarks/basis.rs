use criterion::{black_box, criterion_group, Criterion};
use lanczos::bit_basis::{BasisTables, BitBasis};

pub fn perfect_index(c: &mut Criterion) {
    let tables = BasisTables::new(20).unwrap();
    let basis = BitBasis::new(20, 1, 10, tables).unwrap();
    c.bench_function("Perfect index 20 slots 10 particles", |b| {
        b.iter(|| {
            let mut acc = 0;
            for &w in basis.states().iter().step_by(97) {
                acc += basis.perfect_index(black_box(w)).unwrap_or(0);
            }
            acc
        })
    });
}

criterion_group!(benches, perfect_index,);
