use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minstride::{DenseArray, FuncOpts, NumericKind, OpName, Scalar, dispatch};

const SIDE: usize = 512;

fn grid(seed: f64) -> DenseArray<f64> {
    let values = (0..SIDE * SIDE).map(|i| seed + (i % 97) as f64 * 0.5).collect();
    DenseArray::from_shape_vec(&[SIDE, SIDE], values).unwrap()
}

pub fn traversal_benchmark(c: &mut Criterion) {
    let a = grid(1.0);
    let b = grid(2.0);
    let at = a.transpose(&[1, 0]).unwrap();
    let col = DenseArray::filled(&[SIDE, 1], 3.0f64);

    let mut group = c.benchmark_group("Add f64 512x512");
    let cases: [(&str, DenseArray<f64>, DenseArray<f64>, bool); 3] = [
        ("contiguous", a.clone(), b.clone(), false),
        ("transposed", at, b.clone(), false),
        ("broadcast column", a.clone(), col, true),
    ];
    for (name, lhs, rhs, broadcast) in cases.iter() {
        group.bench_with_input(BenchmarkId::new("dispatch", name), name, |bench, _| {
            bench.iter(|| {
                dispatch(
                    OpName::Add,
                    NumericKind::Float64,
                    black_box(lhs.clone()).into(),
                    black_box(rhs.clone()).into(),
                    FuncOpts::new().broadcast(*broadcast),
                )
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("Mul f64 scalar");
    group.bench_function("fresh", |bench| {
        bench.iter(|| {
            dispatch(
                OpName::Mul,
                NumericKind::Float64,
                black_box(a.clone()).into(),
                Scalar::from(2.0f64).into(),
                FuncOpts::new(),
            )
        })
    });
    group.bench_function("increment", |bench| {
        bench.iter(|| {
            dispatch(
                OpName::Mul,
                NumericKind::Float64,
                black_box(a.clone()).into(),
                Scalar::from(2.0f64).into(),
                FuncOpts::new().with_increment(b.clone().into()),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, traversal_benchmark);
criterion_main!(benches);
