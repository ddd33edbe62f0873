//! Benchmarks for broadcasting operations
//!
//! Compares zero-stride broadcasting against pre-expanded operands

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{ArrayD, IxDyn};
use numlite_core::{broadcast_shapes, ops::MathOps, ArrayData, Operand};
use numlite_cpu::{broadcast_binary_op, ReferenceBackend};

/// Generate a random array of given shape
fn random_array(shape: &[usize]) -> ArrayD<f64> {
    use rand::Rng;
    let len: usize = shape.iter().product();
    let mut rng = rand::rng();
    let data: Vec<f64> = (0..len).map(|_| rng.random::<f64>()).collect();
    ArrayD::from_shape_vec(IxDyn(shape), data).unwrap()
}

fn random_array_data(shape: &[usize]) -> ArrayData {
    let data = random_array(shape);
    ArrayData::from_vec(data.iter().copied().collect::<Vec<f64>>(), shape.to_vec()).unwrap()
}

fn bench_broadcasting_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcasting_add");

    let sizes = [
        (vec![100, 100], vec![100]),       // Matrix + row vector
        (vec![1000, 1000], vec![1000]),    // Large matrix + row vector
        (vec![100, 100], vec![100, 1]),    // Matrix + column vector
        (vec![1000, 1000], vec![1000, 1]), // Large matrix + column vector
        (vec![1000, 1], vec![1, 1000]),    // Outer product style
    ];

    for (shape_a, shape_b) in sizes.iter() {
        let a = random_array(shape_a);
        let b = random_array(shape_b);
        let id = format!("{:?}_+_{:?}", shape_a, shape_b);

        group.bench_with_input(
            BenchmarkId::new("broadcast", &id),
            &(&a, &b),
            |bench, (a, b)| {
                bench.iter(|| black_box(broadcast_binary_op(a, b, |x, y| x + y).unwrap()));
            },
        );

        let output_shape = broadcast_shapes(shape_a, shape_b).unwrap();
        let a_expanded = a.broadcast(IxDyn(&output_shape)).unwrap().to_owned();
        let b_expanded = b.broadcast(IxDyn(&output_shape)).unwrap().to_owned();

        group.bench_with_input(
            BenchmarkId::new("manual_expand", &id),
            &(a_expanded, b_expanded),
            |bench, (a, b)| {
                bench.iter(|| black_box(a + b));
            },
        );
    }

    group.finish();
}

fn bench_backend_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("backend_add");
    let backend = ReferenceBackend::new();

    for size in [100usize, 500, 1000].iter() {
        let matrix = random_array_data(&[*size, *size]);
        let row = random_array_data(&[*size]);

        group.bench_with_input(
            BenchmarkId::new("array_row", size),
            &(&matrix, &row),
            |bench, (m, r)| {
                bench.iter(|| black_box(backend.add(m, Operand::Array(r)).unwrap()));
            },
        );

        group.bench_with_input(BenchmarkId::new("scalar", size), &matrix, |bench, m| {
            bench.iter(|| black_box(backend.add(m, Operand::Scalar(1.5)).unwrap()));
        });

        let transposed = matrix.transposed();
        group.bench_with_input(
            BenchmarkId::new("strided_view", size),
            &transposed,
            |bench, t| {
                bench.iter(|| black_box(backend.add(t, Operand::Scalar(1.5)).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_broadcasting_add, bench_backend_dispatch);
criterion_main!(benches);
