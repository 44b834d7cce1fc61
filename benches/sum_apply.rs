use criterion::{black_box, Criterion, criterion_group, criterion_main};
use faer::Mat;
use lazyop::{ArrayOperator, IdentityOperator, Operator, add, scale};

fn bench_sum_apply(c: &mut Criterion) {
    let n = 200;
    let a = Mat::from_fn(n, n, |i, j| ((i * n + j) as f64).sin());
    let b = Mat::from_fn(n, n, |i, j| ((i + j * n) as f64).cos());
    let x: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let mut y = vec![0.0; n];

    let a: Operator<f64> = ArrayOperator::from(a).into();
    let b: Operator<f64> = ArrayOperator::from(b).into();
    let mut op = add(vec![scale(0.5, a), scale(-2.0, b), IdentityOperator::new(n).into()]).unwrap();

    c.bench_function("lazyop sum apply (allocating)", |ben| {
        ben.iter(|| {
            let _y = op.apply(black_box(&x)).unwrap();
        })
    });

    c.bench_function("lazyop sum apply_into (scratch)", |ben| {
        ben.iter(|| {
            op.apply_into(black_box(&x), black_box(&mut y)).unwrap();
        })
    });
}

criterion_group!(benches, bench_sum_apply);
criterion_main!(benches);
