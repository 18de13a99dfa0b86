use criterion::{Criterion, criterion_group, criterion_main};

fn bench_full_generate(c: &mut Criterion) {
    c.bench_function("generate_full_128", |b| {
        b.iter(|| {
            let _ = passgen_lib::generate::generate(128, "full");
        })
    });
}

fn bench_digits_generate(c: &mut Criterion) {
    c.bench_function("generate_digits_8", |b| {
        b.iter(|| {
            let _ = passgen_lib::generate::generate(8, "digits");
        })
    });
}

criterion_group!(benches, bench_full_generate, bench_digits_generate);
criterion_main!(benches);
