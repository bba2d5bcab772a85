use criterion::{black_box, criterion_group, criterion_main, Criterion};
use market_core::{Generator, RecordStore};

fn bench_generate(c: &mut Criterion) {
    let one_year = Generator::default().years(2024..=2024);
    c.bench_function("generate 1 year", |b| {
        b.iter(|| black_box(one_year.generate().map(|r| r.len())))
    });

    let mut store = RecordStore::new();
    c.bench_function("store regenerate full range", |b| {
        b.iter(|| {
            store.invalidate();
            black_box(store.get().len())
        })
    });
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
