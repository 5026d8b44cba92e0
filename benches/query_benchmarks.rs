use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mapquery::prelude::*;
use mapquery::{Feature, collect_candidates};

fn build_store(features: u32) -> FeatureStore {
    let mut writer = StoreWriter::new(
        rect(-180.0, -90.0, 180.0, 90.0),
        ScaleRange::new(0, 17).unwrap(),
    )
    .unwrap();
    for i in 0..features {
        let x = -179.0 + f64::from(i % 359);
        let y = -89.0 + f64::from((i * 7) % 179);
        let coarse = vec![coord! { x: x, y: y }, coord! { x: x + 0.8, y: y + 0.4 }];
        let fine = vec![
            coord! { x: x, y: y },
            coord! { x: x + 0.3, y: y + 0.25 },
            coord! { x: x + 0.8, y: y + 0.4 },
        ];
        writer
            .add_feature(i % 16, &[((i % 9) as u8, coarse), (10 + (i % 5) as u8, fine)])
            .unwrap();
    }
    FeatureStore::from_bytes(writer.finish()).unwrap()
}

fn count<S: FeatureSource>(source: &S, r: &Rect<f64>) -> usize {
    let mut n = 0;
    source
        .for_each_feature(r, |_: &Feature| {
            n += 1;
            Ok(())
        })
        .unwrap();
    n
}

fn benchmark_range_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_queries");

    let store = build_store(20_000);
    let filter = VisibilityFilter::new(|_: u32, _: u8| true);
    let index = IndexedSource::build(&store, &filter, &IndexConfig::default()).unwrap();
    let linear = LinearScanSource::new(&store, &filter, index.scale_mapper());

    let queries = [
        ("world", rect(-180.0, -90.0, 180.0, 90.0)),
        ("region", rect(-10.0, -10.0, 10.0, 10.0)),
        ("street", rect(3.0, 3.0, 3.05, 3.05)),
    ];

    for (name, r) in queries {
        group.bench_with_input(BenchmarkId::new("indexed", name), &r, |b, r| {
            b.iter(|| count(&index, black_box(r)))
        });
        group.bench_with_input(BenchmarkId::new("linear", name), &r, |b, r| {
            b.iter(|| count(&linear, black_box(r)))
        });
    }

    group.finish();
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for size in [1_000u32, 10_000] {
        let store = build_store(size);
        let filter = VisibilityFilter::new(|_: u32, _: u8| true);
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| IndexedSource::build(black_box(store), &filter, &IndexConfig::default()).unwrap())
        });
    }

    group.finish();
}

fn benchmark_collect_and_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    group.sample_size(10);

    let store = build_store(2_000);
    let filter = VisibilityFilter::new(|type_id: u32, scale: u8| type_id < 8 || scale >= 6);
    let index = IndexedSource::build(&store, &filter, &IndexConfig::default()).unwrap();

    let r = rect(-20.0, -20.0, 20.0, 20.0);
    group.bench_function("collect_candidates", |b| {
        b.iter(|| collect_candidates(&index, black_box(&r), true).unwrap())
    });

    let small = build_store(200);
    let small_index = IndexedSource::build(&small, &filter, &IndexConfig::default()).unwrap();
    let small_linear = LinearScanSource::new(&small, &filter, small_index.scale_mapper());
    group.bench_function("full_run", |b| {
        b.iter(|| {
            RangeQueryValidator::new(&small, &small_index, &small_linear)
                .unwrap()
                .with_check_determinism(false)
                .run()
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_range_queries,
    benchmark_index_build,
    benchmark_collect_and_validate
);
criterion_main!(benches);
