use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use lidarsim::{LidarScanner, Point3, PointRingBuffer, ScanConfig, Scene};

fn scan_pass(c: &mut Criterion) {
    let scene = Scene::demo();
    let origin = Point3::new(0.0, 1.0, 0.0);

    let config = ScanConfig::default();
    let sequential = LidarScanner::from_config(&config).unwrap();
    let parallel = LidarScanner::from_config(&ScanConfig {
        parallel: true,
        ..config.clone()
    })
    .unwrap();

    c.bench_function("scan_50x50_sequential", |b| {
        b.iter(|| sequential.scan(black_box(&origin), &scene))
    });
    c.bench_function("scan_50x50_parallel", |b| {
        b.iter(|| parallel.scan(black_box(&origin), &scene))
    });
}

fn ingest(c: &mut Criterion) {
    let scene = Scene::demo();
    let scanner = LidarScanner::from_config(&ScanConfig::default()).unwrap();
    let output = scanner.scan(&Point3::new(0.0, 1.0, 0.0), &scene);
    let mut buffer = PointRingBuffer::new(250_000).unwrap();

    c.bench_function("ingest_one_scan", |b| {
        b.iter(|| buffer.ingest_all(black_box(&output.records).iter().copied()))
    });
}

criterion_group!(benches, scan_pass, ingest);
criterion_main!(benches);
