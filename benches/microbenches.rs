//! Criterion microbenches for document parsing, remapping, and label
//! formatting.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::path::Path;

use labelprep::coco::io::from_coco_str;
use labelprep::labels::format_label_line;
use labelprep::mapping::CategoryIndexMap;
use labelprep::remap::remap_document;

// Small inline fixture with sparse ids, mirroring a real SDG export.
const COCO_FIXTURE: &str = r#"{
    "images": [
        {"id": 1, "width": 1280, "height": 720, "file_name": "rgb_0001.png"},
        {"id": 2, "width": 1280, "height": 720, "file_name": "rgb_0002.png"},
        {"id": 3, "width": 1280, "height": 720, "file_name": "rgb_0003.png"}
    ],
    "categories": [
        {"id": 201, "name": "other"},
        {"id": 17, "name": "pallet"},
        {"id": 44, "name": "crate"}
    ],
    "annotations": [
        {"image_id": 1, "category_id": 17, "bbox": [100.0, 200.0, 50.0, 40.0]},
        {"image_id": 1, "category_id": 44, "bbox": [400.0, 100.0, 80.0, 90.0]},
        {"image_id": 2, "category_id": 201, "bbox": [0.0, 0.0, 1280.0, 720.0], "iscrowd": 1},
        {"image_id": 3, "category_id": 17, "bbox": [640.0, 360.0, 100.0, 100.0]}
    ],
    "info": {"description": "bench fixture"}
}"#;

/// Benchmark COCO JSON parsing from string.
fn bench_coco_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("coco_parse");
    group.throughput(Throughput::Bytes(COCO_FIXTURE.len() as u64));

    group.bench_function("from_coco_str", |b| {
        b.iter(|| {
            let document = from_coco_str(black_box(COCO_FIXTURE)).unwrap();
            black_box(document)
        })
    });

    group.finish();
}

/// Benchmark a full document remap (clone included, matching how the
/// prepare flow uses it).
fn bench_remap(c: &mut Criterion) {
    let document = from_coco_str(COCO_FIXTURE).unwrap();
    let index_map =
        CategoryIndexMap::from_categories(&document.categories, Path::new("bench.json")).unwrap();

    let mut group = c.benchmark_group("remap");
    group.bench_function("remap_document", |b| {
        b.iter(|| {
            let mut working = document.clone();
            let outcome = remap_document(&mut working, black_box(&index_map), &[]);
            black_box(outcome)
        })
    });
    group.finish();
}

/// Benchmark single label line formatting.
fn bench_label_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("labels");
    group.bench_function("format_label_line", |b| {
        b.iter(|| {
            let line = format_label_line(
                black_box(2),
                black_box(&[100.0, 200.0, 50.0, 40.0]),
                1280,
                720,
            );
            black_box(line)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_coco_parse,
    bench_remap,
    bench_label_line
);
criterion_main!(benches);
