use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use xpi_manifest::VersionEntry;
use xpi_manifest::merge::partition_updates;
use xpi_manifest::version::compare;

fn compare_benchmark(c: &mut Criterion) {
    c.bench_function("version::compare (numeric)", |b| {
        b.iter(|| compare(black_box("1.10.3.4"), black_box("1.10.3.12")))
    });

    c.bench_function("version::compare (pre-release)", |b| {
        b.iter(|| compare(black_box("2.0b12"), black_box("2.0pre3")))
    });
}

fn partition_benchmark(c: &mut Criterion) {
    let history: Vec<VersionEntry> = (0..500)
        .map(|i| {
            let version = format!("1.{}.{}", i / 10, i % 10);
            let link = format!("https://cdn/ext-{version}.xpi");
            let fields = json!({"version": version, "update_link": link});
            VersionEntry::from(fields.as_object().cloned().unwrap_or_default())
        })
        .collect();

    c.bench_function("merge::partition_updates (500 entries)", |b| {
        b.iter(|| partition_updates(black_box(history.clone()), black_box("1.25.5")))
    });
}

criterion_group!(benches, compare_benchmark, partition_benchmark);
criterion_main!(benches);
