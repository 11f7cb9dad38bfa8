use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flucast::core::bins::{expand_bin, find_bin_index, infer_point, slice_sum_bins};
use flucast::{Bin, TargetId};

/// Standard 131-bin percent distribution: 0.1-wide bins over [0, 13).
fn percent_bins() -> Vec<Bin> {
    let n = 131;
    (0..n)
        .map(|i| Bin::interval(i as f64 * 0.1, (i + 1) as f64 * 0.1, 1.0 / n as f64))
        .collect()
}

fn bench_find_bin(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin_lookup");

    let bins = percent_bins();
    for value in [0.05f64, 6.55, 12.95] {
        group.bench_with_input(BenchmarkId::new("percent", value.to_string()), &value, |b, &v| {
            b.iter(|| find_bin_index(black_box(&bins), black_box(Some(v)), TargetId::WeekAhead1));
        });
    }

    group.finish();
}

fn bench_expand_and_infer(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin_ops");

    let bins = percent_bins();
    group.bench_function("expand_neighbours", |b| {
        b.iter(|| {
            for idx in 0..bins.len() {
                black_box(expand_bin(black_box(&bins), idx, TargetId::Peak));
            }
        });
    });

    group.bench_function("infer_point", |b| {
        b.iter(|| black_box(infer_point(black_box(&bins))));
    });

    group.bench_function("slice_sum", |b| {
        b.iter(|| black_box(slice_sum_bins(black_box(&bins), 5)));
    });

    group.finish();
}

criterion_group!(benches, bench_find_bin, bench_expand_and_infer);
criterion_main!(benches);
