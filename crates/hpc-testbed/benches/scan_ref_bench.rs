use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hpc_testbed::udd::{UddtM3, m2_equal_to, mix_m3};
use hpc_testbed::{inclusive_scan_by_key, staircase_keys, suite::m2_staircase};
use std::hint::black_box;

fn bench_scan_ref(c: &mut Criterion) {
    let mut group = c.benchmark_group("inclusive_scan_by_key_ref");
    for n in [1usize << 10, 1 << 16, 1 << 20] {
        let keys = staircase_keys(n, 0_i32, |k| k + 1);
        let vals = vec![1_i32; n];
        group.bench_with_input(BenchmarkId::new("i32_add", n), &n, |b, _| {
            b.iter(|| {
                inclusive_scan_by_key(black_box(&keys), black_box(&vals), |a, b| a == b, |a, b| a + b)
                    .unwrap()
            });
        });
    }

    // Schlüssel mit Toleranzvergleich, gemischte Werte
    let n = 1 << 16;
    let keys = m2_staircase(n);
    let vals = vec![UddtM3::INITIAL_MIX; n];
    group.bench_function("m3_mix_65536", |b| {
        b.iter(|| inclusive_scan_by_key(black_box(&keys), black_box(&vals), m2_equal_to, mix_m3).unwrap());
    });
    group.finish();
}

// Diese Zeilen sind notwendig, damit Criterion den Benchmark ausführt
criterion_group!(benches, bench_scan_ref);
criterion_main!(benches);
