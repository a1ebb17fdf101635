use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spmd_sieve::partition::partition;
use spmd_sieve::sieve::{sieve_segment, BaseSieve};
use spmd_sieve::{reference, run, RunConfig};

fn bench_base_sieve_1e12(c: &mut Criterion) {
    // b = 10^6
    c.bench_function("BaseSieve::new(10^12)", |b| {
        b.iter(|| BaseSieve::new(black_box(1_000_000_000_000)));
    });
}

fn bench_segment_sieve(c: &mut Criterion) {
    let n = 10_000_000u64;
    let base = BaseSieve::new(n).primes();
    let seg = partition(n, 4, 2);
    c.bench_function("sieve_segment(10^7, P=4, rank=2)", |b| {
        b.iter(|| sieve_segment(black_box(&base), black_box(seg)));
    });
}

fn bench_reference_1m(c: &mut Criterion) {
    c.bench_function("reference::primes_up_to(1_000_000)", |b| {
        b.iter(|| reference::primes_up_to(black_box(1_000_000)));
    });
}

fn bench_distributed_1m(c: &mut Criterion) {
    let mut group = c.benchmark_group("run(10^6)");
    for workers in [1usize, 2, 4, 8] {
        let config = RunConfig::new(workers, 1_000_000).unwrap();
        group.bench_function(format!("P={}", workers), |b| {
            b.iter(|| run(black_box(&config)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_base_sieve_1e12,
    bench_segment_sieve,
    bench_reference_1m,
    bench_distributed_1m,
);
criterion_main!(benches);
