//! Benchmarks for directory scanning and fingerprinting
//!
//! Every sync run scans and fingerprints each source level and its
//! destination counterpart, so these two steps dominate a no-op run.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use sticksync_core::{DirectoryScanner, DirectorySnapshot, Entry, Fingerprinter, SyncEngine};
use sticksync_tests::configure_criterion;
use sticksync_tests::test_utils::{write_file, SyncFixture};
use sticksync_types::{EntryKind, FingerprintStrategy, NullReporter};
use std::sync::Arc;

fn synthetic_snapshot(entries: usize) -> DirectorySnapshot {
    let entries = (0..entries)
        .map(|i| {
            if i % 10 == 0 {
                Entry::new(format!("Disc {i:04}"), EntryKind::Directory, 0)
            } else {
                Entry::new(format!("{i:04} - Track.mp3"), EntryKind::File, 4_000_000 + i as u64)
            }
        })
        .collect();
    DirectorySnapshot::from_entries("/stick", entries)
}

/// Benchmark the size fingerprint over in-memory listings
fn bench_size_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_fingerprint");
    let fingerprinter = Fingerprinter::new(FingerprintStrategy::Size);

    for entries in [10usize, 100, 1_000] {
        let snapshot = synthetic_snapshot(entries);
        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &snapshot, |b, snapshot| {
            b.iter(|| black_box(fingerprinter.fingerprint(snapshot).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark scanning plus fingerprinting of a real directory
fn bench_scan_and_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_and_fingerprint");
    let scanner = DirectoryScanner::default();

    for files in [10usize, 100] {
        let fixture = SyncFixture::new();
        for i in 0..files {
            write_file(&fixture.source, &format!("{i:03}.mp3"), 1024);
        }

        for (name, strategy) in [
            ("size", FingerprintStrategy::Size),
            ("content", FingerprintStrategy::Content),
        ] {
            let fingerprinter = Fingerprinter::new(strategy);
            group.bench_with_input(BenchmarkId::new(name, files), &fixture.source, |b, root| {
                b.iter(|| {
                    let snapshot = scanner.scan(root).unwrap();
                    black_box(fingerprinter.fingerprint(&snapshot).unwrap())
                });
            });
        }
    }

    group.finish();
}

/// Benchmark a sync run that finds nothing to do
fn bench_noop_sync(c: &mut Criterion) {
    let fixture = SyncFixture::new();
    for disc in 0..5 {
        for track in 0..20 {
            write_file(&fixture.source, &format!("disc{disc}/{track:02}.mp3"), 512);
        }
    }

    let engine = SyncEngine::new().with_reporter(Arc::new(NullReporter));
    engine.sync(&fixture.source, &fixture.destination).unwrap();

    c.bench_function("noop_sync_100_files", |b| {
        b.iter(|| black_box(engine.sync(&fixture.source, &fixture.destination).unwrap()));
    });
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_size_fingerprint, bench_scan_and_fingerprint, bench_noop_sync
}
criterion_main!(benches);
