//! # ACL Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | SHA-224 over the stored blob, 256-byte chunks | bounded memory, linear time |
//! | Credential lookup on a scan | well under the 20 ms poll interval |

use ac_01_acl_integrity::digest_reader;
use ac_04_controller::find_record;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::TagId;
use std::time::Duration;

/// A CSV list with `members` rows.
fn acl_blob(members: TagId) -> Vec<u8> {
    let mut blob = b"tag,name,allowed\n".to_vec();
    for tag in 0..members {
        let allowed = if tag % 7 == 0 { "denied" } else { "allowed" };
        blob.extend(format!("{tag:010},Member {tag},{allowed}\n").into_bytes());
    }
    blob
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ac-01-digest");
    group.measurement_time(Duration::from_secs(5));

    for members in [100, 1_000, 10_000] {
        let blob = acl_blob(members);
        group.throughput(Throughput::Bytes(blob.len() as u64));
        group.bench_with_input(BenchmarkId::new("sha224_stream", members), &blob, |b, blob| {
            b.iter(|| digest_reader(black_box(blob.as_slice())))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("ac-04-credentials");

    for members in [100, 1_000, 10_000] {
        let blob = acl_blob(members);
        // Worst case: the last member, and a tag that is not listed.
        group.bench_with_input(BenchmarkId::new("last_member", members), &blob, |b, blob| {
            b.iter(|| find_record(black_box(blob), members - 1))
        });
        group.bench_with_input(BenchmarkId::new("unknown_tag", members), &blob, |b, blob| {
            b.iter(|| find_record(black_box(blob), TagId::MAX))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_digest, bench_lookup);
criterion_main!(benches);
