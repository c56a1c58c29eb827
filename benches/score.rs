use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hspsyn::libs::frame::score_pair;
use hspsyn::libs::resolve::resolve_partition;
use hspsyn::libs::segment::Segment;
use hspsyn::libs::sub_matrix::SubMatrix;

/// Random nucleotides, with every 7th base of the copy mutated
fn sequence_pair(len: usize, seed: u64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let seq1: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
    let seq2 = seq1
        .iter()
        .enumerate()
        .map(|(i, &b)| if i % 7 == 0 { b'A' } else { b })
        .collect();
    (seq1, seq2)
}

fn segments(n: usize) -> Vec<Segment> {
    (0..n)
        .map(|i| {
            let start = i * 40;
            Segment {
                target_id: "I".to_string(),
                query_id: "I".to_string(),
                target_start: start,
                target_end: start + 99,
                query_start: start,
                query_end: start + 99,
                score: (i % 13) as i32 + 1,
                ..Default::default()
            }
        })
        .collect()
}

fn bench_score_pair(c: &mut Criterion) {
    let blosum62 = SubMatrix::from_name("blosum62").unwrap();
    let mut group = c.benchmark_group("score_pair");

    for len in [90, 900, 9000] {
        let (seq1, seq2) = sequence_pair(len, 42);
        group.throughput(Throughput::Bytes(len as u64));

        group.bench_with_input(BenchmarkId::new("match_mismatch", len), &len, |b, _| {
            b.iter(|| score_pair(black_box(&seq1), black_box(&seq2), None))
        });
        group.bench_with_input(BenchmarkId::new("blosum62", len), &len, |b, _| {
            b.iter(|| score_pair(black_box(&seq1), black_box(&seq2), Some(&blosum62)))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_partition");

    for n in [100, 10000] {
        let segs = segments(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &segs, |b, segs| {
            b.iter(|| resolve_partition(black_box(segs.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score_pair, bench_resolve);
criterion_main!(benches);
