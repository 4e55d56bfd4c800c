//! Benchmarks for gtv-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gtv_core::{decode, encode, Gtv, GtvMerkleHashCalculator, GtvMerkleProofTree, GtvPath, GtvPathSet};

fn block(txs: usize) -> Gtv {
    Gtv::dict([
        ("height", Gtv::Integer(1_000_000)),
        ("previous", Gtv::bytes(vec![0xAB; 32])),
        (
            "txs",
            Gtv::Array(
                (0..txs)
                    .map(|i| {
                        Gtv::dict([
                            ("nonce", Gtv::Integer(i as i64)),
                            ("payload", Gtv::bytes(vec![i as u8; 96])),
                        ])
                    })
                    .collect(),
            ),
        ),
    ])
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for txs in [10, 100, 1000].iter() {
        let value = block(*txs);
        let bytes = encode(&value);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", txs), &value, |b, value| {
            b.iter(|| encode(black_box(value)))
        });

        group.bench_with_input(BenchmarkId::new("decode", txs), &bytes, |b, bytes| {
            b.iter(|| decode(black_box(bytes)))
        });
    }

    group.finish();
}

fn bench_merkle_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_hash");
    let calc = GtvMerkleHashCalculator::sha256();

    for txs in [10, 100, 1000].iter() {
        let value = block(*txs);
        group.bench_with_input(BenchmarkId::new("sha256", txs), &value, |b, value| {
            b.iter(|| value.merkle_hash(&calc))
        });
    }

    // repeated roots are served from the memo table
    let cached = GtvMerkleHashCalculator::sha256().with_cache(16);
    let value = block(1000);
    group.bench_function("sha256_cached/1000", |b| b.iter(|| value.merkle_hash(&cached)));

    group.finish();
}

fn bench_proof(c: &mut Criterion) {
    let calc = GtvMerkleHashCalculator::sha256();
    let value = block(1000);
    let root = value.merkle_hash(&calc);
    let paths = GtvPathSet::new([GtvPath::root().child("txs").child(517usize)]);

    c.bench_function("proof_build/1000", |b| {
        b.iter(|| value.generate_proof(&paths, &calc))
    });

    let bytes = value.generate_proof(&paths, &calc).map(|p| p.serialize());
    if let Ok(bytes) = bytes {
        c.bench_function("proof_verify_serialized/1000", |b| {
            b.iter(|| {
                GtvMerkleProofTree::deserialize(black_box(&bytes))
                    .map(|proof| proof.verify(&root, &calc))
            })
        });
    }
}

criterion_group!(benches, bench_codec, bench_merkle_hash, bench_proof);
criterion_main!(benches);
