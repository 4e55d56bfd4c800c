//! Block RID example
//!
//! This example demonstrates:
//! - Building a block header as a GTV dictionary
//! - Encoding it to canonical bytes and decoding it back
//! - Computing its RID (the Merkle root) with SHA-256 and BLAKE3
//! - Showing that insertion order does not change the RID
//!
//! Run with: cargo run --example block_rid

use gtv_core::{decode, encode, Gtv, GtvConfig, GtvMerkleHashCalculator};
use gtv_crypto::DigestAlgorithm;

fn header(fields: Vec<(&str, Gtv)>) -> Gtv {
    Gtv::dict(fields)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🧱 GTV - Block RID Example\n");

    let fields = vec![
        ("blockchain_rid", Gtv::bytes(vec![0x78; 32])),
        ("previous_block_rid", Gtv::bytes(vec![0x9a; 32])),
        ("merkle_root", Gtv::bytes(vec![0x01; 32])),
        ("timestamp", Gtv::Integer(1_700_000_000_000)),
        ("height", Gtv::Integer(42)),
        ("dependencies", Gtv::Null),
    ];
    let block = header(fields.clone());
    println!("📋 Header:\n{block:#}\n");

    // ==================== Encoding ====================

    let bytes = encode(&block);
    println!("📦 Encoded to {} bytes", bytes.len());
    println!("   {}", hex::encode(&bytes[..16.min(bytes.len())]));
    let decoded = decode(&bytes)?;
    println!("   ✅ Decodes to the same value: {}", decoded == block);

    // ==================== Hashing ====================

    let sha = GtvMerkleHashCalculator::sha256();
    let rid = block.merkle_hash(&sha);
    println!("\n🔑 RID (sha256): {}", rid.to_hex());

    let mut config = GtvConfig::default();
    config.merkle.digest = DigestAlgorithm::Blake3;
    let blake = GtvMerkleHashCalculator::from_config(&config.merkle);
    println!("🔑 RID (blake3): {}", block.merkle_hash(&blake).to_hex());

    let reversed = header(fields.into_iter().rev().collect());
    println!(
        "\n🔁 Reversed insertion order gives the same RID: {}",
        reversed.merkle_hash(&sha) == rid
    );

    Ok(())
}
