//! Confirmation proof example
//!
//! This example demonstrates:
//! - Proving that a transaction is part of a block without revealing the rest
//! - Sending the proof as bytes and verifying it against the block RID
//! - Rejecting the proof against a different RID
//!
//! Run with: cargo run --example confirmation_proof

use gtv_core::{
    verify, verify_with_paths, Gtv, GtvMerkleHashCalculator, GtvMerkleProofTree, GtvPathSet,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🔐 GTV - Confirmation Proof Example\n");

    let block: Gtv = r#"{
        "header": {"height": 42, "timestamp": 1700000000000},
        "transactions": [
            ["transfer", "alice", "bob", 10],
            ["transfer", "bob", "carol", 3],
            ["register", "dave", x"deadbeef"]
        ],
        "witness": [x"0a0b0c", x"0d0e0f"]
    }"#
    .parse()?;

    let calc = GtvMerkleHashCalculator::sha256().with_cache(64);
    let rid = block.merkle_hash(&calc);
    println!("🔑 Block RID: {}", rid.to_hex());

    // ==================== Prover ====================

    let paths: GtvPathSet = "/transactions/1, /header/height".parse()?;
    println!("\n📤 Proving {paths}");
    let proof = block.generate_proof(&paths, &calc)?;
    let wire = proof.serialize();
    println!(
        "   {} bytes, {} hashed subtrees",
        wire.len(),
        proof.hashed_leaf_count()
    );

    // ==================== Verifier ====================

    println!("\n📥 Verifying against the RID...");
    let received = GtvMerkleProofTree::deserialize(&wire)?;
    if verify_with_paths(&received, &rid, &calc)? {
        println!("   ✅ Proof is valid");
        for (path, value) in received.disclosed_values() {
            println!("   - {path} = {value}");
        }
    } else {
        println!("   ❌ Proof does not match");
    }

    let other: Gtv = r#"{"header": {"height": 43}}"#.parse()?;
    let other_rid = other.merkle_hash(&calc);
    println!(
        "\n🚫 Against another block's RID: {}",
        if verify(&received, &other_rid, &calc) { "valid" } else { "rejected" }
    );

    Ok(())
}
