//! # GTV CLI
//!
//! The `gtv` command-line tool over [`gtv_core`]:
//!
//! - **encode / decode**: text syntax to canonical bytes and back
//! - **hash**: Merkle root of a value
//! - **prove / verify**: selective-disclosure proofs
//! - **merge**: layered configuration documents
//!
//! Values are given in the text syntax (`{"height": 7, "txs": [x"ab"]}`) or,
//! with `--hex`, as the hex of their encoding. Binary output is printed as hex.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{run, Cli, Command, Outcome};
pub use error::{CliError, Result};
