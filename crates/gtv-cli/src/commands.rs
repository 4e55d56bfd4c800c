//! Command-line interface and command handlers

use crate::config::{load_config, Overrides};
use crate::error::{CliError, Result};
use clap::{Args, Parser, Subcommand};
use gtv_core::{
    decode_with_limits, encode, text::parse_with_limits, verify, verify_with_paths, ArrayMerge,
    CodecLimits, DictMerge, Gtv, GtvBuilder, GtvConfig, GtvMerkleHashCalculator,
    GtvMerkleProofTree, GtvPathSet, Hash,
};
use gtv_crypto::DigestAlgorithm;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

#[derive(Parser, Debug)]
#[command(name = "gtv")]
#[command(about = "Encode, hash and prove Generic Transfer Values")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "GTV_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Digest used for Merkle hashing
    #[arg(long, env = "GTV_DIGEST", global = true)]
    pub digest: Option<DigestAlgorithm>,

    /// Maximum nesting depth accepted from input
    #[arg(long, env = "GTV_MAX_DEPTH", global = true)]
    pub max_depth: Option<usize>,

    /// Maximum encoded size accepted from input
    #[arg(long, env = "GTV_MAX_BYTES", global = true)]
    pub max_bytes: Option<usize>,

    /// Memoized root hashes; 0 disables memoization
    #[arg(long, env = "GTV_CACHE_CAPACITY", global = true)]
    pub cache_capacity: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, env = "GTV_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a value and print the hex of its canonical bytes
    Encode(ValueInput),

    /// Decode hex bytes and print the value in text syntax
    Decode {
        /// Hex of an encoded value, or `-` to read stdin
        #[arg(default_value = "-")]
        hex: String,

        /// Indent nested containers
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the Merkle root hash of a value
    Hash(ValueInput),

    /// Build a proof disclosing the given paths and print its hex
    Prove {
        #[command(flatten)]
        input: ValueInput,

        /// Path to disclose, e.g. `/txs/3`; repeat or separate with commas
        #[arg(short, long = "path", required = true)]
        paths: Vec<String>,
    },

    /// Check a serialized proof against a root hash
    Verify {
        /// Hex of a serialized proof, or `-` to read stdin
        #[arg(default_value = "-")]
        proof: String,

        /// Expected root hash in hex
        #[arg(short, long)]
        root: String,

        /// Also check that recorded paths match the tree shape
        #[arg(long)]
        check_paths: bool,

        /// Print the disclosed values
        #[arg(long)]
        show: bool,
    },

    /// Merge values left to right and print the result
    Merge {
        /// Values in text syntax
        #[arg(required = true)]
        values: Vec<String>,

        /// How arrays combine
        #[arg(long, default_value = "append")]
        array_merge: ArrayMerge,

        /// How dictionaries combine
        #[arg(long, default_value = "keep-new")]
        dict_merge: DictMerge,
    },
}

#[derive(Args, Debug)]
pub struct ValueInput {
    /// Value in text syntax, or `-` to read stdin
    #[arg(default_value = "-")]
    pub value: String,

    /// The input is the hex of an encoded value
    #[arg(long)]
    pub hex: bool,
}

/// How a command ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The proof did not match the expected root
    Mismatch,
}

impl Cli {
    /// Resolve the effective configuration
    pub fn load_config(&self) -> Result<GtvConfig> {
        let mut config = load_config(self.config.as_deref())?;
        Overrides {
            digest: self.digest,
            max_depth: self.max_depth,
            max_bytes: self.max_bytes,
            cache_capacity: self.cache_capacity,
        }
        .apply(&mut config);
        Ok(config)
    }
}

/// Run a parsed command, reading `-` inputs from `stdin`
#[instrument(skip_all)]
pub fn run(cli: &Cli, stdin: &mut dyn Read, out: &mut dyn Write) -> Result<Outcome> {
    let config = cli.load_config()?;
    debug!(
        digest = %config.merkle.digest,
        max_depth = config.codec.max_depth,
        "configuration loaded"
    );
    let limits = config.codec;
    let calc = GtvMerkleHashCalculator::from_config(&config.merkle);

    match &cli.command {
        Command::Encode(input) => {
            let value = read_value(input, &limits, stdin)?;
            writeln!(out, "{}", hex::encode(encode(&value)))?;
        }
        Command::Decode { hex, pretty } => {
            let bytes = hex::decode(read_arg(hex, stdin)?)?;
            let value = decode_with_limits(&bytes, &limits)?;
            if *pretty {
                writeln!(out, "{value:#}")?;
            } else {
                writeln!(out, "{value}")?;
            }
        }
        Command::Hash(input) => {
            let value = read_value(input, &limits, stdin)?;
            writeln!(out, "{}", value.merkle_hash(&calc).to_hex())?;
        }
        Command::Prove { input, paths } => {
            let value = read_value(input, &limits, stdin)?;
            let mut set = GtvPathSet::empty();
            for list in paths {
                set.extend(list.parse::<GtvPathSet>()?.iter().cloned());
            }
            let proof = value.generate_proof(&set, &calc)?;
            info!(paths = %set, "proof built");
            writeln!(out, "{}", hex::encode(proof.serialize()))?;
        }
        Command::Verify {
            proof,
            root,
            check_paths,
            show,
        } => {
            let bytes = hex::decode(read_arg(proof, stdin)?)?;
            let proof = GtvMerkleProofTree::deserialize_with_limits(&bytes, &limits)?;
            let root = Hash::from_hex(root.trim())
                .map_err(|e| CliError::Input(format!("invalid root hash: {e}")))?;
            let valid = if *check_paths {
                verify_with_paths(&proof, &root, &calc)?
            } else {
                verify(&proof, &root, &calc)
            };
            if !valid {
                writeln!(out, "invalid")?;
                return Ok(Outcome::Mismatch);
            }
            writeln!(out, "valid")?;
            if *show {
                for (path, value) in proof.disclosed_values() {
                    writeln!(out, "{path} = {value}")?;
                }
            }
        }
        Command::Merge {
            values,
            array_merge,
            dict_merge,
        } => {
            let mut builder = GtvBuilder::default()
                .with_array_merge(*array_merge)
                .with_dict_merge(*dict_merge);
            for text in values {
                builder.merge(parse_with_limits(text, &limits)?)?;
            }
            writeln!(out, "{}", builder.build())?;
        }
    }
    Ok(Outcome::Success)
}

fn read_arg(arg: &str, stdin: &mut dyn Read) -> Result<String> {
    if arg != "-" {
        return Ok(arg.trim().to_string());
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf)?;
    Ok(buf.trim().to_string())
}

fn read_value(input: &ValueInput, limits: &CodecLimits, stdin: &mut dyn Read) -> Result<Gtv> {
    let text = read_arg(&input.value, stdin)?;
    if input.hex {
        let bytes = hex::decode(&text)?;
        return Ok(decode_with_limits(&bytes, limits)?);
    }
    if text.is_empty() {
        return Err(CliError::Input("empty value".to_string()));
    }
    Ok(parse_with_limits(&text, limits)?)
}
