//! CLI configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML/JSON/YAML
//! file, then `GTV__`-prefixed environment variables (`GTV__CODEC__MAX_DEPTH`,
//! `GTV__MERKLE__DIGEST`, ...), then command-line flags.

use crate::error::Result;
use config::{Config, Environment, File};
use gtv_core::GtvConfig;
use gtv_crypto::DigestAlgorithm;
use std::path::Path;
use tracing::debug;

/// Command-line overrides applied on top of the loaded configuration
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub digest: Option<DigestAlgorithm>,
    pub max_depth: Option<usize>,
    pub max_bytes: Option<usize>,
    pub cache_capacity: Option<usize>,
}

/// Load the configuration from defaults, an optional file and the environment
pub fn load_config(file: Option<&Path>) -> Result<GtvConfig> {
    let mut builder = Config::builder().add_source(Config::try_from(&GtvConfig::default())?);
    if let Some(path) = file {
        debug!(path = %path.display(), "loading configuration file");
        builder = builder.add_source(File::from(path));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("GTV")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(config.try_deserialize()?)
}

impl Overrides {
    pub fn apply(&self, config: &mut GtvConfig) {
        if let Some(digest) = self.digest {
            config.merkle.digest = digest;
        }
        if let Some(max_depth) = self.max_depth {
            config.codec.max_depth = max_depth;
        }
        if let Some(max_bytes) = self.max_bytes {
            config.codec.max_bytes = max_bytes;
        }
        if let Some(capacity) = self.cache_capacity {
            config.merkle.cache_capacity = capacity;
        }
    }
}
