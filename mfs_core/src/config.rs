//! Namespace configuration and the `config` file format.
//!
//! ```text
//! version=1
//! hash_alg=sha2-256
//! cid_version=0
//! shard_split_threshold=1000
//! flush=true
//! ```

use crate::codec::HashConfig;
use crate::error::{Error, Result};
use crate::hash::{Algorithm, CidVersion};

/// Default number of entries a flat directory may hold before sharding.
pub const DEFAULT_SHARD_SPLIT_THRESHOLD: usize = 1000;

/// Defaults applied to every operation on a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MfsConfig {
    pub hash_alg: Algorithm,
    pub cid_version: CidVersion,
    pub shard_split_threshold: usize,
    /// Sync the root pointer to disk on every publish.
    pub flush: bool,
}

impl Default for MfsConfig {
    fn default() -> Self {
        Self {
            hash_alg: Algorithm::Sha2_256,
            cid_version: CidVersion::V0,
            shard_split_threshold: DEFAULT_SHARD_SPLIT_THRESHOLD,
            flush: true,
        }
    }
}

impl MfsConfig {
    pub fn hash_config(&self) -> Result<HashConfig> {
        HashConfig::new(self.hash_alg, self.cid_version)
    }

    /// Render the config file.
    pub fn to_file_string(&self) -> String {
        format!(
            "version=1\nhash_alg={}\ncid_version={}\nshard_split_threshold={}\nflush={}\n",
            self.hash_alg.as_str(),
            self.cid_version.as_u8(),
            self.shard_split_threshold,
            self.flush
        )
    }

    /// Parse a config file. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self> {
        let mut version = None;
        let mut config = MfsConfig::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::invalid_params(format!("Malformed config line: {}", line)));
            };
            let value = value.trim();

            match key.trim() {
                "version" => version = Some(value.to_string()),
                "hash_alg" => config.hash_alg = Algorithm::parse(value)?,
                "cid_version" => {
                    let v = value.parse::<u8>().map_err(|_| {
                        Error::invalid_params(format!("Invalid cid_version: {}", value))
                    })?;
                    config.cid_version = CidVersion::from_u8(v)?;
                }
                "shard_split_threshold" => {
                    config.shard_split_threshold = value.parse::<usize>().map_err(|_| {
                        Error::invalid_params(format!("Invalid shard_split_threshold: {}", value))
                    })?;
                }
                "flush" => {
                    config.flush = value.parse::<bool>().map_err(|_| {
                        Error::invalid_params(format!("Invalid flush: {}", value))
                    })?;
                }
                other => {
                    return Err(Error::invalid_params(format!(
                        "Unknown config key: {}",
                        other
                    )));
                }
            }
        }

        // Validate version
        if version.as_deref() != Some("1") {
            return Err(Error::invalid_params(format!(
                "Unsupported config version: {:?}",
                version
            )));
        }

        config.hash_config()?;
        Ok(config)
    }
}
