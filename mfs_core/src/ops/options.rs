//! Per-call options and their resolution against namespace defaults.

use crate::codec::HashConfig;
use crate::config::MfsConfig;
use crate::error::Result;
use crate::hash::{Algorithm, CidVersion};
use crate::link::LinkOptions;
use std::time::Duration;

/// Options accepted by the mutating operations.
///
/// Unset fields fall back to the namespace's [`MfsConfig`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Create missing intermediate directories.
    pub parents: bool,
    /// Sync the root pointer before returning.
    pub flush: Option<bool>,
    pub hash_alg: Option<Algorithm>,
    pub cid_version: Option<CidVersion>,
    pub shard_split_threshold: Option<usize>,
    /// Allow `rm` to remove directories.
    pub recursive: bool,
    /// Abandon the operation if it has not reached its commit by then.
    pub deadline: Option<Duration>,
}

impl Options {
    pub fn parents() -> Self {
        Self {
            parents: true,
            ..Self::default()
        }
    }

    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }
}

/// Options for [`crate::Mfs::write`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Create the file if it does not exist.
    pub create: bool,
    /// Drop any existing bytes past the written range.
    pub truncate: bool,
    /// Byte offset to write at; gaps are zero-filled.
    pub offset: u64,
    pub options: Options,
}

/// Options after merging with the namespace defaults.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings {
    pub link: LinkOptions,
    pub flush: bool,
    pub parents: bool,
    pub recursive: bool,
    pub deadline: Option<Duration>,
}

impl Settings {
    pub fn resolve(config: &MfsConfig, options: &Options) -> Result<Self> {
        let hash = HashConfig::new(
            options.hash_alg.unwrap_or(config.hash_alg),
            options.cid_version.unwrap_or(config.cid_version),
        )?;

        Ok(Self {
            link: LinkOptions {
                hash,
                shard_split_threshold: options
                    .shard_split_threshold
                    .unwrap_or(config.shard_split_threshold),
                overwrite: false,
                force: false,
            },
            flush: options.flush.unwrap_or(config.flush),
            parents: options.parents,
            recursive: options.recursive,
            deadline: options.deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_config() {
        let config = MfsConfig {
            shard_split_threshold: 7,
            flush: false,
            ..MfsConfig::default()
        };
        let settings = Settings::resolve(&config, &Options::default()).unwrap();
        assert_eq!(settings.link.shard_split_threshold, 7);
        assert!(!settings.flush);
        assert_eq!(settings.link.hash, HashConfig::default());
    }

    #[test]
    fn test_options_override_config() {
        let options = Options {
            hash_alg: Some(Algorithm::Blake3),
            cid_version: Some(CidVersion::V1),
            shard_split_threshold: Some(3),
            flush: Some(false),
            ..Options::parents()
        };
        let settings = Settings::resolve(&MfsConfig::default(), &options).unwrap();
        assert_eq!(settings.link.hash.hash_alg, Algorithm::Blake3);
        assert_eq!(settings.link.shard_split_threshold, 3);
        assert!(settings.parents);
        assert!(!settings.flush);
    }

    #[test]
    fn test_invalid_hash_combination() {
        let options = Options {
            hash_alg: Some(Algorithm::Blake3),
            ..Options::default()
        };
        assert!(Settings::resolve(&MfsConfig::default(), &options).is_err());
    }
}
