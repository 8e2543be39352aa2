//! # Run Configuration
//!
//! A YAML file describing the latent layout of one sampler run. Every
//! field is optional in the file so CLI flags can fill or override it;
//! [`RunConfig::resolve`] applies defaults and rejects what is still
//! missing.
//!
//! ```yaml
//! chain_column: chain__
//! reference_chain: 1
//! dims: 2
//! fit_scale: true
//! persons: { prefix: xi, count: 120 }
//! items:   { prefix: zt_centered, count: 40 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lsirt_align::{AlignError, LatentFamily, LatentLayout, ProcrustesOptions};
use lsirt_core::ChainId;

/// Chain column name used when none is configured.
pub const DEFAULT_CHAIN_COLUMN: &str = "chain";

/// Person coordinate prefix used when none is configured.
pub const DEFAULT_PERSON_PREFIX: &str = "xi";

/// Item coordinate prefix used when none is configured.
pub const DEFAULT_ITEM_PREFIX: &str = "zt_centered";

/// One coordinate family as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyConfig {
    /// Column prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Entity count.
    #[serde(default)]
    pub count: Option<usize>,
}

impl FamilyConfig {
    fn merged(self, overrides: FamilyConfig) -> Self {
        Self {
            prefix: overrides.prefix.or(self.prefix),
            count: overrides.count.or(self.count),
        }
    }
}

/// Partially specified run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Name of the chain identifier column.
    #[serde(default)]
    pub chain_column: Option<String>,
    /// Chain every other chain is aligned onto.
    #[serde(default)]
    pub reference_chain: Option<u32>,
    /// Number of latent dimensions.
    #[serde(default)]
    pub dims: Option<usize>,
    /// Fit a uniform scale during alignment.
    #[serde(default)]
    pub fit_scale: Option<bool>,
    /// Person coordinate family.
    #[serde(default)]
    pub persons: FamilyConfig,
    /// Item coordinate family.
    #[serde(default)]
    pub items: FamilyConfig,
}

/// Fully resolved settings for one alignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    /// Name of the chain identifier column.
    pub chain_column: String,
    /// Reference chain.
    pub reference: ChainId,
    /// Latent layout.
    pub layout: LatentLayout,
    /// Procrustes fit options.
    pub options: ProcrustesOptions,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("missing required setting `{0}` (set it in the config file or pass the flag)")]
    Missing(&'static str),
    #[error("reference chain must be a positive integer, got {0}")]
    InvalidReferenceChain(u32),
    #[error("{0}")]
    Layout(#[from] AlignError),
}

impl RunConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merged(self, overrides: RunConfig) -> Self {
        Self {
            chain_column: overrides.chain_column.or(self.chain_column),
            reference_chain: overrides.reference_chain.or(self.reference_chain),
            dims: overrides.dims.or(self.dims),
            fit_scale: overrides.fit_scale.or(self.fit_scale),
            persons: self.persons.merged(overrides.persons),
            items: self.items.merged(overrides.items),
        }
    }

    /// The configured chain column, or the default.
    pub fn chain_column_or_default(&self) -> String {
        self.chain_column
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAIN_COLUMN.to_string())
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] for absent counts or dims,
    /// [`ConfigError::InvalidReferenceChain`] for chain 0,
    /// [`ConfigError::Layout`] for an invalid layout.
    pub fn resolve(self) -> Result<ResolvedRun, ConfigError> {
        let chain_column = self.chain_column_or_default();
        let reference = match self.reference_chain {
            None => ChainId::default(),
            Some(id) => ChainId::new(id).ok_or(ConfigError::InvalidReferenceChain(id))?,
        };
        let layout = LatentLayout {
            persons: LatentFamily {
                prefix: self
                    .persons
                    .prefix
                    .unwrap_or_else(|| DEFAULT_PERSON_PREFIX.to_string()),
                count: self.persons.count.ok_or(ConfigError::Missing("persons.count"))?,
            },
            items: LatentFamily {
                prefix: self
                    .items
                    .prefix
                    .unwrap_or_else(|| DEFAULT_ITEM_PREFIX.to_string()),
                count: self.items.count.ok_or(ConfigError::Missing("items.count"))?,
            },
            dims: self.dims.ok_or(ConfigError::Missing("dims"))?,
        };
        layout.validate()?;

        Ok(ResolvedRun {
            chain_column,
            reference,
            layout,
            options: ProcrustesOptions {
                fit_scale: self.fit_scale.unwrap_or(true),
            },
        })
    }
}
