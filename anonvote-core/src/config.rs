//! Tree configuration.
//!
//! Loaded from TOML; every field is optional and falls back to its default.

use crate::crypto::{derive_field_from_seed, DOM_ZERO_VALUE};
use crate::merkle::{
    IncrementalTree, RootHistory, TreeError, TreeHasher, DEFAULT_ROOT_HISTORY_SIZE, MAX_DEPTH,
    MAX_ROOT_HISTORY_SIZE,
};
use crate::types::FieldElement;
use ark_bls12_381::Fr as F;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_TREE_DEPTH: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub depth: usize,
    /// Value of an empty leaf, little-endian hex
    pub zero_value: FieldElement,
    /// When set, the zero value is derived from this label instead
    pub zero_seed: Option<String>,
    pub root_history_size: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            depth: DEFAULT_TREE_DEPTH,
            zero_value: FieldElement::zero(),
            zero_seed: None,
            root_history_size: DEFAULT_ROOT_HISTORY_SIZE,
        }
    }
}

impl TreeConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded tree config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "depth must be between 1 and {MAX_DEPTH}, got {}",
                self.depth
            )));
        }
        if self.root_history_size == 0 || self.root_history_size > MAX_ROOT_HISTORY_SIZE {
            return Err(ConfigError::Invalid(format!(
                "root_history_size must be between 1 and {MAX_ROOT_HISTORY_SIZE}, got {}",
                self.root_history_size
            )));
        }
        Ok(())
    }

    pub fn zero_value(&self) -> F {
        match &self.zero_seed {
            Some(label) => derive_field_from_seed(DOM_ZERO_VALUE, label),
            None => self.zero_value.inner(),
        }
    }

    pub fn build<H: TreeHasher>(&self, hasher: H) -> Result<IncrementalTree<H>, ConfigError> {
        self.validate()?;
        Ok(IncrementalTree::with_history(
            self.depth,
            self.zero_value(),
            hasher,
            RootHistory::new(self.root_history_size),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PoseidonHasher;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::from_toml_str("").unwrap();
        assert_eq!(config, TreeConfig::default());
        assert_eq!(config.depth, 20);
        assert_eq!(config.zero_value(), F::from(0u64));
    }

    #[test]
    fn test_parse_overrides() {
        let config = TreeConfig::from_toml_str(
            r#"
            depth = 4
            zero_value = "05"
            root_history_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.depth, 4);
        assert_eq!(config.zero_value(), F::from(5u64));

        let tree = config.build(PoseidonHasher::new()).unwrap();
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.zeros()[0], F::from(5u64));
        assert_eq!(tree.history().capacity(), 3);
    }

    #[test]
    fn test_zero_seed() {
        let config = TreeConfig::from_toml_str(r#"zero_seed = "anonvote""#).unwrap();
        assert_eq!(config.zero_value(), derive_field_from_seed(DOM_ZERO_VALUE, "anonvote"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            TreeConfig::from_toml_str("depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::from_toml_str("depth = 33"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::from_toml_str("root_history_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::from_toml_str("root_history_size = 9223372036854775807"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::from_toml_str("depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            TreeConfig::load(Path::new("/nonexistent/anonvote.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_build_rejects_oversized_history() {
        let config = TreeConfig {
            root_history_size: MAX_ROOT_HISTORY_SIZE + 1,
            ..TreeConfig::default()
        };
        assert!(matches!(config.build(PoseidonHasher::new()), Err(ConfigError::Invalid(_))));

        let config = TreeConfig {
            depth: 3,
            root_history_size: MAX_ROOT_HISTORY_SIZE,
            ..TreeConfig::default()
        };
        assert_eq!(config.build(PoseidonHasher::new()).unwrap().history().capacity(), MAX_ROOT_HISTORY_SIZE);
    }
}
