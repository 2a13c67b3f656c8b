//! Reconciler settings

use checkout_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Caller-side settings for the checkout tooling.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}

impl CheckoutConfig {
    /// Load from a TOML, JSON, or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load from `path`, or return the defaults when the file is absent.
    pub fn load_or_default(path: &NormalizedPath) -> Result<Self> {
        match ConfigStore::new().load(path) {
            Ok(config) => Ok(config),
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path, "No checkout config found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }
}
