//! Gate configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Configuration for an [`crate::AccessGate`].
///
/// ```yaml
/// whitelist:
///   - DE
///   - FR
/// dataset: /var/lib/ip2country/ranges.bin
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Country codes allowed through the gate. Empty denies every request.
    pub whitelist: Vec<String>,
    /// Range dataset to load, text or binary, optionally gzip compressed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
}

impl GateConfig {
    /// Create a config with the given whitelist.
    pub fn new<I, S>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
            dataset: None,
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.warn_suspicious_codes();
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.warn_suspicious_codes();
        Ok(config)
    }

    /// Load a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let mut config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        // Relative dataset paths are relative to the config file.
        if let (Some(dataset), Some(dir)) = (config.dataset.as_mut(), path.parent()) {
            if dataset.is_relative() {
                *dataset = dir.join(&*dataset);
            }
        }

        log::debug!(
            "loaded config from {:?}: {} whitelisted countries",
            path,
            config.whitelist.len()
        );
        Ok(config)
    }

    /// Pick the dataset to load: `override_path` if given, else the configured one.
    pub fn dataset_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.dataset.clone())
            .ok_or_else(|| {
                Error::Config("no dataset given on the command line or in the config".to_string())
            })
    }

    // Codes are matched case-sensitively against upper-case dataset codes.
    fn warn_suspicious_codes(&self) {
        for code in &self.whitelist {
            if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
                log::warn!(
                    "whitelist entry {:?} is not an upper-case two-letter country code and may never match",
                    code
                );
            }
        }
    }
}
