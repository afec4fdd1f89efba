//! # Configuration Module
//!
//! Gateway settings, loaded from a YAML file or from environment variables.
//!
//! ## Environment Variables
//!
//! ### `OASMUX_PLUGINS`
//!
//! Comma-separated plugin names to load, with or without the `openapi/`
//! prefix. `list` prints the available plugins instead of loading any.
//! Unset loads every plugin in the catalog.
//!
//! ### `OASMUX_VERSION_LABEL`
//!
//! Leading part of the merged specification's `info.version`. Every loaded
//! plugin type is appended as `&<type>`.
//!
//! ## Example
//!
//! ```yaml
//! plugins: "jobs, nodes"
//! version_label: "Slurm-24.05"
//! ```

use crate::merge::MergeOptions;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Settings consumed by [`OpenApi::init`](crate::openapi::OpenApi::init).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Plugin selection; `None` selects every plugin.
    pub plugins: Option<String>,
    pub version_label: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            plugins: None,
            version_label: MergeOptions::default().version_label,
        }
    }
}

impl GatewayConfig {
    /// Load from `OASMUX_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            plugins: env::var("OASMUX_PLUGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            version_label: env::var("OASMUX_VERSION_LABEL").unwrap_or(defaults.version_label),
        }
    }

    /// Load from a YAML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is not valid YAML, or
    /// contains unknown keys.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    #[must_use]
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            version_label: self.version_label.clone(),
        }
    }
}
