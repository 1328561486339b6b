//! Loads the batch configuration from a YAML file.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::BatchConfig;

/// Reads `BatchConfig` from YAML, or falls back to the built-in batch.
#[derive(Debug, Default, Clone)]
pub struct YamlConfigLoader {
    path: Option<PathBuf>,
}

impl YamlConfigLoader {
    /// `path` of `None` selects the built-in defaults.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// result fails validation.
    pub fn load(&self) -> Result<BatchConfig> {
        let config = match &self.path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("cannot parse {}", path.display()))?
            }
            None => BatchConfig::default(),
        };
        config.validate()?;
        tracing::debug!(
            source = %self.path.as_deref().map_or_else(|| "built-in".into(), |p| p.display().to_string()),
            applications = config.applications.len(),
            "configuration loaded"
        );
        Ok(config)
    }
}
