//! Model discovery and selection

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{DiscoveryMethod, ModelSettings, Provider};
use crate::error::{Error, Result};

use super::OpenAiBackend;

/// Models reported by one discovery source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    /// Where the list came from (for messages)
    pub source: String,
    /// Model identifiers in the order the source listed them
    pub models: Vec<String>,
}

impl ModelCatalog {
    pub fn new(source: impl Into<String>, models: Vec<String>) -> Self {
        Self {
            source: source.into(),
            models,
        }
    }

    /// Discover available models using the configured method
    pub async fn discover(settings: &ModelSettings) -> Result<Self> {
        if settings.provider == Provider::Mock {
            return Ok(Self::new("mock", vec!["mock".to_string()]));
        }

        let catalog = match settings.discovery {
            DiscoveryMethod::OllamaCli => Self::from_ollama_cli(&settings.ollama_bin).await?,
            DiscoveryMethod::Api => {
                let client = OpenAiBackend::new(settings, "")?;
                Self::new(format!("{}/models", settings.base_url), client.list_models().await?)
            }
            DiscoveryMethod::Static => Self::new("config", settings.models.clone()),
        };

        info!(source = %catalog.source, count = catalog.models.len(), "Models discovered");
        Ok(catalog)
    }

    async fn from_ollama_cli(bin: &str) -> Result<Self> {
        let source = format!("{} list", bin);
        debug!(command = %source, "Listing Ollama models");

        let output = Command::new(bin)
            .arg("list")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::ModelDiscoveryFailed {
                source_name: source.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ModelDiscoveryFailed {
                source_name: source,
                message: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Self::new(source, parse_ollama_list(&stdout)))
    }

    /// Pick the model for a debate
    ///
    /// Nothing is selectable from an empty catalog. Otherwise a non-empty
    /// explicit choice wins even when the source does not list it.
    pub fn select(&self, requested: Option<&str>) -> Result<String> {
        let Some(first) = self.models.first() else {
            return Err(Error::NoModelsAvailable {
                source_name: self.source.clone(),
            });
        };

        match requested.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                if !self.models.iter().any(|m| m == name) {
                    warn!(model = name, source = %self.source, "Requested model was not discovered, using it anyway");
                }
                Ok(name.to_string())
            }
            None => Ok(first.clone()),
        }
    }
}

/// Parse `ollama list` output: skip the header, keep the first column
pub fn parse_ollama_list(output: &str) -> Vec<String> {
    output
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
