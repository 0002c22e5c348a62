//! Settings file and the merged runtime configuration.
//!
//! Precedence: command-line flags (or their environment variables), then the
//! TOML settings file, then the defaults in [`crate::constants`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::constants;
use crate::llm_interaction::SamplingParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Contents of the optional settings file. Every key may be omitted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub knowledge_base: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            api_key: self.api_key.or(fallback.api_key),
            model: self.model.or(fallback.model),
            base_url: self.base_url.or(fallback.base_url),
            temperature: self.temperature.or(fallback.temperature),
            top_p: self.top_p.or(fallback.top_p),
            knowledge_base: self.knowledge_base.or(fallback.knowledge_base),
        }
    }
}

/// Fully resolved configuration handed to the orchestrator and client.
#[derive(Clone, PartialEq)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub sampling: SamplingParams,
    pub knowledge_base: Option<PathBuf>,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("sampling", &self.sampling)
            .field("knowledge_base", &self.knowledge_base)
            .finish()
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<f32, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

impl TryFrom<Settings> for AssistantConfig {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let defaults = SamplingParams::default();
        let temperature = check_range("temperature", settings.temperature.unwrap_or(defaults.temperature), 0.0, 2.0)?;
        let top_p = check_range("top_p", settings.top_p.unwrap_or(defaults.top_p), 0.0, 1.0)?;

        Ok(Self {
            api_key: settings.api_key.filter(|k| !k.trim().is_empty()),
            model: settings.model.unwrap_or_else(|| constants::DEFAULT_MODEL.to_string()),
            base_url: settings.base_url.unwrap_or_else(|| constants::DEFAULT_BASE_URL.to_string()),
            sampling: SamplingParams { temperature, top_p },
            knowledge_base: settings.knowledge_base,
        })
    }
}
