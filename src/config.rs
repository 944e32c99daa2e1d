//! Workflow configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main workflow configuration
///
/// Policy values only: everything caller-specific (identity, tier,
/// language) travels in [`crate::generate::CallContext`] instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Rate and size ceilings enforced before any generation call
    pub limits: LimitsConfig,

    /// Generation call parameters
    pub generation: GenerationConfig,
}

impl WorkflowConfig {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .ideabuilder.yml
        let local_config = PathBuf::from(".ideabuilder.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/ideabuilder/ideabuilder.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ideabuilder").join("ideabuilder.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}",
                            user_config.display(),
                            e
                        );
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Rate and size ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum generation attempts per session within the rolling window
    #[serde(rename = "max-calls")]
    pub max_calls: u32,

    /// Rolling rate-limit window in milliseconds
    #[serde(rename = "window-ms")]
    pub window_ms: u64,

    /// Minimum idea length in characters before leaving the input phase
    #[serde(rename = "min-idea-chars")]
    pub min_idea_chars: usize,

    /// Maximum idea length passed to the sanitizer for truncation
    #[serde(rename = "max-idea-chars")]
    pub max_idea_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_calls: 10,
            window_ms: 60_000,
            min_idea_chars: 30,
            max_idea_chars: 4_000,
        }
    }
}

/// Generation call parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Feature name checked against the caller's tier
    pub feature: String,

    /// Max tokens for question-round responses
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Max tokens for the final plan response
    #[serde(rename = "plan-max-tokens")]
    pub plan_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            feature: "idea-builder".to_string(),
            max_tokens: 2_048,
            plan_max_tokens: 8_192,
        }
    }
}
