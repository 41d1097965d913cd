//! Blueprint configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable consulted when the configured one is unset
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Generation client configuration
    pub llm: LlmConfig,

    /// Where exported blueprints and saved images are written
    #[serde(rename = "output-dir")]
    pub output_dir: OutputDir,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Batch mode calls this to fail fast; the TUI instead surfaces a missing
    /// credential as the Error state of the run.
    pub fn validate(&self) -> Result<()> {
        debug!("Config::validate: called");
        if self.llm.api_key().is_none() {
            return Err(eyre::eyre!(
                "API key not found. Set the {} (or {}) environment variable.",
                self.llm.api_key_env,
                FALLBACK_API_KEY_ENV
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(p) => Some(p.clone()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        }?;
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// Project-local config first, then the user config
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".blueprint.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("blueprint").join("blueprint.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generation client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model used for the blueprint text
    #[serde(rename = "text-model")]
    pub text_model: String,

    /// Model used for visuals
    #[serde(rename = "image-model")]
    pub image_model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_ms: 300_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the environment
    ///
    /// Looked up on every call rather than cached, so a key exported after
    /// startup is picked up by the next request.
    pub fn api_key(&self) -> Option<String> {
        debug!(env = %self.api_key_env, "LlmConfig::api_key: called");
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

/// Output directory, `~/` expanded on use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputDir(pub String);

impl Default for OutputDir {
    fn default() -> Self {
        Self("blueprints".to_string())
    }
}

impl OutputDir {
    pub fn expanded(&self) -> PathBuf {
        match self.0.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.0)),
            None => PathBuf::from(&self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.text_model, "gemini-2.5-flash");
        assert_eq!(config.llm.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.llm.api_key_env, "API_KEY");
        assert!(config.log_level.is_none());
        assert_eq!(config.output_dir.expanded(), PathBuf::from("blueprints"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
output-dir: /tmp/out
llm:
  text-model: gemini-2.5-pro
  image-model: imagen-test
  api-key-env: MY_KEY
  base-url: http://localhost:9999
  timeout-ms: 1000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.output_dir.expanded(), PathBuf::from("/tmp/out"));
        assert_eq!(config.llm.text_model, "gemini-2.5-pro");
        assert_eq!(config.llm.image_model, "imagen-test");
        assert_eq!(config.llm.api_key_env, "MY_KEY");
        assert_eq!(config.llm.timeout_ms, 1000);
        // Defaults for unspecified
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.yml");
        fs::write(&path, "log-level: warn\nllm:\n  text-model: custom\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.text_model, "custom");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/blueprint.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_api_key_reads_env_at_call_time() {
        let config = LlmConfig {
            api_key_env: "BP_TEST_API_KEY".to_string(),
            ..LlmConfig::default()
        };
        unsafe {
            std::env::remove_var("BP_TEST_API_KEY");
            std::env::remove_var(FALLBACK_API_KEY_ENV);
        }
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var("BP_TEST_API_KEY", "secret") };
        assert_eq!(config.api_key().as_deref(), Some("secret"));

        unsafe { std::env::set_var("BP_TEST_API_KEY", "   ") };
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var(FALLBACK_API_KEY_ENV, "fallback") };
        assert_eq!(config.api_key().as_deref(), Some("fallback"));

        unsafe {
            std::env::remove_var("BP_TEST_API_KEY");
            std::env::remove_var(FALLBACK_API_KEY_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_validate_requires_key() {
        let config = Config {
            llm: LlmConfig {
                api_key_env: "BP_TEST_VALIDATE_KEY".to_string(),
                ..LlmConfig::default()
            },
            ..Config::default()
        };
        unsafe {
            std::env::remove_var("BP_TEST_VALIDATE_KEY");
            std::env::remove_var(FALLBACK_API_KEY_ENV);
        }
        assert!(config.validate().is_err());
    }
}
