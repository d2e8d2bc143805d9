// Configuration Storage Service
// Loads the JSON config file and resolves provider credentials

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    pub default_provider: Option<String>,
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub http: Option<String>,
    pub https: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// When false the provider is never called, even with a key present
    #[serde(default = "default_true")]
    pub use_llm: bool,
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            use_llm: true,
            llm_timeout_secs: 60,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// A disabled provider is never called, even with a key present
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: None,
            base_url: None,
        }
    }
}

fn default_true() -> bool { true }
fn default_llm_timeout() -> u64 { 60 }
fn default_max_tokens() -> i32 { 2048 }

/// API keys resolved once at startup and handed to the analyzer explicitly
#[derive(Clone, Default, PartialEq)]
pub struct ProviderCredentials {
    pub openai: Option<String>,
    pub gemini: Option<String>,
    /// Preferred provider when both keys are present ("openai" or "gemini")
    pub preferred: Option<String>,
}

// Keys stay out of logs
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("openai", &self.openai.as_ref().map(|_| "***"))
            .field("gemini", &self.gemini.as_ref().map(|_| "***"))
            .field("preferred", &self.preferred)
            .finish()
    }
}

impl ProviderCredentials {
    pub fn none() -> Self {
        Self::default()
    }

    /// Keys from the config file only, minus disabled providers
    pub fn from_config(config: &AppConfig) -> Self {
        let key = |name: &str| {
            config
                .api_keys
                .get(name)
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        };
        Self {
            openai: key("openai"),
            gemini: key("gemini"),
            preferred: config.default_provider.clone(),
        }
        .without_disabled(config)
    }

    /// Config file keys, overridden by `OPENAI_API_KEY` / `GEMINI_API_KEY` (or the `ESSAYLENS_` prefixed forms).
    /// A provider disabled in the config stays disabled whatever the environment holds.
    pub fn resolve(config: &AppConfig) -> Self {
        let mut creds = Self::from_config(config);
        if let Some(k) = env_key(&["OPENAI_API_KEY", "ESSAYLENS_OPENAI_API_KEY"]) {
            creds.openai = Some(k);
        }
        if let Some(k) = env_key(&["GEMINI_API_KEY", "ESSAYLENS_GEMINI_API_KEY"]) {
            creds.gemini = Some(k);
        }
        creds.without_disabled(config)
    }

    /// Drop keys of providers switched off with `"enabled": false`
    fn without_disabled(mut self, config: &AppConfig) -> Self {
        let disabled = |name: &str| config.providers.get(name).is_some_and(|p| !p.enabled);
        if disabled("openai") {
            self.openai = None;
        }
        if disabled("gemini") {
            self.gemini = None;
        }
        self
    }

    pub fn has_any(&self) -> bool {
        self.openai.is_some() || self.gemini.is_some()
    }
}

fn env_key(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

pub struct ConfigStore {
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.json"),
        }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("essayLens"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load configuration from file; a missing file yields the defaults
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(io_err(&self.config_file))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.analysis.use_llm);
        assert_eq!(config.analysis.llm_timeout_secs, 60);
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"analysis": {"useLlm": false}}"#).unwrap();
        assert!(!config.analysis.use_llm);
        assert_eq!(config.analysis.max_tokens, 2048);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));
        let config = store.load().unwrap();
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{
  "defaultProvider": "gemini",
  "apiKeys": {"openai": "sk-test", "gemini": "g-test"},
  "providers": {
    "openai": {"enabled": false},
    "gemini": {"model": "gemini-1.5-pro", "baseUrl": "http://localhost:9"}
  }
}"#,
        )
        .unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        let config = store.load().unwrap();

        assert_eq!(config.default_provider.as_deref(), Some("gemini"));
        assert!(!config.providers["openai"].enabled);
        let gemini = &config.providers["gemini"];
        assert!(gemini.enabled);
        assert_eq!(gemini.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(gemini.base_url.as_deref(), Some("http://localhost:9"));
        assert_eq!(config.api_keys["openai"], "sk-test");
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{not json").unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_credentials_from_config_ignore_blank_keys() {
        let mut config = AppConfig::default();
        config.api_keys.insert("openai".to_string(), "  ".to_string());
        config.api_keys.insert("gemini".to_string(), " g-key ".to_string());
        config.default_provider = Some("gemini".to_string());

        let creds = ProviderCredentials::from_config(&config);
        assert_eq!(creds.openai, None);
        assert_eq!(creds.gemini.as_deref(), Some("g-key"));
        assert!(creds.has_any());
        assert!(!format!("{:?}", creds).contains("g-key"));
    }

    #[test]
    fn test_disabled_provider_key_is_dropped() {
        let mut config = AppConfig::default();
        config.api_keys.insert("openai".to_string(), "sk-test".to_string());
        config.api_keys.insert("gemini".to_string(), "g-test".to_string());
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                enabled: false,
                ..Default::default()
            },
        );
        config.providers.insert("gemini".to_string(), ProviderConfig::default());

        let creds = ProviderCredentials::from_config(&config);
        assert_eq!(creds.openai, None);
        assert_eq!(creds.gemini.as_deref(), Some("g-test"));

        let creds = ProviderCredentials::resolve(&config);
        assert_eq!(creds.openai, None);
    }
}
