//! Application configuration for ArticleChat.
//!
//! User config lives at `~/.articlechat/articlechat.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArticleChatError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "articlechat.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".articlechat";

/// Browser-like identifying header sent with page fetches. Many news sites
/// refuse requests that look like bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching articlechat.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation provider settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Page fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Batch classification settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// `[groq]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout. Unset means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: None,
        }
    }
}

impl GroqConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama3-70b-8192".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for article pages.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header for article pages.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// libSQL database file. A leading `~/` is expanded to the home directory.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Resolve `db_path` to an absolute path.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        expand_home(&self.db_path)
    }
}

fn default_db_path() -> String {
    format!("~/{CONFIG_DIR_NAME}/articles.db")
}

/// `[batch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Articles classified at once. 1 means strictly sequential.
    #[serde(default = "default_batch_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_batch_concurrency(),
        }
    }
}

fn default_batch_concurrency() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.articlechat/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ArticleChatError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.articlechat/articlechat.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ArticleChatError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ArticleChatError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ArticleChatError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArticleChatError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ArticleChatError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the provider API key from the configured env var.
///
/// A missing or blank key is not an error: callers keep running with the
/// generator marked unavailable.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    let var_name = &config.groq.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => {
            tracing::debug!(var = %var_name, "API key env var not set");
            None
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(raw: &str) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| ArticleChatError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(toml_str.contains("llama3-70b-8192"));
        assert!(!toml_str.contains("timeout_secs = 0"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[groq]
model = "llama-3.3-70b-versatile"
timeout_secs = 45

[fetch]
timeout_secs = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(config.groq.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.groq.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.user_agent, BROWSER_USER_AGENT);
        assert_eq!(config.batch.concurrency, 1);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
        assert!(config.fetch.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.groq.base_url, "https://api.groq.com/openai/v1");
        assert!(config.groq.timeout().is_none());
    }

    #[test]
    fn db_path_expands_home() {
        let storage = StorageConfig {
            db_path: "~/news/articles.db".into(),
        };
        let resolved = storage.resolved_db_path().expect("resolve");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("news/articles.db"));

        let storage = StorageConfig {
            db_path: "/var/lib/articlechat.db".into(),
        };
        assert_eq!(
            storage.resolved_db_path().expect("resolve"),
            PathBuf::from("/var/lib/articlechat.db")
        );
    }

    #[test]
    fn missing_api_key_resolves_to_none() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.groq.api_key_env = "AC_TEST_NONEXISTENT_KEY_12345".into();
        assert!(resolve_api_key(&config).is_none());
    }
}
