//! Application configuration for bookdesk.
//!
//! User config lives at `~/.bookdesk/bookdesk.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BookdeskError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bookdesk.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bookdesk";

// ---------------------------------------------------------------------------
// Config structs (matching bookdesk.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The book to acquire and serve.
    #[serde(default)]
    pub book: BookConfig,

    /// Completion-model settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[book]` section — the ordered fragment sources and artifact location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Ordered fragment URLs. Index order determines concatenation order.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Local path of the assembled artifact.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// Per-fragment fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            artifact_path: default_artifact_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// The eight HTML export fragments of *Human Action*, in publication order.
fn default_sources() -> Vec<String> {
    [
        "https://mises.org/book/export/html/132121",
        "https://mises.org/book/export/html/132122",
        "https://mises.org/book/export/html/132125",
        "https://mises.org/book/export/html/132126",
        "https://mises.org/book/export/html/132128",
        "https://mises.org/book/export/html/132130",
        "https://mises.org/book/export/html/132133",
        "https://mises.org/book/export/html/132134",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_artifact_path() -> String {
    "var/human_action.txt".into()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID to answer queries with.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

fn default_model() -> String {
    "gpt-5".into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the static frontend files.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "frontend".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bookdesk/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BookdeskError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bookdesk/bookdesk.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BookdeskError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BookdeskError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BookdeskError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BookdeskError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BookdeskError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the completion API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.completion.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(BookdeskError::config(format!(
            "completion API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("artifact_path"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.book.sources.len(), 8);
        assert_eq!(parsed.book.fetch_timeout_secs, 30);
        assert_eq!(parsed.completion.api_key_env, "OPENAI_API_KEY");
        assert_eq!(parsed.server.port, 5000);
    }

    #[test]
    fn sources_preserve_order() {
        let config = BookConfig::default();
        assert!(config.sources[0].ends_with("132121"));
        assert!(config.sources[7].ends_with("132134"));
    }

    #[test]
    fn config_with_custom_book() {
        let toml_str = r#"
[book]
sources = ["https://example.com/part1", "https://example.com/part2"]
artifact_path = "/tmp/book.txt"

[server]
port = 8080
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.book.sources.len(), 2);
        assert_eq!(config.book.artifact_path, "/tmp/book.txt");
        // Unset fields fall back to defaults
        assert_eq!(config.book.fetch_timeout_secs, 30);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, "frontend");
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.completion.api_key_env = "BD_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
