/// Configuration for the Kanban backend.
/// Reads config.json from ~/.config/kanban-assistant/config.json (or platform
/// equivalent); command-line flags override file values.
use clap::Parser;
use kanban_core::reply::LeniencyPolicy;
use kanban_core::storage::DEFAULT_USERNAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "kanban-assistant";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub ai: AiSettings,
}

/// Provider settings as written in the config file. The credential itself
/// never lives here, only the name of the environment variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub reply_policy: LeniencyPolicy,
}

/// Resolved provider configuration handed to the chat orchestrator.
#[derive(Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the setting the credential comes from, for error messages.
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub reply_policy: LeniencyPolicy,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("reply_policy", &self.reply_policy)
            .finish()
    }
}

impl AiConfig {
    /// Resolve the credential through `lookup` (normally `std::env::var`).
    /// An empty value counts as absent.
    pub fn resolve(settings: &AiSettings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup(&settings.api_key_env).filter(|key| !key.trim().is_empty());
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
            api_key,
            reply_policy: settings.reply_policy,
        }
    }

    pub fn from_env(settings: &AiSettings) -> Self {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }
}

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "kanban-backend", about = "Kanban board API with an AI assistant")]
pub struct Cli {
    /// Path to config.json
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
    /// Address to bind
    #[arg(long = "bind")]
    pub bind_address: Option<String>,
    /// SQLite database file
    #[arg(long = "database")]
    pub database_path: Option<PathBuf>,
}

fn default_port() -> u16 {
    8000
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_database_path() -> PathBuf {
    app_dir().join("kanban.db")
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            reply_policy: LeniencyPolicy::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            database_path: default_database_path(),
            username: default_username(),
            log_file: None,
            ai: AiSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(bind) = &cli.bind_address {
            self.bind_address = bind.clone();
        }
        if let Some(db) = &cli.database_path {
            self.database_path = db.clone();
        }
    }
}

/// Default config path: ~/.config/kanban-assistant/config.json
pub fn default_config_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Load config from path. Returns default if file doesn't exist.
pub fn load_config(path: &Path) -> ServerConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!(target: "kanban.config", "Failed to parse config {}: {}", path.display(), e);
            ServerConfig::default()
        }),
        Err(_) => {
            log::info!(target: "kanban.config", "No config at {}, using defaults", path.display());
            ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.json"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.username, "user");
        assert_eq!(config.ai.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.ai.model, "openai/gpt-oss-120b");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"port": 9100, "ai": {"model": "local-model", "reply_policy": "strict"}}"#,
        )
        .unwrap();
        let config = load_config(&path);
        assert_eq!(config.port, 9100);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.ai.model, "local-model");
        assert_eq!(config.ai.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.ai.reply_policy, LeniencyPolicy::Strict);
    }

    #[test]
    fn test_unparseable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path).port, 8000);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = ServerConfig::default();
        let cli = Cli {
            port: Some(1234),
            bind_address: Some("0.0.0.0".into()),
            database_path: Some(PathBuf::from("/tmp/k.db")),
            ..Cli::default()
        };
        config.apply_cli(&cli);
        assert_eq!(config.port, 1234);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.database_path, PathBuf::from("/tmp/k.db"));
    }

    #[test]
    fn test_credential_resolution() {
        let settings = AiSettings::default();
        let missing = AiConfig::resolve(&settings, |_| None);
        assert!(missing.api_key.is_none());
        let blank = AiConfig::resolve(&settings, |_| Some("  ".into()));
        assert!(blank.api_key.is_none());
        let present = AiConfig::resolve(&settings, |name| {
            (name == "OPENROUTER_API_KEY").then(|| "sk-test".to_string())
        });
        assert_eq!(present.api_key.as_deref(), Some("sk-test"));
        assert!(!format!("{:?}", present).contains("sk-test"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = AiSettings {
            base_url: "http://127.0.0.1:9/v1/".into(),
            ..AiSettings::default()
        };
        assert_eq!(AiConfig::resolve(&settings, |_| None).base_url, "http://127.0.0.1:9/v1");
    }
}
