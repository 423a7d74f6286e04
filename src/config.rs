use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_BASE_URL: &str = "https://api-ru.iiko.services/api/1";
const DEFAULT_API_LOGIN_PATH: &str = "api_login";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_ORDER_COMMENT: &str = "Тестовый заказ. Не делать!";
const DEFAULT_SMOKE_TEST_ITEMS: usize = 3;
const CONFIG_DIR: &str = "config";

/// Client configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the iiko.services API, without a trailing slash
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// File holding the API login on a single line
    #[serde(default = "default_api_login_path")]
    pub api_login_path: PathBuf,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Per-request timeout in seconds; unset keeps the HTTP client default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Comment attached to every order line item
    #[serde(default = "default_order_comment")]
    #[validate(length(min = 1))]
    pub order_comment: String,

    /// How many catalog products the smoke-test order includes
    #[serde(default = "default_smoke_test_items")]
    #[validate(custom = "validate_smoke_test_items")]
    pub smoke_test_items: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_login_path: default_api_login_path(),
            log_level: default_log_level(),
            log_json: false,
            request_timeout_secs: None,
            order_comment: default_order_comment(),
            smoke_test_items: default_smoke_test_items(),
        }
    }
}

impl AppConfig {
    /// Configuration pointing at a different API root, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_login_path() -> PathBuf {
    PathBuf::from(DEFAULT_API_LOGIN_PATH)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_order_comment() -> String {
    DEFAULT_ORDER_COMMENT.to_string()
}

fn default_smoke_test_items() -> usize {
    DEFAULT_SMOKE_TEST_ITEMS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_smoke_test_items(count: usize) -> Result<(), ValidationError> {
    if count == 0 {
        let mut err = ValidationError::new("smoke_test_items");
        err.message = Some("Must be at least 1".into());
        return Err(err);
    }
    Ok(())
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("iiko_order_client={},iiko_order={}", level, level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    // stdout is reserved for command output.
    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Loads client configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{RUN_ENV}.toml`
/// 4. Environment variables prefixed with `IIKO__`
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("api_login_path", DEFAULT_API_LOGIN_PATH)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("IIKO").separator("__"))
        .build()?;

    let mut app_config: AppConfig = config.try_deserialize()?;
    app_config.base_url = app_config.base_url.trim_end_matches('/').to_string();

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File as StdFile;
    use std::io::Write;
    use tempfile::TempDir;

    fn setup_test_config(content: &str, filename: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join(filename);
        let mut file = StdFile::create(file_path).unwrap();
        writeln!(file, "{}", content).unwrap();
        temp_dir
    }

    #[test]
    fn defaults_point_at_production_api() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.base_url, "https://api-ru.iiko.services/api/1");
        assert_eq!(cfg.api_login_path, PathBuf::from("api_login"));
        assert_eq!(cfg.order_comment, "Тестовый заказ. Не делать!");
        assert_eq!(cfg.smoke_test_items, 3);
        assert!(cfg.request_timeout().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_smoke_items() {
        let cfg = AppConfig {
            smoke_test_items: 0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig {
            smoke_test_items: 1,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_config_reads_default_file() {
        let dir = setup_test_config(
            r#"
            base_url = "http://localhost:9090/api/1/"
            api_login_path = "/etc/iiko/api_login"
            log_level = "debug"
            request_timeout_secs = 5
            "#,
            "default.toml",
        );

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:9090/api/1");
        assert_eq!(cfg.api_login_path, PathBuf::from("/etc/iiko/api_login"));
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn load_config_rejects_bad_log_level() {
        let dir = setup_test_config(r#"log_level = "loud""#, "default.toml");

        let result = load_config_from(dir.path());
        assert!(matches!(result, Err(AppConfigError::Validation(_))));
    }

    #[test]
    fn load_config_rejects_zero_smoke_items() {
        let dir = setup_test_config("smoke_test_items = 0", "default.toml");

        let result = load_config_from(dir.path());
        assert!(matches!(result, Err(AppConfigError::Validation(_))));
    }
}
