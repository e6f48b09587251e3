use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Default directory holding uploaded documents.
pub const DEFAULT_DOCUMENTS_DIR: &str = "documents";
/// Default base URL of the local Ollama runtime.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
/// Default chat model used for scoring and summarization.
pub const DEFAULT_CHAT_MODEL: &str = "gemma2:2b";
/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the document search server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned on every search and written by uploads.
    pub documents_dir: PathBuf,
    /// Base URL of the Ollama runtime answering chat requests.
    pub ollama_url: String,
    /// Model identifier used for every scoring and summary call.
    pub chat_model: String,
    /// Upper bound applied to each model call.
    pub model_timeout_secs: u64,
    /// TCP port the HTTP server binds on all interfaces.
    pub server_port: u16,
    /// Maximum accepted request body size for uploads.
    pub max_upload_bytes: usize,
    /// Optional log file; `logs/docsearch.log` is used when absent.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(load_env_optional)
    }

    /// Build configuration from an arbitrary key lookup, applying defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            documents_dir: lookup("DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENTS_DIR)),
            ollama_url: lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            chat_model: lookup("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            model_timeout_secs: parse_or(
                &lookup,
                "MODEL_TIMEOUT_SECS",
                DEFAULT_MODEL_TIMEOUT_SECS,
            )?,
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            log_file: lookup("DOCSEARCH_LOG_FILE").map(PathBuf::from),
        })
    }

    /// Per-call model timeout as a [`Duration`].
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Report the effective settings at debug level. Only visible once tracing is installed.
    pub fn log_loaded(&self) {
        tracing::debug!(
            documents_dir = %self.documents_dir.display(),
            ollama_url = %self.ollama_url,
            chat_model = %self.chat_model,
            server_port = self.server_port,
            model_timeout_secs = self.model_timeout_secs,
            "Loaded configuration"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from(DEFAULT_DOCUMENTS_DIR),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            model_timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            server_port: DEFAULT_SERVER_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_file: None,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// `apply` runs before the value is frozen so callers can layer command-line overrides.
pub fn init_config(apply: impl FnOnce(&mut Config)) -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;
    apply(&mut config);
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized; keeping the first value");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).expect("config");
        assert_eq!(config.documents_dir, PathBuf::from("documents"));
        assert_eq!(config.chat_model, "gemma2:2b");
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.model_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DOCUMENTS_DIR", "/srv/docs"),
            ("CHAT_MODEL", "llama3"),
            ("SERVER_PORT", " 8080 "),
            ("MODEL_TIMEOUT_SECS", "5"),
        ]))
        .expect("config");
        assert_eq!(config.documents_dir, PathBuf::from("/srv/docs"));
        assert_eq!(config.chat_model, "llama3");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.model_timeout_secs, 5);
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let error = Config::from_lookup(lookup_from(&[("SERVER_PORT", "http")]))
            .expect_err("invalid port");
        assert!(error.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn loaded_configuration_is_reported_through_tracing() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || Config::default().log_loaded());

        let output = String::from_utf8(captured.0.lock().expect("log buffer").clone())
            .expect("utf-8 log");
        assert!(output.contains("Loaded configuration"));
        assert!(output.contains("chat_model=gemma2:2b"));
    }
}
