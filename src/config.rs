//! Runtime configuration from the environment.
//!
//! | Variable            | Meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `ASTHMA_LOG_MODE`   | `stderr`, `file` or `auto` (default)      |
//! | `ASTHMA_LOG_FILE`   | log file path                             |
//! | `ASTHMA_MODEL_PATH` | default model for `assess`                |
//!
//! Command-line flags take precedence over these.

use std::path::PathBuf;

pub const LOG_MODE_ENV: &str = "ASTHMA_LOG_MODE";
pub const LOG_FILE_ENV: &str = "ASTHMA_LOG_FILE";
pub const MODEL_PATH_ENV: &str = "ASTHMA_MODEL_PATH";

const DEFAULT_LOG_FILE: &str = "asthma_severity.log";

/// Where log output goes. Stdout is never used: it carries command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    Stderr,
    File,
    /// File if a log path was configured, stderr otherwise
    #[default]
    Auto,
}

impl LogMode {
    /// Lenient parse; unrecognised values fall back to `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stderr" => Self::Stderr,
            "file" => Self::File,
            _ => Self::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// True when `log_file` came from configuration rather than the default
    pub log_file_configured: bool,
    pub model_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_file_configured: false,
            model_path: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_file = non_empty(LOG_FILE_ENV).map(PathBuf::from);
        Self {
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or_default(),
            log_file_configured: log_file.is_some(),
            log_file: log_file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            model_path: non_empty(MODEL_PATH_ENV).map(PathBuf::from),
        }
    }

    /// Override the log file (e.g. from a CLI flag).
    #[must_use]
    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = path;
        self.log_file_configured = true;
        self
    }

    /// Override the model path (e.g. from a CLI flag).
    #[must_use]
    pub fn with_model_path(mut self, path: PathBuf) -> Self {
        self.model_path = Some(path);
        self
    }

    #[must_use]
    pub fn log_to_file(&self) -> bool {
        match self.log_mode {
            LogMode::File => true,
            LogMode::Stderr => false,
            LogMode::Auto => self.log_file_configured,
        }
    }
}
