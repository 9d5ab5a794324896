//! Configuration management for chat-shell.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::execution::DEFAULT_SHELL;
use crate::output::{OutputLimits, DEFAULT_TRUNCATION_MARKER};
use crate::session::DEFAULT_HISTORY_DISPLAY;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Command execution configuration.
    pub shell: ShellSection,
    /// Rendered output limits.
    pub output: OutputSection,
    /// Session behaviour.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Command execution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell every command line is handed to with `-c`.
    pub program: String,
    /// Kill commands running longer than this. Unset means no limit.
    pub command_timeout_secs: Option<u64>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
            command_timeout_secs: None,
        }
    }
}

/// Output section. Budgets are per stream, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub max_stdout_chars: usize,
    pub max_stderr_chars: usize,
    pub truncation_marker: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            max_stdout_chars: 1000,
            max_stderr_chars: 1000,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

/// Session section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// History entries shown in a session view.
    pub history_display: usize,
    /// End sessions idle this long. 0 keeps them forever.
    pub idle_timeout_secs: u64,
    /// How often idle sessions are looked for.
    pub reap_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            history_display: DEFAULT_HISTORY_DISPLAY,
            idle_timeout_secs: 0,
            reap_interval_secs: 60,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("CHAT_SHELL_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CHAT_SHELL_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(shell) = std::env::var("CHAT_SHELL_SHELL") {
            if !shell.is_empty() {
                self.shell.program = shell;
            }
        }

        if let Ok(secs) = std::env::var("CHAT_SHELL_IDLE_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                self.session.idle_timeout_secs = secs;
            }
        }

        if let Ok(level) = std::env::var("CHAT_SHELL_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref shell) = args.shell {
            self.shell.program = shell.clone();
        }
        if let Some(secs) = args.idle_timeout_secs {
            self.session.idle_timeout_secs = secs;
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Character budgets for rendered output.
    pub fn output_limits(&self) -> OutputLimits {
        OutputLimits {
            max_stdout_chars: self.output.max_stdout_chars,
            max_stderr_chars: self.output.max_stderr_chars,
            marker: self.output.truncation_marker.clone(),
        }
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.shell.command_timeout_secs.map(Duration::from_secs)
    }

    /// Idle expiry, if enabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.session.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.session.idle_timeout_secs))
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.session.reap_interval_secs.max(1))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.shell.program, "sh");
        assert_eq!(config.output.max_stdout_chars, 1000);
        assert_eq!(config.session.history_display, 5);
        assert!(config.idle_timeout().is_none());
        assert!(config.command_timeout().is_none());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "shell": { "program": "bash", "command_timeout_secs": 120 },
            "output": { "max_stdout_chars": 1900 },
            "session": { "idle_timeout_secs": 3600 }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.shell.program, "bash");
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.output.max_stdout_chars, 1900);
        assert_eq!(config.output.max_stderr_chars, 1000); // Default
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "server": { "port": 9000 } }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1"); // Default
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            host: Some("192.168.1.1".parse().unwrap()),
            port: Some(5000),
            shell: Some("bash".to_string()),
            idle_timeout_secs: Some(600),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.shell.program, "bash");
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_apply_args_keeps_file_values_when_unset() {
        let mut config = Config::default();
        config.server.port = 8123;

        config.apply_args(&Args::default());
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_output_limits() {
        let mut config = Config::default();
        config.output.max_stderr_chars = 50;
        config.output.truncation_marker = "[cut]".to_string();

        let limits = config.output_limits();
        assert_eq!(limits.max_stderr_chars, 50);
        assert_eq!(limits.marker, "[cut]");
    }

    #[test]
    fn test_to_server_config() {
        let config = Config::default();
        let server_config = config.to_server_config().unwrap();

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 3000);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();
        assert!(config.to_server_config().is_err());
    }

    #[test]
    fn test_reap_interval_never_zero() {
        let mut config = Config::default();
        config.session.reap_interval_secs = 0;
        assert_eq!(config.reap_interval(), Duration::from_secs(1));
    }
}
