//! Centralized configuration management for coursedesk

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Default base URL of the course catalog API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the course catalog API, without a trailing slash
    pub api_base_url: String,
    /// Log file used while the TUI owns the terminal
    pub log_file: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "coursedesk/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("COURSEDESK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let log_file = std::env::var("COURSEDESK_LOG_FILE")
            .unwrap_or_else(|_| "./coursedesk.log".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("COURSEDESK_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("COURSEDESK_USER_AGENT")
                .unwrap_or_else(|_| "coursedesk/0.1.0".to_string()),
        };

        Ok(Config {
            api_base_url: normalize_base_url(&api_base_url),
            log_file,
            http,
        })
    }

    /// Replace the API base URL, normalizing trailing slashes
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_base_url = normalize_base_url(url);
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "API base URL must start with http:// or https://: {}",
                self.api_base_url
            ));
        }

        // Check if parent directory of the log file exists
        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Log file parent directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Strip whitespace and trailing slashes so endpoint paths can be appended
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
