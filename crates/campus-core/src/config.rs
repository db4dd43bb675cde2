//! Configuration module
//!
//! Client configuration is read from the environment (after loading an optional
//! `.env` file): backend location, HTTP timeout, where the session is persisted
//! and the upload size limit.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/v1";
const HTTP_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_MB: u64 = 50;
const SESSION_DIR: &str = ".campus";
const SESSION_FILE: &str = "session.json";

/// Client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL of the REST backend, without trailing slash
    pub api_url: String,
    pub http_timeout_secs: u64,
    /// File holding the persisted session token and cached user
    pub session_path: PathBuf,
    /// Upper bound on the combined size of one material upload
    pub max_upload_bytes: u64,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            session_path: default_session_path(None),
            max_upload_bytes: mb_to_bytes(MAX_UPLOAD_MB),
            environment: "development".to_string(),
        }
    }
}

fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

fn default_session_path(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(SESSION_DIR).join(SESSION_FILE),
        None => PathBuf::from(".campus-session.json"),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("CAMPUS_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let http_timeout_secs = match lookup("CAMPUS_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("CAMPUS_HTTP_TIMEOUT_SECS must be a valid number")
            })?,
            None => HTTP_TIMEOUT_SECS,
        };

        let max_upload_mb: u64 = match lookup("CAMPUS_MAX_UPLOAD_MB") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("CAMPUS_MAX_UPLOAD_MB must be a valid number")
            })?,
            None => MAX_UPLOAD_MB,
        };

        let session_path = lookup("CAMPUS_SESSION_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_session_path(lookup("HOME")));

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        Ok(Config {
            api_url,
            http_timeout_secs,
            session_path,
            max_upload_bytes: mb_to_bytes(max_upload_mb),
            environment,
        })
    }

    /// Check if the client targets a production backend
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_url.is_empty() {
            return Err(anyhow::anyhow!("CAMPUS_API_URL cannot be empty"));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "CAMPUS_API_URL must start with http:// or https://, got '{}'",
                self.api_url
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CAMPUS_HTTP_TIMEOUT_SECS must be greater than zero"
            ));
        }
        if self.is_production() && self.api_url.starts_with("http://") {
            tracing::warn!(api_url = %self.api_url, "Production backend reached over plain HTTP");
        }
        Ok(())
    }
}
