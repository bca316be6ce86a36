use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub api_key: String,
}

impl Config {
    /// Build and validate settings from a variable lookup.
    ///
    /// # Functional Core
    /// Pure: every offending variable is reported, not just the first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();

        let raw_url = lookup("API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = match Url::parse(raw_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
            Ok(url) => {
                problems.push(format!(
                    "API_BASE_URL: unsupported scheme `{}`",
                    url.scheme()
                ));
                None
            }
            Err(e) => {
                problems.push(format!("API_BASE_URL: {}", e));
                None
            }
        };

        let api_key = lookup("ZAI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if api_key.is_none() {
            problems.push("ZAI_API_KEY: required".to_string());
        }

        match (base_url, api_key) {
            (Some(base_url), Some(api_key)) if problems.is_empty() => {
                Ok(Self { base_url, api_key })
            }
            _ => Err(ConfigError::Invalid(problems)),
        }
    }

    /// Load `.env` (if present) into the process environment, then read it.
    ///
    /// # Imperative Shell
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
