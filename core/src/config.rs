//! Client configuration.

use crate::error::InvalidInput;

/// Public MapQuest Open Data host.
pub const DEFAULT_BASE_URL: &str = "https://open.mapquestapi.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MAPQUEST_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "MAPQUEST_BASE_URL";

/// Settings needed to construct a `Client`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Read `MAPQUEST_API_KEY` and, if set, `MAPQUEST_BASE_URL`.
    pub fn from_env() -> Result<Self, InvalidInput> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InvalidInput> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or(InvalidInput::MissingApiKey)?;
        let base_url = lookup(BASE_URL_ENV)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self { api_key, base_url })
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
