//! Client configuration.
//!
//! # Design
//! `ClientConfig` is an immutable value: the bearer token and base URL are
//! fixed before the client is built and only read afterwards. The token is
//! obtained elsewhere; this crate never requests or refreshes it.

use std::fmt;

use crate::error::{Result, ToshlError};

pub const DEFAULT_BASE_URL: &str = "https://api.toshl.com";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "TOSHL_TOKEN";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "TOSHL_API_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    token: String,
    base_url: String,
}

impl ClientConfig {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client somewhere other than the public API. A trailing `/`
    /// is dropped so paths can always start with one.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Read `TOSHL_TOKEN` and the optional `TOSHL_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ToshlError::Config(format!("{TOKEN_ENV} is not set")))?;

        let config = Self::new(token.trim());
        Ok(match lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            Some(url) => config.with_base_url(url.trim()),
            None => config,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
