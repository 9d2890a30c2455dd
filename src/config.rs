// Startup configuration read from the environment

use thiserror::Error;

pub const MUX_TOKEN_ID: &str = "MUX_TOKEN_ID";
pub const MUX_TOKEN_SECRET: &str = "MUX_TOKEN_SECRET";
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
pub const MUX_API_URL: &str = "MUX_API_URL";

pub const DEFAULT_MUX_API_URL: &str = "https://api.mux.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Clone)]
pub struct ShellConfig {
    pub mux_token_id: String,
    pub mux_token_secret: String,
    /// Checked when the shell loads, not at startup
    pub cors_origin: Option<String>,
    pub mux_api_url: String,
}

// Keep the secret out of logs
impl std::fmt::Debug for ShellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellConfig")
            .field("mux_token_id", &self.mux_token_id)
            .field("mux_token_secret", &"<redacted>")
            .field("cors_origin", &self.cors_origin)
            .field("mux_api_url", &self.mux_api_url)
            .finish()
    }
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            mux_token_id: require(MUX_TOKEN_ID)?,
            mux_token_secret: require(MUX_TOKEN_SECRET)?,
            cors_origin: get(CORS_ORIGIN),
            mux_api_url: get(MUX_API_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_MUX_API_URL.to_string()),
        })
    }
}
