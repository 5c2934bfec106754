use crate::constants::{api, env, protocols::ALLOWED_HTTP};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Missing required environment variable: {0}\n  \
         KIWIFY_CLIENT_ID, KIWIFY_CLIENT_SECRET, and KIWIFY_ACCOUNT_ID are required.\n  \
         Get your credentials at: kiwify.com.br → Apps → API → Create API Key"
    )]
    MissingEnv(&'static str),

    #[error("Invalid {name}: {value} (expected an http(s) URL)")]
    InvalidBaseUrl { name: &'static str, value: String },
}

/// Credentials and endpoint the server talks to. Read once at startup.
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub account_id: String,
    pub base_url: String,
}

impl Config {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            account_id: account_id.into(),
            base_url: api::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(env::BASE_URL, raw)?;
        Ok(self)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::new(
            required_env(env::CLIENT_ID)?,
            required_env(env::CLIENT_SECRET)?,
            required_env(env::ACCOUNT_ID)?,
        );
        match optional_env(env::BASE_URL) {
            Some(raw) => config.with_base_url(&raw),
            None => Ok(config),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    optional_env(name).ok_or(ConfigError::MissingEnv(name))
}

fn normalize_base_url(name: &'static str, raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        name,
        value: raw.to_string(),
    };
    let mut url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !ALLOWED_HTTP.contains(&url.scheme()) {
        return Err(invalid());
    }
    url.set_fragment(None);
    url.set_query(None);
    Ok(url.as_str().trim_end_matches('/').to_string())
}
