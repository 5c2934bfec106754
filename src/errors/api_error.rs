use serde::Serialize;
use std::error::Error;
use std::fmt;

use crate::constants::rate_limit;

/// Failure classes of a call to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The OAuth client-credentials exchange failed.
    Auth,
    /// A resource endpoint answered 429.
    RateLimit,
    /// Any other non-2xx resource response.
    Api,
    /// Network failures and unreadable bodies.
    Transport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn auth(status: u16, detail: &str) -> Self {
        Self::new(
            ApiErrorKind::Auth,
            Some(status),
            format!("OAuth token request failed ({}): {}", status, detail),
        )
    }

    pub fn rate_limited() -> Self {
        Self::new(
            ApiErrorKind::RateLimit,
            Some(429),
            rate_limit::EXCEEDED_MESSAGE,
        )
    }

    pub fn api(status: u16, detail: &str) -> Self {
        Self::new(
            ApiErrorKind::Api,
            Some(status),
            format!("Kiwify API error ({}): {}", status, detail),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::transport("HTTP request timed out");
        }
        if err.is_decode() {
            return ApiError::transport(format!("Invalid JSON response: {}", err));
        }
        ApiError::transport(err.to_string())
    }
}
