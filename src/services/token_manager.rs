//! OAuth2 client-credentials token cache.
//!
//! [`TokenManager::get_valid_token`] hands out the cached bearer token while it
//! is fresh and performs a new exchange against `{base}/oauth/token` when the
//! cache is empty or stale. Concurrent callers that all observe a stale entry
//! each run their own exchange; the last write wins.

use crate::config::Config;
use crate::constants::{api, oauth};
use crate::errors::ApiError;
use crate::services::clock::{Clock, SystemClock};
use crate::services::logger::Logger;
use crate::utils::http::{error_message, status_text};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: f64,
}

pub struct TokenManager {
    logger: Logger,
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(logger: Logger, client: Client, config: &Config) -> Self {
        Self::with_clock(logger, client, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        logger: Logger,
        client: Client,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            logger: logger.child("oauth"),
            client,
            token_url: format!("{}{}", config.base_url, api::OAUTH_TOKEN_PATH),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Expiry of the cached token, if one is cached.
    pub fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.lock_cache().as_ref().map(|entry| entry.expires_at)
    }

    pub async fn get_valid_token(&self) -> Result<String, ApiError> {
        let now = self.clock.now();
        if let Some(token) = self.fresh_token(now) {
            return Ok(token);
        }

        let response = self.exchange().await?;
        let expires_at = expiry_after(self.clock.now(), response.expires_in);
        *self.lock_cache() = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at,
        });

        self.logger.info(
            "OAuth token acquired",
            Some(&serde_json::json!({
                "expires_in": response.expires_in,
                "refresh_at": expires_at.to_string(),
            })),
        );
        Ok(response.access_token)
    }

    fn fresh_token(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.lock_cache();
        let entry = guard.as_ref()?;
        if now < entry.expires_at {
            Some(entry.token.clone())
        } else {
            None
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<CachedToken>> {
        self.cached.lock().unwrap_or_else(|err| err.into_inner())
    }

    async fn exchange(&self) -> Result<TokenResponse, ApiError> {
        let form = serde_urlencoded::to_string([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ])
        .map_err(|err| ApiError::transport(format!("Failed to encode token request: {}", err)))?;

        self.logger.debug("requesting token", None);
        let response = self
            .client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_message(&body).unwrap_or_else(|| status_text(status));
            self.logger.warn(
                "OAuth token request rejected",
                Some(&serde_json::json!({ "status": status.as_u16() })),
            );
            return Err(ApiError::auth(status.as_u16(), &detail));
        }

        let body = response.text().await?;
        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|err| ApiError::transport(format!("OAuth token response invalid: {}", err)))
    }
}

/// Refresh deadline for a token granted at `acquired_at`. Lifetimes beyond
/// what the calendar can hold saturate instead of overflowing.
fn expiry_after(acquired_at: DateTime<Utc>, expires_in: f64) -> DateTime<Utc> {
    let lifetime_ms = (expires_in - oauth::EXPIRY_MARGIN_SECS as f64) * 1000.0;
    Duration::try_milliseconds(lifetime_ms as i64)
        .and_then(|lifetime| acquired_at.checked_add_signed(lifetime))
        .unwrap_or(if lifetime_ms > 0.0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            acquired_at
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn expiry_subtracts_the_margin() {
        assert_eq!(expiry_after(start(), 3600.0), start() + Duration::seconds(3300));
        assert_eq!(expiry_after(start(), 3600.5), start() + Duration::milliseconds(3_300_500));
        assert_eq!(expiry_after(start(), 200.0), start() - Duration::seconds(100));
    }

    #[test]
    fn out_of_range_lifetimes_saturate() {
        assert_eq!(expiry_after(start(), 9e15), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry_after(start(), f64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry_after(start(), -9e18), start());
        assert_eq!(expiry_after(start(), f64::MIN), start());
    }
}
