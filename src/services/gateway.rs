//! Single choke point for calls to the platform's resource endpoints.

use crate::config::Config;
use crate::constants::api;
use crate::errors::ApiError;
use crate::services::logger::Logger;
use crate::services::token_manager::TokenManager;
use crate::utils::http::{append_query, error_message, status_text, QueryParams};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub struct ApiGateway {
    logger: Logger,
    client: Client,
    base_url: String,
    account_id: String,
    tokens: Arc<TokenManager>,
}

impl ApiGateway {
    pub fn new(logger: Logger, client: Client, config: &Config, tokens: Arc<TokenManager>) -> Self {
        Self {
            logger: logger.child("gateway"),
            client,
            base_url: config.base_url.clone(),
            account_id: config.account_id.clone(),
            tokens,
        }
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, Method::GET, None, None).await
    }

    pub async fn get_with_query(
        &self,
        endpoint: &str,
        query: &QueryParams<'_>,
    ) -> Result<Value, ApiError> {
        self.request(endpoint, Method::GET, None, Some(query)).await
    }

    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        query: Option<&QueryParams<'_>>,
    ) -> Result<Value, ApiError> {
        let token = self.tokens.get_valid_token().await?;
        let url = self.build_url(endpoint, query)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::transport("Access token is not a valid header value"))?;
        authorization.set_sensitive(true);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, authorization)
            .header(api::ACCOUNT_HEADER, self.account_id.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        self.logger.debug(
            "request",
            Some(&serde_json::json!({
                "method": method.as_str(),
                "endpoint": endpoint,
                "status": status.as_u16(),
            })),
        );

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Default::default()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            self.logger.warn(
                "rate limited",
                Some(&serde_json::json!({ "endpoint": endpoint })),
            );
            return Err(ApiError::rate_limited());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = error_message(&text).unwrap_or_else(|| status_text(status));
            return Err(ApiError::api(status.as_u16(), &detail));
        }

        Ok(response.json::<Value>().await?)
    }

    fn build_url(&self, endpoint: &str, query: Option<&QueryParams<'_>>) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, endpoint);
        let mut url = Url::parse(&raw)
            .map_err(|err| ApiError::transport(format!("Invalid request URL {}: {}", raw, err)))?;
        if let Some(query) = query {
            append_query(&mut url, query);
        }
        Ok(url)
    }
}
