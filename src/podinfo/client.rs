use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::service::{DecodeMode, PodinfoConfig};
use crate::error::{Error, Result};
use crate::podinfo::model::{CacheRequest, Token, TokenResponse, ValidateResponse, ValidationResult};

/// Speaks the token service HTTP contract. Every call is attempted once.
#[derive(Debug, Clone)]
pub struct TokenService<'a> {
    client: Client,
    cfg: &'a PodinfoConfig,
}

impl<'a> TokenService<'a> {
    pub fn new(cfg: &'a PodinfoConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = cfg.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: Client, cfg: &'a PodinfoConfig) -> Self {
        Self { client, cfg }
    }

    /// Unauthenticated `POST {base_url}{token_endpoint}` without a body.
    pub async fn generate_token(&self) -> Result<Token> {
        let url = self.cfg.token_url();
        debug!("requesting token from {}", url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::request(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request {
                url,
                reason: format!("unexpected status: {}", status),
            });
        }

        let body = response.text().await.map_err(|e| Error::request(&url, e))?;
        let parsed: TokenResponse = decode("token response", &body)?;
        let token = self.field(parsed.token, "token")?;
        Ok(Token::new(token))
    }

    /// `GET` on the validate route with the token as bearer credential.
    pub async fn validate_token(&self, token: &Token) -> Result<ValidationResult> {
        let url = self.cfg.validate_url();
        debug!("validating token against {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| Error::request(&url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Validation { status });
        }

        let body = response.text().await.map_err(|e| Error::request(&url, e))?;
        let parsed: ValidateResponse = decode("validation response", &body)?;

        Ok(ValidationResult {
            expires_at: self.field(parsed.expires_at, "expires_at")?,
            token_name: self.field(parsed.token_name, "token_name")?,
            valid: true,
        })
    }

    /// `POST {base_url}{cache_endpoint}` with `{"token", "valid"}`; 200 and 202 are accepted.
    pub async fn cache_validation_result(&self, token: &Token, valid: bool) -> Result<()> {
        let url = self.cfg.cache_url();
        debug!("caching validation result at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&CacheRequest { token: token.as_str(), valid })
            .send()
            .await
            .map_err(|e| Error::CacheWrite {
                reason: format!("request to {} failed: {}", url, e),
            })?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED => {
                info!("cache endpoint accepted validation result with {}", response.status());
                Ok(())
            }
            status => Err(Error::CacheWrite {
                reason: format!("unexpected status: {}", status),
            }),
        }
    }

    fn field(&self, value: Option<String>, name: &'static str) -> Result<String> {
        match (value, self.cfg.decode) {
            (Some(value), _) => Ok(value),
            (None, DecodeMode::Lenient) => {
                debug!("field '{}' missing in response, using empty string", name);
                Ok(String::new())
            }
            (None, DecodeMode::Strict) => Err(Error::Decode {
                what: name,
                reason: "field is missing".to_string(),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::Decode {
        what,
        reason: e.to_string(),
    })
}
