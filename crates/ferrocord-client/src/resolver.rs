//! Endpoint resolution
//!
//! The gateway endpoint is discovered through the REST API before each
//! connection attempt. Resolution is stateless and retryable; the session
//! retries the whole connect sequence on any failure here.

use crate::error::ResolverError;
use async_trait::async_trait;

/// Protocol version and encoding appended to the resolved endpoint
const GATEWAY_QUERY: &str = "/?v=10&encoding=json";

/// Resolves a connectable gateway endpoint from a credential
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Resolve the WebSocket URL to connect to
    async fn resolve(&self, token: &str) -> Result<String, ResolverError>;
}

/// Production resolver backed by the REST API
pub struct RestEndpointResolver {
    http: reqwest::Client,
    api_base: String,
}

impl RestEndpointResolver {
    /// Create a resolver against the given API base URL
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Build the connect URL from the raw gateway URL the API returned
    fn connect_url(gateway_url: &str) -> String {
        format!("{}{GATEWAY_QUERY}", gateway_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EndpointResolver for RestEndpointResolver {
    async fn resolve(&self, token: &str) -> Result<String, ResolverError> {
        let response = self
            .http
            .get(format!("{}/gateway/bot", self.api_base))
            .header("Authorization", format!("Bot {token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Rejected(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let url = body
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or(ResolverError::MissingUrl)?;

        let connect_url = Self::connect_url(url);

        tracing::debug!(endpoint = %connect_url, "Resolved gateway endpoint");

        Ok(connect_url)
    }
}
