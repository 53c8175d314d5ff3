//! Access tokens for the management and Graph APIs.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::azcli::AzCli;
use crate::error::{PimError, PimResult};

/// Lifetime assumed when `az` does not report `expires_on`.
const ASSUMED_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Supplies bearer tokens for a resource audience.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self, resource: &str) -> PimResult<String>;

    /// Forget any cached token for `resource` after the API rejected it.
    async fn invalidate(&self, _resource: &str) {}
}

/// `az account get-access-token` output.
#[derive(Debug, Deserialize)]
struct AzTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Epoch seconds, reported by az 2.54 and later
    #[serde(default)]
    expires_on: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Tokens from the Azure CLI sign-in, cached per resource.
#[derive(Debug)]
pub struct AzCliTokenSource {
    cli: AzCli,
    cache: RwLock<HashMap<String, CachedToken>>,
    /// Refresh this long before expiry (default: 5 minutes)
    grace_period: Duration,
}

impl AzCliTokenSource {
    pub fn new(cli: AzCli) -> Self {
        Self {
            cli,
            cache: RwLock::new(HashMap::new()),
            grace_period: Duration::minutes(5),
        }
    }

    #[instrument(skip(self))]
    async fn acquire(&self, resource: &str) -> PimResult<CachedToken> {
        let stdout = self
            .cli
            .access_token(resource)
            .await
            .map_err(|e| match e {
                PimError::Precondition(_) => e,
                other => PimError::Auth(format!("Could not get a token for {resource}: {other}")),
            })?;

        let response: AzTokenResponse = serde_json::from_str(&stdout)
            .map_err(|e| PimError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = response
            .expires_on
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + Duration::minutes(ASSUMED_TOKEN_LIFETIME_MINUTES));

        debug!(
            "Acquired token for {}, expires at {}",
            resource,
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: response.access_token,
            expires_at,
        })
    }

}

#[async_trait]
impl TokenSource for AzCliTokenSource {
    async fn token(&self, resource: &str) -> PimResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(token) = cache.get(resource) {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let fresh = self.acquire(resource).await?;
        let access_token = fresh.access_token.clone();
        self.cache.write().await.insert(resource.to_string(), fresh);
        Ok(access_token)
    }

    async fn invalidate(&self, resource: &str) {
        if self.cache.write().await.remove(resource).is_some() {
            debug!("Dropped cached token for {}", resource);
        }
    }
}

/// Fixed token, for tests and pre-acquired credentials.
#[derive(Debug, Clone)]
pub struct StaticTokenSource(String);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self, _resource: &str) -> PimResult<String> {
        Ok(self.0.clone())
    }
}
