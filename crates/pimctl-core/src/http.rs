//! `reqwest`-backed command executor.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::auth::TokenSource;
use crate::endpoints::ArmEndpoints;
use crate::error::{PimError, PimResult};
use crate::executor::CommandExecutor;
use crate::logging::{HttpLogEntry, Logger};

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Executes calls over HTTPS with a bearer token for the target API.
pub struct HttpExecutor {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl HttpExecutor {
    /// Creates a new executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        endpoints: ArmEndpoints,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
        logger: Arc<Logger>,
    ) -> PimResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pimctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            tokens,
            endpoints,
            logger,
        })
    }

    /// Token audience for `url`.
    fn resource_for(&self, url: &str) -> String {
        if self.endpoints.is_graph_url(url) {
            self.endpoints.graph_resource()
        } else {
            self.endpoints.management_resource()
        }
    }

    /// Send once, retrying a single time with a fresh token on 401.
    ///
    /// A 401 means the request was refused before it took effect, so
    /// repeating it is safe for every method.
    async fn send(&self, method: Method, url: &str, body: Option<&str>) -> PimResult<Vec<u8>> {
        let resource = self.resource_for(url);
        let (mut status, mut bytes) = self.attempt(&method, url, body, &resource).await?;

        if status == StatusCode::UNAUTHORIZED {
            self.logger
                .verbose("http", format!("401 from {url}, refreshing the access token"));
            self.tokens.invalidate(&resource).await;
            (status, bytes) = self.attempt(&method, url, body, &resource).await?;
        }

        if status.is_success() {
            Ok(bytes)
        } else {
            Err(PimError::from_response(status.as_u16(), &bytes))
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        body: Option<&str>,
        resource: &str,
    ) -> PimResult<(StatusCode, Vec<u8>)> {
        let token = self.tokens.token(resource).await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        self.logger.debug_request(method.as_str(), url);
        if let Some(body) = body {
            self.logger
                .trace_http(&HttpLogEntry::request(method.as_str(), url).with_body(body));
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.logger.debug_response(status.as_u16(), elapsed);
        self.logger.trace_http(
            &HttpLogEntry::response(status.as_u16(), elapsed)
                .with_body(String::from_utf8_lossy(&bytes)),
        );

        Ok((status, bytes.to_vec()))
    }
}

#[async_trait]
impl CommandExecutor for HttpExecutor {
    #[instrument(skip(self, body, cancel))]
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<u8>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PimError::Interrupted),
            result = self.send(method, url, body) => result,
        }
    }
}
