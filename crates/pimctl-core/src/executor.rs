//! The command executor boundary.
//!
//! Every network call the core makes goes through [`CommandExecutor`], so
//! aggregation, linking and activation can be exercised against a scripted
//! fake without a network or an `az` installation.

use async_trait::async_trait;
use reqwest::Method;
use std::collections::HashSet;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{PimError, PimResult};
use crate::logging::Logger;
use crate::models::ArmPage;

/// Performs one authenticated call against the management or Graph API.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute `method url` with an optional JSON `body`.
    ///
    /// Returns the response body on success. A rejected call returns
    /// [`PimError::Api`] carrying the remote error body. Once `cancel` fires
    /// the call is abandoned and [`PimError::Interrupted`] is returned.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<u8>>;
}

/// GET `url` and decode the body as `T`.
pub async fn get_json<T: DeserializeOwned>(
    executor: &dyn CommandExecutor,
    url: &str,
    context: &str,
    cancel: &CancellationToken,
) -> PimResult<T> {
    let bytes = executor.execute(Method::GET, url, None, cancel).await?;
    serde_json::from_slice(&bytes).map_err(|e| PimError::parse(context, e))
}

/// Follow `nextLink` from `first_url` until exhausted, collecting every row.
///
/// Pages are requested strictly one after another. A `nextLink` pointing
/// at any page already fetched ends the walk instead of looping.
pub async fn collect_pages<T: DeserializeOwned>(
    executor: &dyn CommandExecutor,
    first_url: &str,
    context: &str,
    logger: &Logger,
    cancel: &CancellationToken,
) -> PimResult<Vec<T>> {
    let mut rows = Vec::new();
    let mut url = first_url.to_string();
    let mut visited = HashSet::new();

    loop {
        let page: ArmPage<T> = get_json(executor, &url, context, cancel).await?;
        visited.insert(url);
        rows.extend(page.value);

        match page.next_link.filter(|next| !next.is_empty()) {
            Some(next) if visited.contains(&next) => {
                tracing::warn!(url = %next, "nextLink points at a page already fetched, stopping");
                break;
            }
            Some(next) => {
                logger.debug(
                    context,
                    format!("following nextLink (page {})", visited.len() + 1),
                );
                url = next;
            }
            None => break,
        }
    }

    logger.debug(
        context,
        format!("collected {} row(s) from {} page(s)", rows.len(), visited.len()),
    );
    Ok(rows)
}
