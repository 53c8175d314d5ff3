//! Resolution of the signed-in (activating) principal.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::azcli::AzCli;
use crate::endpoints::ArmEndpoints;
use crate::error::{PimError, PimResult};
use crate::executor::{get_json, CommandExecutor};
use crate::logging::Logger;
use crate::models::UserInfo;

/// Looks up who is calling, independent of any eligibility record.
#[derive(Clone)]
pub struct PrincipalResolver {
    executor: Arc<dyn CommandExecutor>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
    account_fallback: Option<AzCli>,
}

impl PrincipalResolver {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        endpoints: ArmEndpoints,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            executor,
            endpoints,
            logger,
            account_fallback: None,
        }
    }

    /// Use `az account show` for display names when Graph is unavailable.
    pub fn with_account_fallback(mut self, cli: AzCli) -> Self {
        self.account_fallback = Some(cli);
        self
    }

    async fn signed_in_user(&self, cancel: &CancellationToken) -> PimResult<UserInfo> {
        let url = self.endpoints.signed_in_user()?;
        get_json(self.executor.as_ref(), &url, "signed-in user", cancel).await
    }

    /// Object ID of the signed-in user. This is the ID an activation is
    /// submitted under.
    #[instrument(skip(self, cancel))]
    pub async fn current_principal_id(&self, cancel: &CancellationToken) -> PimResult<String> {
        let user = self.signed_in_user(cancel).await.map_err(|e| match e {
            PimError::Interrupted => e,
            other => PimError::Principal(other.to_string()),
        })?;

        let id = user.id.trim();
        if id.is_empty() {
            return Err(PimError::Principal(
                "directory returned no object ID for the signed-in user".to_string(),
            ));
        }

        self.logger
            .verbose("principal", format!("activating principal: {id}"));
        Ok(id.to_string())
    }

    /// The signed-in user for display, falling back to the CLI account name.
    pub async fn current_user(&self, cancel: &CancellationToken) -> PimResult<UserInfo> {
        match self.signed_in_user(cancel).await {
            Ok(user) => Ok(user),
            Err(PimError::Interrupted) => Err(PimError::Interrupted),
            Err(e) => match self.account_fallback {
                Some(ref cli) => {
                    self.logger.verbose(
                        "principal",
                        format!("directory lookup failed ({e}), using CLI account name"),
                    );
                    cli.account_user().await
                }
                None => Err(e),
            },
        }
    }
}
