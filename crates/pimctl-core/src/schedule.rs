//! Linking an eligibility instance to its parent eligibility schedule.

use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::endpoints::ArmEndpoints;
use crate::error::{PimError, PimResult};
use crate::executor::{get_json, CommandExecutor};
use crate::logging::Logger;
use crate::models::{ArmPage, EligibleRole};
use crate::scope::last_segment;

#[derive(Debug, Deserialize)]
struct ScheduleRef {
    #[serde(default)]
    name: String,
}

/// Finds the `linkedRoleEligibilityScheduleId` for an activation.
#[derive(Clone)]
pub struct ScheduleLinker {
    executor: Arc<dyn CommandExecutor>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
}

impl ScheduleLinker {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        endpoints: ArmEndpoints,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            executor,
            endpoints,
            logger,
        }
    }

    /// Name of the first eligibility schedule at `scope` matching the
    /// principal and role definition, if any.
    pub async fn lookup(
        &self,
        scope: &str,
        role_definition_id: &str,
        principal_id: &str,
        cancel: &CancellationToken,
    ) -> PimResult<Option<String>> {
        let url = self
            .endpoints
            .eligibility_schedules(scope, principal_id, role_definition_id)?;
        let page: ArmPage<ScheduleRef> =
            get_json(self.executor.as_ref(), &url, "eligibility schedules", cancel).await?;

        Ok(page
            .value
            .into_iter()
            .map(|s| s.name)
            .find(|name| !name.is_empty()))
    }

    /// Schedule ID to link when activating `role`.
    ///
    /// The lookup is filtered by the eligibility's own principal, which for
    /// group-based eligibility is the group. When the lookup fails or finds
    /// nothing the last path segment of the instance ID is used instead, so
    /// this never fails. An interruption also takes the fallback; the caller
    /// observes the cancelled token on its next call.
    pub async fn linked_schedule_id(
        &self,
        role: &EligibleRole,
        cancel: &CancellationToken,
    ) -> String {
        let outcome = self
            .lookup(&role.scope, &role.role_definition_id, &role.principal_id, cancel)
            .await;

        match outcome {
            Ok(Some(name)) => {
                self.logger
                    .verbose("schedule", format!("linked eligibility schedule: {name}"));
                name
            }
            Ok(None) => self.fallback(role, "no matching schedule"),
            Err(PimError::Interrupted) => self.fallback(role, "lookup interrupted"),
            Err(e) => {
                debug!(error = %e, "eligibility schedule lookup failed");
                self.fallback(role, &e.to_string())
            }
        }
    }

    fn fallback(&self, role: &EligibleRole, reason: &str) -> String {
        let id = last_segment(&role.id).to_string();
        self.logger.verbose(
            "schedule",
            format!("using instance name {id} as schedule ID ({reason})"),
        );
        id
    }
}
