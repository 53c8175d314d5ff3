//! Self-activation requests.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::endpoints::ArmEndpoints;
use crate::error::{PimError, PimResult};
use crate::executor::CommandExecutor;
use crate::logging::Logger;
use crate::models::EligibleRole;
use crate::principal::PrincipalResolver;
use crate::schedule::ScheduleLinker;

/// Request type for activating one's own eligibility.
pub const SELF_ACTIVATE: &str = "SelfActivate";

/// What to activate and for how long.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRequest {
    pub role: EligibleRole,
    pub duration_minutes: u32,
    pub justification: String,
    pub ticket_number: Option<String>,
    pub ticket_system: Option<String>,
}

impl ActivationRequest {
    pub fn new(role: EligibleRole, duration_minutes: u32) -> Self {
        Self {
            role,
            duration_minutes,
            justification: String::new(),
            ticket_number: None,
            ticket_system: None,
        }
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    /// Attach ticket details; empty strings count as absent.
    pub fn with_ticket(mut self, number: Option<String>, system: Option<String>) -> Self {
        self.ticket_number = number;
        self.ticket_system = system;
        self
    }

    /// Duration must be positive and within the role's ceiling.
    pub fn validate(&self) -> PimResult<()> {
        if self.duration_minutes == 0 {
            return Err(PimError::Validation(
                "duration must be at least 1 minute".to_string(),
            ));
        }
        let max = self.role.max_duration_minutes;
        if max > 0 && self.duration_minutes > max {
            return Err(PimError::Validation(format!(
                "duration {} minutes exceeds the maximum of {} minutes for {}",
                self.duration_minutes, max, self.role.role_name
            )));
        }
        Ok(())
    }

    fn ticket_info(&self) -> Option<TicketInfo> {
        let number = non_empty(self.ticket_number.as_deref());
        let system = non_empty(self.ticket_system.as_deref());
        if number.is_none() && system.is_none() {
            return None;
        }
        Some(TicketInfo {
            ticket_number: number,
            ticket_system: system,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// ISO-8601 duration for whole minutes, e.g. `PT90M`.
pub fn iso_duration(minutes: u32) -> String {
    format!("PT{minutes}M")
}

/// `roleAssignmentScheduleRequests` PUT body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationBody {
    pub properties: ActivationProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationProperties {
    pub principal_id: String,
    pub role_definition_id: String,
    pub request_type: String,
    pub linked_role_eligibility_schedule_id: String,
    pub justification: String,
    pub schedule_info: ScheduleInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_info: Option<TicketInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInfo {
    pub start_date_time: String,
    pub expiration: Expiration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expiration {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_system: Option<String>,
}

/// Assemble the request body.
///
/// `activating_principal` is the signed-in user, never the eligibility's
/// principal.
pub fn build_body(
    request: &ActivationRequest,
    activating_principal: &str,
    schedule_id: &str,
    now: DateTime<Utc>,
) -> ActivationBody {
    ActivationBody {
        properties: ActivationProperties {
            principal_id: activating_principal.to_string(),
            role_definition_id: request.role.role_definition_id.clone(),
            request_type: SELF_ACTIVATE.to_string(),
            linked_role_eligibility_schedule_id: schedule_id.to_string(),
            justification: request.justification.clone(),
            schedule_info: ScheduleInfo {
                start_date_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
                expiration: Expiration {
                    kind: "AfterDuration".to_string(),
                    duration: iso_duration(request.duration_minutes),
                },
            },
            ticket_info: request.ticket_info(),
        },
    }
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReceipt {
    /// Name the request was submitted under
    pub request_id: Uuid,
    /// `properties.status` from the response, e.g. `Provisioned`
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    properties: SubmissionStatus,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionStatus {
    #[serde(default)]
    status: Option<String>,
}

/// A linked, serialized activation waiting to be sent.
#[derive(Debug, Clone)]
pub struct PreparedActivation {
    /// Name the request will be submitted under
    pub request_id: Uuid,
    url: String,
    payload: String,
    role_name: String,
    scope: String,
}

/// Submits self-activation requests.
#[derive(Clone)]
pub struct ActivationBuilder {
    principals: PrincipalResolver,
    linker: ScheduleLinker,
    executor: Arc<dyn CommandExecutor>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
}

impl ActivationBuilder {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        endpoints: ArmEndpoints,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            principals: PrincipalResolver::new(
                Arc::clone(&executor),
                endpoints.clone(),
                Arc::clone(&logger),
            ),
            linker: ScheduleLinker::new(Arc::clone(&executor), endpoints.clone(), Arc::clone(&logger)),
            executor,
            endpoints,
            logger,
        }
    }

    /// Validate, resolve and link `request`, then build the submission.
    ///
    /// Nothing is written here, so interrupting this step leaves no trace
    /// on the tenant.
    #[instrument(skip(self, request, cancel), fields(role = %request.role.role_name))]
    pub async fn prepare(
        &self,
        request: &ActivationRequest,
        cancel: &CancellationToken,
    ) -> PimResult<PreparedActivation> {
        request.validate()?;

        let activating_principal = self.principals.current_principal_id(cancel).await?;
        let schedule_id = self.linker.linked_schedule_id(&request.role, cancel).await;
        if cancel.is_cancelled() {
            return Err(PimError::Interrupted);
        }

        let request_id = Uuid::new_v4();
        let url = self
            .endpoints
            .assignment_schedule_request(&request.role.scope, &request_id.to_string())?;
        let body = build_body(request, &activating_principal, &schedule_id, Utc::now());

        Ok(PreparedActivation {
            request_id,
            url,
            payload: serde_json::to_string(&body)?,
            role_name: request.role.role_name.clone(),
            scope: request.role.scope.clone(),
        })
    }

    /// Send a prepared request as one PUT.
    ///
    /// `cancel` is honored only until the PUT goes out; a request already
    /// sent is waited for, since its outcome would otherwise be unknown.
    /// A rejected submission is returned as-is, remote body included.
    #[instrument(skip(self, prepared, cancel), fields(request_id = %prepared.request_id))]
    pub async fn submit(
        &self,
        prepared: &PreparedActivation,
        cancel: &CancellationToken,
    ) -> PimResult<ActivationReceipt> {
        if cancel.is_cancelled() {
            return Err(PimError::Interrupted);
        }

        let request_id = prepared.request_id;
        self.logger.verbose(
            "activate",
            format!(
                "submitting request {request_id} for {} at {}",
                prepared.role_name, prepared.scope
            ),
        );

        let in_flight = CancellationToken::new();
        let bytes = self
            .executor
            .execute(Method::PUT, &prepared.url, Some(&prepared.payload), &in_flight)
            .await?;

        let status = serde_json::from_slice::<SubmissionResponse>(&bytes)
            .ok()
            .and_then(|r| r.properties.status);
        if let Some(ref status) = status {
            self.logger
                .verbose("activate", format!("request {request_id} status: {status}"));
        }

        Ok(ActivationReceipt { request_id, status })
    }

    /// [`prepare`](Self::prepare) then [`submit`](Self::submit).
    pub async fn activate(
        &self,
        request: &ActivationRequest,
        cancel: &CancellationToken,
    ) -> PimResult<ActivationReceipt> {
        let prepared = self.prepare(request, cancel).await?;
        self.submit(&prepared, cancel).await
    }
}
