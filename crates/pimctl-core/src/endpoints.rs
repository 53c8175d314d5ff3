//! URL construction for the management and Graph APIs.

use url::Url;

use crate::error::PimResult;

/// Default Azure Resource Manager endpoint
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
/// Default Microsoft Graph endpoint
pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";
/// API version of the PIM schedule resources
pub const PIM_API_VERSION: &str = "2020-10-01";
/// API version used for subscription enumeration
pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

const AUTHORIZATION_PROVIDER: &str = "providers/Microsoft.Authorization";
const EXPAND: &str = "roleDefinition,principal";

/// Base endpoints and API versions for every request the core issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmEndpoints {
    management: String,
    graph: String,
    api_version: String,
    subscriptions_api_version: String,
}

impl Default for ArmEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_MANAGEMENT_ENDPOINT, DEFAULT_GRAPH_ENDPOINT)
    }
}

impl ArmEndpoints {
    pub fn new(management: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            management: management.into().trim_end_matches('/').to_string(),
            graph: graph.into().trim_end_matches('/').to_string(),
            api_version: PIM_API_VERSION.to_string(),
            subscriptions_api_version: SUBSCRIPTIONS_API_VERSION.to_string(),
        }
    }

    /// Override the PIM API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Override the subscription listing API version.
    pub fn with_subscriptions_api_version(mut self, version: impl Into<String>) -> Self {
        self.subscriptions_api_version = version.into();
        self
    }

    /// Both endpoints pointing at one host, as used against a mock server.
    pub fn single_host(base: impl Into<String>) -> Self {
        let base = base.into();
        Self::new(base.clone(), base)
    }

    pub fn management(&self) -> &str {
        &self.management
    }

    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Token audience for the management API
    pub fn management_resource(&self) -> String {
        format!("{}/", self.management)
    }

    /// Token audience for Microsoft Graph
    pub fn graph_resource(&self) -> String {
        format!("{}/", self.graph)
    }

    /// `{management}{scope}/providers/Microsoft.Authorization/{resource}`
    ///
    /// An empty scope maps to the unscoped (tenant-root) endpoint.
    fn authorization_url(&self, scope: &str, resource: &str) -> PimResult<Url> {
        let scope = scope.trim_end_matches('/');
        let raw = format!(
            "{}{}/{}/{}",
            self.management, scope, AUTHORIZATION_PROVIDER, resource
        );
        Ok(Url::parse(&raw)?)
    }

    /// Eligible role instances visible to the caller at `scope`.
    pub fn eligible_instances(&self, scope: &str) -> PimResult<String> {
        let mut url = self.authorization_url(scope, "roleEligibilityScheduleInstances")?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version)
            .append_pair("$filter", "asTarget()")
            .append_pair("$expand", EXPAND);
        Ok(url.into())
    }

    /// Durable eligibility schedules for one principal and role definition.
    pub fn eligibility_schedules(
        &self,
        scope: &str,
        principal_id: &str,
        role_definition_id: &str,
    ) -> PimResult<String> {
        let mut url = self.authorization_url(scope, "roleEligibilitySchedules")?;
        let filter = format!(
            "principalId eq '{}' and roleDefinitionId eq '{}'",
            principal_id, role_definition_id
        );
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version)
            .append_pair("$filter", &filter);
        Ok(url.into())
    }

    /// Activation request resource keyed by a generated request name.
    pub fn assignment_schedule_request(&self, scope: &str, request_name: &str) -> PimResult<String> {
        let resource = format!("roleAssignmentScheduleRequests/{request_name}");
        let mut url = self.authorization_url(scope, &resource)?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url.into())
    }

    /// Active assignment instances for the caller at tenant root.
    pub fn active_instances(&self) -> PimResult<String> {
        let mut url = self.authorization_url("", "roleAssignmentScheduleInstances")?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version)
            .append_pair("$filter", "asTarget()")
            .append_pair("$expand", EXPAND);
        Ok(url.into())
    }

    /// Subscriptions the caller can list.
    pub fn subscriptions(&self) -> PimResult<String> {
        let mut url = Url::parse(&format!("{}/subscriptions", self.management))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.subscriptions_api_version);
        Ok(url.into())
    }

    /// Signed-in user from Microsoft Graph.
    pub fn signed_in_user(&self) -> PimResult<String> {
        let mut url = Url::parse(&format!("{}/v1.0/me", self.graph))?;
        url.query_pairs_mut()
            .append_pair("$select", "id,displayName,mail,userPrincipalName");
        Ok(url.into())
    }

    /// True when `url` targets the Graph endpoint rather than the management API.
    pub fn is_graph_url(&self, url: &str) -> bool {
        self.graph != self.management && url.starts_with(&self.graph)
    }
}
