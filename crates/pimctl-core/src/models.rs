//! Data models for eligible roles, active assignments and subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope::{last_segment, scope_name, ScopeType};

/// Activation ceiling used when the API carries no policy information.
pub const DEFAULT_MAX_DURATION_MINUTES: u32 = 480;

/// Page of an Azure Resource Manager collection.
#[derive(Debug, Deserialize)]
pub struct ArmPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

/// Role definition details from `$expand=roleDefinition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinitionInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Scope details from expanded properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Principal details from `$expand=principal`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// The `expandedProperties` block of a schedule instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedProperties {
    #[serde(default)]
    pub role_definition: RoleDefinitionInfo,
    #[serde(default)]
    pub scope: ScopeInfo,
    #[serde(default)]
    pub principal: PrincipalInfo,
}

/// Properties shared by eligibility and assignment schedule instances.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProperties {
    #[serde(default)]
    pub role_definition_id: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub member_type: String,
    #[serde(default)]
    pub assignment_type: Option<String>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub expanded_properties: Option<ExpandedProperties>,
}

/// One row of `roleEligibilityScheduleInstances` or `roleAssignmentScheduleInstances`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInstance {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: InstanceProperties,
}

/// Role name, scope name and scope type for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    pub role_name: String,
    pub scope_name: String,
    pub scope_type: ScopeType,
}

impl InstanceProperties {
    /// Resolve display names from expanded properties, deriving any the API
    /// left out from the raw identifiers.
    pub fn display_names(&self) -> DisplayNames {
        let expanded = self.expanded_properties.as_ref();

        let role_name = expanded
            .map(|e| e.role_definition.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| last_segment(&self.role_definition_id))
            .to_string();

        let scope_name = expanded
            .map(|e| e.scope.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| scope_name(&self.scope))
            .to_string();

        let scope_type = expanded
            .map(|e| ScopeType::parse(&e.scope.kind))
            .filter(|kind| *kind != ScopeType::Unknown)
            .unwrap_or_else(|| ScopeType::detect(&self.scope));

        DisplayNames {
            role_name,
            scope_name,
            scope_type,
        }
    }
}

/// Parse an RFC 3339 timestamp; anything malformed or empty becomes `None`.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .filter(|v| !v.is_empty())
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// A role the caller may self-activate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleRole {
    /// Instance resource ID (`.../roleEligibilityScheduleInstances/{name}`)
    pub id: String,
    pub eligibility_id: String,
    pub role_definition_id: String,
    pub role_name: String,
    /// Full resource path the eligibility applies to
    pub scope: String,
    pub scope_name: String,
    pub scope_type: ScopeType,
    /// Principal recorded on the eligibility; a group for group-based eligibility
    pub principal_id: String,
    pub status: String,
    pub member_type: String,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub max_duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded_properties: Option<ExpandedProperties>,
}

impl EligibleRole {
    /// Map one API row.
    pub fn from_instance(instance: ScheduleInstance, max_duration_minutes: u32) -> Self {
        let names = instance.properties.display_names();
        let props = instance.properties;

        Self {
            eligibility_id: instance.id.clone(),
            id: instance.id,
            role_definition_id: props.role_definition_id,
            role_name: names.role_name,
            scope: props.scope,
            scope_name: names.scope_name,
            scope_type: names.scope_type,
            principal_id: props.principal_id,
            status: props.status,
            member_type: props.member_type,
            start_date_time: parse_timestamp(props.start_date_time.as_deref()),
            end_date_time: parse_timestamp(props.end_date_time.as_deref()),
            max_duration_minutes,
            expanded_properties: props.expanded_properties,
        }
    }

    /// Label shown in the selection list: `role | scope | type`.
    pub fn label(&self) -> String {
        format!("{} | {} | {}", self.role_name, self.scope_name, self.scope_type)
    }

    /// Name of the eligibility principal, when the API expanded it.
    pub fn principal_display_name(&self) -> Option<&str> {
        self.expanded_properties
            .as_ref()
            .map(|e| e.principal.display_name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// True when the eligibility is held through a group.
    pub fn is_group_based(&self) -> bool {
        self.member_type.eq_ignore_ascii_case("Group")
            || self
                .expanded_properties
                .as_ref()
                .is_some_and(|e| e.principal.kind.eq_ignore_ascii_case("Group"))
    }
}

/// A currently active role assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAssignment {
    pub id: String,
    pub role_definition_id: String,
    pub role_name: String,
    pub scope: String,
    pub scope_name: String,
    pub scope_type: ScopeType,
    pub principal_id: String,
    pub status: String,
    pub member_type: String,
    /// `Activated` for PIM activations, `Assigned` for permanent grants
    pub assignment_type: Option<String>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl ActiveAssignment {
    pub fn from_instance(instance: ScheduleInstance) -> Self {
        let names = instance.properties.display_names();
        let props = instance.properties;

        Self {
            id: instance.id,
            role_definition_id: props.role_definition_id,
            role_name: names.role_name,
            scope: props.scope,
            scope_name: names.scope_name,
            scope_type: names.scope_type,
            principal_id: props.principal_id,
            status: props.status,
            member_type: props.member_type,
            assignment_type: props.assignment_type,
            start_date_time: parse_timestamp(props.start_date_time.as_deref()),
            end_date_time: parse_timestamp(props.end_date_time.as_deref()),
        }
    }

    /// Status for display; the API omits it for some assignment kinds.
    pub fn display_status(&self) -> &str {
        if self.status.is_empty() {
            "Active"
        } else {
            &self.status
        }
    }
}

/// A subscription visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// The signed-in user, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl UserInfo {
    /// Best available human-readable name.
    pub fn name(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if let Some(ref upn) = self.user_principal_name {
            upn
        } else {
            self.mail.as_deref().unwrap_or("(unknown)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(value: serde_json::Value) -> ScheduleInstance {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mapping_with_expanded_properties() {
        let row = instance(json!({
            "id": "/subscriptions/s1/providers/Microsoft.Authorization/roleEligibilityScheduleInstances/inst-1",
            "name": "inst-1",
            "properties": {
                "roleDefinitionId": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/b24988ac",
                "scope": "/subscriptions/s1",
                "principalId": "group-7",
                "status": "Provisioned",
                "memberType": "Group",
                "startDateTime": "2024-05-01T08:00:00.000Z",
                "endDateTime": "2025-05-01T08:00:00Z",
                "expandedProperties": {
                    "roleDefinition": {"id": "x", "displayName": "Contributor", "type": "BuiltInRole"},
                    "scope": {"id": "/subscriptions/s1", "displayName": "Production", "type": "subscription"},
                    "principal": {"id": "group-7", "displayName": "Ops Admins", "type": "Group"}
                }
            }
        }));

        let role = EligibleRole::from_instance(row, DEFAULT_MAX_DURATION_MINUTES);
        assert_eq!(role.role_name, "Contributor");
        assert_eq!(role.scope_name, "Production");
        assert_eq!(role.scope_type, ScopeType::Subscription);
        assert_eq!(role.eligibility_id, role.id);
        assert_eq!(role.max_duration_minutes, 480);
        assert!(role.start_date_time.is_some());
        assert!(role.end_date_time.is_some());
        assert!(role.is_group_based());
        assert_eq!(role.principal_display_name(), Some("Ops Admins"));
    }

    #[test]
    fn test_mapping_derives_names_without_expansion() {
        let row = instance(json!({
            "id": "/subscriptions/s1/resourceGroups/rg-web/providers/Microsoft.Authorization/roleEligibilityScheduleInstances/inst-2",
            "properties": {
                "roleDefinitionId": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/acdd72a7",
                "scope": "/subscriptions/s1/resourceGroups/rg-web",
                "principalId": "user-1",
                "memberType": "Direct"
            }
        }));

        let role = EligibleRole::from_instance(row, DEFAULT_MAX_DURATION_MINUTES);
        assert_eq!(role.role_name, "acdd72a7");
        assert_eq!(role.scope_name, "s1");
        assert_eq!(role.scope_type, ScopeType::ResourceGroup);
        assert!(role.start_date_time.is_none());
        assert!(!role.is_group_based());
    }

    #[test]
    fn test_malformed_timestamps_are_dropped() {
        let row = instance(json!({
            "id": "i",
            "properties": {
                "startDateTime": "yesterday",
                "endDateTime": ""
            }
        }));

        let role = EligibleRole::from_instance(row, 60);
        assert!(role.start_date_time.is_none());
        assert!(role.end_date_time.is_none());
        assert_eq!(role.max_duration_minutes, 60);
    }

    #[test]
    fn test_empty_expanded_names_fall_back() {
        let row = instance(json!({
            "id": "i",
            "properties": {
                "roleDefinitionId": "/providers/Microsoft.Authorization/roleDefinitions/r9",
                "scope": "/providers/Microsoft.Management/managementGroups/mg1",
                "expandedProperties": {"roleDefinition": {}, "scope": {"type": ""}}
            }
        }));

        let role = EligibleRole::from_instance(row, 480);
        assert_eq!(role.role_name, "r9");
        assert_eq!(role.scope_name, "mg1");
        assert_eq!(role.scope_type, ScopeType::ManagementGroup);
    }

    #[test]
    fn test_page_without_next_link() {
        let page: ArmPage<ScheduleInstance> = serde_json::from_value(json!({"value": []})).unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_active_assignment_status_default() {
        let row = instance(json!({"id": "a", "properties": {"assignmentType": "Activated"}}));
        let active = ActiveAssignment::from_instance(row);
        assert_eq!(active.display_status(), "Active");
        assert_eq!(active.assignment_type.as_deref(), Some("Activated"));
    }

    #[test]
    fn test_label() {
        let row = instance(json!({
            "id": "i",
            "properties": {"roleDefinitionId": "/x/Reader", "scope": "/subscriptions/s9"}
        }));
        let role = EligibleRole::from_instance(row, 480);
        assert_eq!(role.label(), "Reader | s9 | subscription");
    }

    #[test]
    fn test_user_name_fallbacks() {
        let user = UserInfo {
            user_principal_name: Some("ada@example.com".into()),
            ..Default::default()
        };
        assert_eq!(user.name(), "ada@example.com");
        assert_eq!(UserInfo::default().name(), "(unknown)");
    }
}
