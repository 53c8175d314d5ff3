//! Helpers for Azure resource scope paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource scope a role grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeType {
    Subscription,
    ResourceGroup,
    ManagementGroup,
    #[default]
    Unknown,
}

impl ScopeType {
    /// Parse the `type` reported in expanded properties.
    ///
    /// The API is inconsistent about casing (`resourcegroup` vs `resourceGroup`).
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "subscription" => Self::Subscription,
            "resourcegroup" => Self::ResourceGroup,
            "managementgroup" => Self::ManagementGroup,
            _ => Self::Unknown,
        }
    }

    /// Infer the scope type from a scope path.
    ///
    /// Resource groups are checked before subscriptions because a resource
    /// group path also contains its subscription.
    pub fn detect(scope: &str) -> Self {
        if scope.contains("/resourceGroups/") {
            Self::ResourceGroup
        } else if scope.contains("/managementGroups/") {
            Self::ManagementGroup
        } else if scope.contains("/subscriptions/") {
            Self::Subscription
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::ResourceGroup => "resourceGroup",
            Self::ManagementGroup => "managementGroup",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last `/`-separated segment of a resource identifier.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Friendly name for a scope path.
///
/// Returns the segment following the first `subscriptions`,
/// `resourceGroups` or `managementGroups` marker, or the path itself.
pub fn scope_name(scope: &str) -> &str {
    let parts: Vec<&str> = scope.split('/').collect();
    parts
        .windows(2)
        .find(|pair| {
            matches!(
                pair[0],
                "subscriptions" | "resourceGroups" | "managementGroups"
            )
        })
        .map(|pair| pair[1])
        .unwrap_or(scope)
}

/// Scope path for a subscription ID.
pub fn subscription_scope(subscription_id: &str) -> String {
    format!("/subscriptions/{subscription_id}")
}
