//! Table rendering for role listings

use pimctl_core::{ActiveAssignment, EligibleRole};
use std::fmt::Write;

const ROLE_WIDTH: usize = 28;
const SCOPE_WIDTH: usize = 38;

/// Truncate a string for table display, handling Unicode safely.
///
/// If the string exceeds `max_len` characters, it is cut and "..." appended
/// so the result is exactly `max_len` characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// ROLE / SCOPE / TYPE table of eligible roles.
pub fn render_roles(roles: &[EligibleRole]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<30} {:<40} {:<15}", "ROLE", "SCOPE", "TYPE");
    let _ = writeln!(out, "{}", "-".repeat(85));
    for role in roles {
        let _ = writeln!(
            out,
            "{:<30} {:<40} {:<15}",
            truncate(&role.role_name, ROLE_WIDTH),
            truncate(&role.scope_name, SCOPE_WIDTH),
            role.scope_type.as_str()
        );
    }
    out
}

/// ROLE / SCOPE / TYPE / STATUS table of active assignments.
pub fn render_assignments(assignments: &[ActiveAssignment]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<30} {:<40} {:<15} {:<10}",
        "ROLE", "SCOPE", "TYPE", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(96));
    for assignment in assignments {
        let _ = writeln!(
            out,
            "{:<30} {:<40} {:<15} {:<10}",
            truncate(&assignment.role_name, ROLE_WIDTH),
            truncate(&assignment.scope_name, SCOPE_WIDTH),
            assignment.scope_type.as_str(),
            assignment.display_status()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pimctl_core::ScopeType;

    fn role(name: &str, scope_name: &str) -> EligibleRole {
        EligibleRole {
            id: "id".to_string(),
            eligibility_id: "id".to_string(),
            role_definition_id: "rd".to_string(),
            role_name: name.to_string(),
            scope: format!("/subscriptions/{scope_name}"),
            scope_name: scope_name.to_string(),
            scope_type: ScopeType::Subscription,
            principal_id: "p".to_string(),
            status: "Provisioned".to_string(),
            member_type: "Direct".to_string(),
            start_date_time: None,
            end_date_time: None,
            max_duration_minutes: 480,
            expanded_properties: None,
        }
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate("hello world this is long", 10);
        assert_eq!(result, "hello w...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate("héllo wörld café über", 10);
        assert_eq!(result.chars().count(), 10);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_roles_table_truncates_columns() {
        let long_role = "Virtual Machine Administrator Login";
        let long_scope = "a-very-long-subscription-display-name-for-production";
        let table = render_roles(&[role(long_role, long_scope)]);

        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("Virtual Machine Administr..."));
        assert!(row.contains(&truncate(long_scope, 38)));
        assert!(row.contains("subscription"));
    }

    #[test]
    fn test_assignments_table_defaults_status() {
        let assignment = ActiveAssignment {
            id: "a".to_string(),
            role_definition_id: "rd".to_string(),
            role_name: "Reader".to_string(),
            scope: "/subscriptions/s".to_string(),
            scope_name: "s".to_string(),
            scope_type: ScopeType::Subscription,
            principal_id: "p".to_string(),
            status: String::new(),
            member_type: "Direct".to_string(),
            assignment_type: Some("Activated".to_string()),
            start_date_time: None,
            end_date_time: None,
        };
        let table = render_assignments(&[assignment]);
        assert!(table.lines().nth(2).unwrap().trim_end().ends_with("Active"));
    }
}
