//! Fuzzy role picker.

use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;
use pimctl_core::{EligibleRole, PimError, PimResult, RoleSelector};

/// Picks a role with `dialoguer`'s fuzzy finder.
///
/// Esc or `q` backs out and is reported as a cancelled selection.
#[derive(Debug, Default)]
pub struct DialoguerSelector;

impl RoleSelector for DialoguerSelector {
    fn choose(&self, candidates: &[EligibleRole]) -> PimResult<Option<usize>> {
        let labels: Vec<String> = candidates.iter().map(EligibleRole::label).collect();

        let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Select role to activate")
            .items(&labels)
            .default(0)
            .max_length(15)
            .interact_opt()
            .map_err(|e| PimError::Internal(format!("selection prompt failed: {e}")))?;

        if let Some(index) = choice {
            if let Some(role) = candidates.get(index) {
                println!("\n{}", role_details(role));
            }
        }
        Ok(choice)
    }
}

/// Detail card for a role.
pub fn role_details(role: &EligibleRole) -> String {
    let mut lines = vec![
        "Role Details".to_string(),
        "─".repeat(36),
        format!("Role Name:      {}", role.role_name),
        format!("Role ID:        {}", role.role_definition_id),
        format!("Scope Type:     {}", role.scope_type),
        format!("Scope Name:     {}", role.scope_name),
        format!("Scope ID:       {}", role.scope),
        format!("Max Duration:   {} minutes", role.max_duration_minutes),
        format!("Assignment ID:  {}", role.eligibility_id),
    ];
    if role.is_group_based() {
        let via = role.principal_display_name().unwrap_or(&role.principal_id);
        lines.push(format!("Eligible via:   group {}", via));
    }
    lines.join("\n")
}
