//! Choosing one eligible role.

use crate::error::{PimError, PimResult};
use crate::models::EligibleRole;

/// Something that can ask a person to pick one candidate.
pub trait RoleSelector {
    /// Index of the chosen candidate, or `None` when the user backs out.
    fn choose(&self, candidates: &[EligibleRole]) -> PimResult<Option<usize>>;
}

/// Pick a role from `roles`.
///
/// A single candidate is taken without consulting `selector`. With several
/// candidates and no one to ask, this fails instead of blocking.
pub fn select_role<S: RoleSelector + ?Sized>(
    selector: &S,
    roles: &[EligibleRole],
    non_interactive: bool,
) -> PimResult<EligibleRole> {
    match roles {
        [] => Err(PimError::NoCandidates),
        [only] => Ok(only.clone()),
        many if non_interactive => Err(PimError::AmbiguousSelection { count: many.len() }),
        many => match selector.choose(many)? {
            Some(index) => many.get(index).cloned().ok_or_else(|| {
                PimError::Internal(format!("selector returned out-of-range index {index}"))
            }),
            None => Err(PimError::SelectionCancelled),
        },
    }
}
