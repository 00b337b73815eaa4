//! Plan status transitions.
//!
//! Status is a small finite-state machine:
//! - `setup -> active` when a plan finishes onboarding.
//! - `active -> paused` when the user stops the add-on.
//! - `active -> active` re-confirms a running plan.
//!
//! Every other write is rejected and leaves the plan untouched.

use crate::core::types::PlanStatus;

/// Returns true if `from -> to` is an allowed transition.
pub fn is_allowed(from: PlanStatus, to: PlanStatus) -> bool {
    matches!(
        (from, to),
        (PlanStatus::Setup, PlanStatus::Active)
            | (PlanStatus::Active, PlanStatus::Paused)
            | (PlanStatus::Active, PlanStatus::Active)
    )
}

/// Validate a status transition, returning a stable error message on rejection.
pub fn validate_transition(from: PlanStatus, to: PlanStatus) -> Result<(), String> {
    if is_allowed(from, to) {
        return Ok(());
    }
    Err(format!("invalid status transition: {} -> {}", from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PlanStatus; 3] = [PlanStatus::Active, PlanStatus::Paused, PlanStatus::Setup];

    #[test]
    fn only_three_transitions_are_allowed() {
        let allowed: Vec<(PlanStatus, PlanStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| is_allowed(*from, *to))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (PlanStatus::Active, PlanStatus::Active),
                (PlanStatus::Active, PlanStatus::Paused),
                (PlanStatus::Setup, PlanStatus::Active),
            ]
        );
    }

    /// Paused plans cannot silently flip back to setup.
    #[test]
    fn rejects_paused_to_setup() {
        let err = validate_transition(PlanStatus::Paused, PlanStatus::Setup).expect_err("reject");
        assert_eq!(err, "invalid status transition: paused -> setup");
    }

    #[test]
    fn accepts_setup_to_active() {
        assert!(validate_transition(PlanStatus::Setup, PlanStatus::Active).is_ok());
    }
}
