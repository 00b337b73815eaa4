//! Pure state transitions for the demo store.
//!
//! `reduce` never mutates its input. Callers swap in the returned state, which
//! keeps every mutation a single assignment with nothing half-applied.

use tracing::warn;

use crate::core::status::validate_transition;
use crate::core::types::{NetworkEnv, Plan, PlanPatch, PlanStatus, TimelineEntry, User};
use crate::state::DemoState;

/// A single store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetDemoMode(bool),
    SetNetworkEnv(NetworkEnv),
    SetWalletConnected(bool),
    SetPaypalConnected(bool),
    SetUser(User),
    AddPlan(Plan),
    UpdatePlan { id: String, patch: PlanPatch },
    AddTimelineEntry(TimelineEntry),
}

/// What happened when an action was reduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// `UpdatePlan` named an id that is not in the collection.
    PlanNotFound,
    /// `UpdatePlan` tried a status change the state machine forbids.
    TransitionRejected {
        from: PlanStatus,
        to: PlanStatus,
        message: String,
    },
}

/// Result of [`reduce`]: the next state plus the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub state: DemoState,
    pub outcome: Outcome,
}

/// Apply `action` to `state`, returning the next state.
///
/// Rejected or unmatched actions return a state equal to the input.
pub fn reduce(state: &DemoState, action: Action) -> Reduction {
    let mut next = state.clone();
    let outcome = match action {
        Action::SetDemoMode(enabled) => {
            next.demo_mode = enabled;
            Outcome::Applied
        }
        Action::SetNetworkEnv(env) => {
            next.network_env = env;
            Outcome::Applied
        }
        Action::SetWalletConnected(connected) => {
            next.wallet_connected = connected;
            Outcome::Applied
        }
        Action::SetPaypalConnected(connected) => {
            next.paypal_connected = connected;
            Outcome::Applied
        }
        Action::SetUser(user) => {
            next.user = Some(user);
            Outcome::Applied
        }
        Action::AddPlan(plan) => {
            if next.plans.iter().any(|existing| existing.id == plan.id) {
                warn!(plan_id = %plan.id, "adding plan with duplicate id");
            }
            next.plans.push(plan);
            Outcome::Applied
        }
        Action::UpdatePlan { id, patch } => update_plan(&mut next, &id, &patch),
        Action::AddTimelineEntry(entry) => {
            next.timeline.insert(0, entry);
            Outcome::Applied
        }
    };

    match outcome {
        Outcome::Applied => Reduction {
            state: next,
            outcome,
        },
        _ => Reduction {
            state: state.clone(),
            outcome,
        },
    }
}

fn update_plan(state: &mut DemoState, id: &str, patch: &PlanPatch) -> Outcome {
    let Some(plan) = state.plans.iter_mut().find(|plan| plan.id == id) else {
        return Outcome::PlanNotFound;
    };

    if let Some(to) = patch.status {
        let from = plan.status;
        if let Err(message) = validate_transition(from, to) {
            return Outcome::TransitionRejected { from, to, message };
        }
    }

    patch.apply_to(plan);
    Outcome::Applied
}
