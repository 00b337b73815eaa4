//! The demo store: an owned application-state object.
//!
//! The composition root (the CLI command or the UI server) owns one `Store`
//! and hands it to whoever needs it. Every mutation goes through
//! [`reduce`], so the store itself holds no mutation logic.

use tracing::{debug, warn};

use crate::core::reducer::{Action, Outcome, reduce};
use crate::core::types::{NetworkEnv, Plan, PlanPatch, Strategy, TimelineEntry, User};
use crate::state::{DemoState, seed_state};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    state: DemoState,
}

impl Default for Store {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Store {
    pub fn new(state: DemoState) -> Self {
        Self { state }
    }

    /// Store holding the built-in seed data.
    pub fn seeded() -> Self {
        Self::new(seed_state())
    }

    /// Reduce `action` into the current state and report the outcome.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        debug!(action = ?action, "dispatch");
        let reduction = reduce(&self.state, action);
        if let Outcome::TransitionRejected { message, .. } = &reduction.outcome {
            warn!(%message, "plan update rejected");
        }
        self.state = reduction.state;
        reduction.outcome
    }

    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.dispatch(Action::SetDemoMode(enabled));
    }

    pub fn set_network_env(&mut self, env: NetworkEnv) {
        self.dispatch(Action::SetNetworkEnv(env));
    }

    pub fn set_wallet_connected(&mut self, connected: bool) {
        self.dispatch(Action::SetWalletConnected(connected));
    }

    pub fn set_paypal_connected(&mut self, connected: bool) {
        self.dispatch(Action::SetPaypalConnected(connected));
    }

    pub fn set_user(&mut self, user: User) {
        self.dispatch(Action::SetUser(user));
    }

    /// Append a plan. The caller picks the id; duplicates are not rejected.
    pub fn add_plan(&mut self, plan: Plan) {
        self.dispatch(Action::AddPlan(plan));
    }

    /// Shallow-merge `patch` into the first plan with `id`.
    pub fn update_plan(&mut self, id: &str, patch: PlanPatch) -> Outcome {
        self.dispatch(Action::UpdatePlan {
            id: id.to_string(),
            patch,
        })
    }

    /// Prepend a timeline entry (newest first).
    pub fn add_timeline_entry(&mut self, entry: TimelineEntry) {
        self.dispatch(Action::AddTimelineEntry(entry));
    }

    pub fn get_plan(&self, id: &str) -> Option<&Plan> {
        self.state.plans.iter().find(|plan| plan.id == id)
    }

    pub fn contains_plan(&self, id: &str) -> bool {
        self.get_plan(id).is_some()
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    pub fn plans(&self) -> &[Plan] {
        &self.state.plans
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.state.strategies
    }

    pub fn strategy(&self, id: &str) -> Option<&Strategy> {
        self.state.strategies.iter().find(|strategy| strategy.id == id)
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.state.timeline
    }

    /// Timeline entries linked to `plan_id`, newest first.
    pub fn timeline_for_plan(&self, plan_id: &str) -> Vec<&TimelineEntry> {
        self.state
            .timeline
            .iter()
            .filter(|entry| entry.plan_id.as_deref() == Some(plan_id))
            .collect()
    }

    /// Plan the onboarding screens operate on: Netflix if present, else the first.
    pub fn current_plan(&self) -> Option<&Plan> {
        self.state
            .plans
            .iter()
            .find(|plan| plan.merchant == "Netflix")
            .or_else(|| self.state.plans.first())
    }
}
