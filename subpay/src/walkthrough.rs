//! Scripted onboarding run: connect, create, top up, allocate, pay.
//!
//! Drives the same flows the screens use, without the simulated delays, so the
//! whole journey can be inspected from the CLI.

use anyhow::{Context, Result};
use tracing::info;

use crate::core::types::TimelineEntry;
use crate::flows::{
    CreatePlanRequest, FlowContext, allocate, connect_paypal, connect_wallet, create_plan, pay,
    top_up,
};
use crate::store::Store;

/// What the walkthrough produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkthroughReport {
    pub plan_id: String,
    /// Entries recorded by this run, oldest first.
    pub entries: Vec<TimelineEntry>,
}

/// Run the onboarding journey for `request` against `store`.
pub fn run_walkthrough(
    store: &mut Store,
    ctx: &FlowContext,
    request: &CreatePlanRequest,
) -> Result<WalkthroughReport> {
    connect_paypal(store);
    connect_wallet(store);

    let plan = create_plan(store, ctx, request);
    let plan_id = plan.id.clone();
    info!(plan_id = %plan_id, "walkthrough plan created");

    let entries = vec![
        top_up(store, ctx, &plan_id).context("top up")?,
        allocate(store, ctx, &plan_id, Some(&request.strategy_id))
            .or_else(|_| allocate(store, ctx, &plan_id, None))
            .context("allocate")?,
        pay(store, ctx, &plan_id).context("pay")?,
    ];

    Ok(WalkthroughReport { plan_id, entries })
}
