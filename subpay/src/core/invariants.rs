//! Semantic invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::core::types::Plan;
use crate::state::DemoState;

/// Check semantic invariants of a whole state:
/// - No duplicate plan ids or strategy ids
/// - Amounts (`base_amount_usd`, `addon_usd`, `pot_balance`, `apr`) are non-negative
/// - `coverage_pct <= 100`
/// - Timeline `plan_id` references point at an existing plan
/// - Strategy APR is non-negative
pub fn validate_invariants(state: &DemoState) -> Vec<String> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for plan in &state.plans {
        if !seen.insert(plan.id.as_str()) {
            errors.push(format!("duplicate plan id '{}'", plan.id));
        }
        errors.extend(validate_plan(plan));
    }

    let mut strategy_ids = HashSet::new();
    for strategy in &state.strategies {
        if !strategy_ids.insert(strategy.id.as_str()) {
            errors.push(format!("duplicate strategy id '{}'", strategy.id));
        }
        if strategy.apr.is_sign_negative() && !strategy.apr.is_zero() {
            errors.push(format!("strategies/{}: apr must be >= 0", strategy.id));
        }
    }

    for (idx, entry) in state.timeline.iter().enumerate() {
        if let Some(plan_id) = &entry.plan_id
            && !seen.contains(plan_id.as_str())
        {
            errors.push(format!(
                "timeline/{}: unknown plan_id '{}'",
                idx, plan_id
            ));
        }
    }

    errors
}

/// Field-level invariants of one plan: non-negative amounts, coverage <= 100.
pub fn validate_plan(plan: &Plan) -> Vec<String> {
    let path = format!("plans/{}", plan.id);
    let mut errors = Vec::new();
    for (field, value) in [
        ("base_amount_usd", plan.base_amount_usd),
        ("addon_usd", plan.addon_usd),
        ("pot_balance", plan.pot_balance),
        ("apr", plan.apr),
    ] {
        if value.is_sign_negative() && !value.is_zero() {
            errors.push(format!("{}: {} must be >= 0 (got {})", path, field, value));
        }
    }
    if plan.coverage_pct > 100 {
        errors.push(format!(
            "{}: coverage_pct {} exceeds 100",
            path, plan.coverage_pct
        ));
    }
    errors
}
