//! Coverage and yield placeholders.
//!
//! None of these numbers are real yield. They are display arithmetic over the
//! plan's mock inputs, kept in one place so every caller agrees.
//!
//! Inputs come straight from API bodies and query strings, so the arithmetic
//! saturates at `Decimal::MAX` instead of panicking on overflow.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::types::Plan;

/// Cap on the pay-intent screen's coverage estimate.
pub const PAY_INTENT_COVERAGE_CAP: u8 = 25;

/// Which formula recomputes `coverage_pct` after a pot change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageFormula {
    /// `pot / base * 100`: share of the next bill the pot could pay today.
    #[default]
    PotRatio,
    /// Per-screen multipliers from the first demo build (top-up x8, allocate x12).
    Legacy,
}

/// Event that triggered a coverage recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageTrigger {
    TopUp,
    Allocate,
    Redeem,
}

/// Recompute coverage for `plan` (already holding its new pot balance).
pub fn recompute(formula: CoverageFormula, trigger: CoverageTrigger, plan: &Plan) -> u8 {
    let ratio = match (formula, trigger) {
        (CoverageFormula::PotRatio, _) => ratio(plan.pot_balance, plan.base_amount_usd, 100),
        (CoverageFormula::Legacy, CoverageTrigger::TopUp) => {
            ratio(plan.addon_usd, plan.base_amount_usd, 8)
        }
        (CoverageFormula::Legacy, CoverageTrigger::Allocate | CoverageTrigger::Redeem) => {
            ratio(plan.pot_balance, plan.base_amount_usd, 12)
        }
    };
    to_percent(ratio, 100)
}

/// Expected monthly yield on the pot: `pot * apr / 100 / 12`.
pub fn monthly_yield(plan: &Plan) -> Decimal {
    plan.pot_balance.saturating_mul(plan.apr) / Decimal::ONE_HUNDRED / Decimal::from(12)
}

/// Coverage after the next add-on and one month of yield, capped at 100.
pub fn projected_next_coverage(plan: &Plan) -> Decimal {
    if plan.base_amount_usd.is_zero() {
        return Decimal::ZERO;
    }
    let next_pot = plan
        .pot_balance
        .saturating_add(plan.addon_usd)
        .saturating_add(monthly_yield(plan));
    ratio(next_pot, plan.base_amount_usd, 100)
        .min(Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO)
}

/// Pay-intent estimate: one year of yield on the add-on as a share of the bill.
pub fn pay_intent_estimate(addon: Decimal, apr: Decimal, base: Decimal) -> u8 {
    if base.is_zero() {
        return 0;
    }
    let annual_yield = addon
        .saturating_mul(apr)
        .saturating_mul(Decimal::from(12))
        / Decimal::ONE_HUNDRED;
    to_percent(ratio(annual_yield, base, 100), PAY_INTENT_COVERAGE_CAP)
}

/// Round half away from zero, the way the screens display whole percents.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / base * scale`; 0 for a zero base, saturating on overflow.
fn ratio(numerator: Decimal, base: Decimal, scale: u32) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(base)
        .and_then(|quotient| quotient.checked_mul(Decimal::from(scale)))
        .unwrap_or_else(|| {
            if numerator.is_sign_negative() != base.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        })
}

fn to_percent(value: Decimal, cap: u8) -> u8 {
    let rounded = round_half_up(value)
        .max(Decimal::ZERO)
        .min(Decimal::from(cap));
    rounded.to_u8().unwrap_or(0)
}
