//! Dashboard aggregates and due-date arithmetic.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::types::{Frequency, Plan, PlanStatus};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Totals shown at the top of the dashboard. Only active plans count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub active_plans: usize,
    pub total_pot_balance: Decimal,
    pub total_monthly_addons: Decimal,
    /// Mean `coverage_pct` over active plans, 0 when there are none.
    pub average_coverage_pct: Decimal,
    /// Ids of plans still in `setup`.
    pub setup_plan_ids: Vec<String>,
}

pub fn dashboard_summary(plans: &[Plan]) -> DashboardSummary {
    let active: Vec<&Plan> = plans
        .iter()
        .filter(|plan| plan.status == PlanStatus::Active)
        .collect();

    let total_pot_balance = saturating_total(active.iter().map(|plan| plan.pot_balance));
    let total_monthly_addons = saturating_total(active.iter().map(|plan| plan.addon_usd));
    let average_coverage_pct = if active.is_empty() {
        Decimal::ZERO
    } else {
        let total: Decimal = active
            .iter()
            .map(|plan| Decimal::from(plan.coverage_pct))
            .sum();
        total / Decimal::from(active.len())
    };

    DashboardSummary {
        active_plans: active.len(),
        total_pot_balance,
        total_monthly_addons,
        average_coverage_pct,
        setup_plan_ids: plans
            .iter()
            .filter(|plan| plan.status == PlanStatus::Setup)
            .map(|plan| plan.id.clone())
            .collect(),
    }
}

fn saturating_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Whole days until `due_date` (midnight UTC), rounded up. Negative when overdue.
pub fn days_until_due(due_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due = due_date.and_time(chrono::NaiveTime::MIN).and_utc();
    let ms = (due - now).num_milliseconds();
    -((-ms).div_euclid(DAY_MS))
}

/// Next due date after one billing period.
pub fn next_due_date(due_date: NaiveDate, frequency: Frequency) -> NaiveDate {
    let months = match frequency {
        Frequency::Monthly => Months::new(1),
        Frequency::Yearly => Months::new(12),
    };
    due_date.checked_add_months(months).unwrap_or(due_date)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::state::{SPOTIFY_PLAN_ID, seed_state};

    #[test]
    fn summary_counts_only_active_plans() {
        let summary = dashboard_summary(&seed_state().plans);
        assert_eq!(summary.active_plans, 1);
        assert_eq!(summary.total_pot_balance, dec!(2.18));
        assert_eq!(summary.total_monthly_addons, dec!(2));
        assert_eq!(summary.average_coverage_pct, dec!(9));
        assert_eq!(summary.setup_plan_ids, vec![SPOTIFY_PLAN_ID.to_string()]);
    }

    #[test]
    fn summary_totals_saturate() {
        let mut plans = seed_state().plans;
        plans[0].pot_balance = Decimal::MAX;
        plans[1].status = PlanStatus::Active;
        plans[1].pot_balance = Decimal::MAX;
        let summary = dashboard_summary(&plans);
        assert_eq!(summary.total_pot_balance, Decimal::MAX);
    }

    #[test]
    fn summary_of_no_plans_is_zero() {
        let summary = dashboard_summary(&[]);
        assert_eq!(summary.active_plans, 0);
        assert_eq!(summary.average_coverage_pct, Decimal::ZERO);
        assert!(summary.setup_plan_ids.is_empty());
    }

    #[test]
    fn days_until_due_rounds_up_partial_days() {
        let due = NaiveDate::from_ymd_opt(2024, 8, 28).expect("date");
        let now = Utc
            .with_ymd_and_hms(2024, 8, 26, 12, 0, 0)
            .single()
            .expect("now");
        assert_eq!(days_until_due(due, now), 2);
    }

    #[test]
    fn days_until_due_is_negative_when_overdue() {
        let due = NaiveDate::from_ymd_opt(2024, 8, 28).expect("date");
        let now = Utc
            .with_ymd_and_hms(2024, 8, 30, 12, 0, 0)
            .single()
            .expect("now");
        assert_eq!(days_until_due(due, now), -2);
    }

    #[test]
    fn next_due_date_follows_frequency() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 31).expect("date");
        assert_eq!(
            next_due_date(due, Frequency::Monthly),
            NaiveDate::from_ymd_opt(2024, 2, 29).expect("date")
        );
        assert_eq!(
            next_due_date(due, Frequency::Yearly),
            NaiveDate::from_ymd_opt(2025, 1, 31).expect("date")
        );
    }
}
