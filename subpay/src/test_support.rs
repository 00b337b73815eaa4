//! Test-only helpers: deterministic plans, entries and a fixed clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::core::types::{EntryKind, Frequency, Plan, PlanStatus, TimelineEntry};
use crate::flows::FlowContext;
use crate::io::config::DemoConfig;

/// 2024-09-01T00:00:00Z in unix milliseconds.
pub const FIXED_NOW_MILLIS: i64 = 1_725_148_800_000;

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(
            Utc.timestamp_millis_opt(FIXED_NOW_MILLIS)
                .single()
                .expect("fixed timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Flow context with default config and [`FixedClock`].
pub fn fixed_context() -> FlowContext {
    FlowContext::new(DemoConfig::default(), Arc::new(FixedClock::default()))
}

/// Create a deterministic active plan with a $10 monthly bill and empty pot.
pub fn plan(id: &str, merchant: &str) -> Plan {
    Plan {
        id: id.to_string(),
        merchant: merchant.to_string(),
        base_amount_usd: Decimal::from(10),
        frequency: Frequency::Monthly,
        due_date: NaiveDate::from_ymd_opt(2024, 10, 1).expect("date"),
        recipient: format!("{}@example.com", merchant.to_lowercase()),
        addon_usd: Decimal::ONE,
        status: PlanStatus::Active,
        coverage_pct: 0,
        pot_balance: Decimal::ZERO,
        apr: Decimal::ZERO,
    }
}

/// Create an unlinked rule-change entry at the fixed instant.
pub fn entry(description: &str) -> TimelineEntry {
    TimelineEntry {
        kind: EntryKind::RuleChange,
        timestamp: FixedClock::default().0,
        amount: None,
        tx_hash: None,
        explorer_url: None,
        description: description.to_string(),
        plan_id: None,
    }
}
