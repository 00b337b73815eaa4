//! Shared deterministic types for the demo domain.
//!
//! These types define the stable contract between the store, the flows, and
//! the HTTP layer. They carry no behavior beyond labels and parsing.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The connected demo user. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub wallet_address: String,
}

/// Billing cadence of the underlying subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Parse a frequency label, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Frequency::Monthly),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// Lifecycle state of a plan. Transitions are checked by [`crate::core::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Paused,
    Setup,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::Active => "active",
            PlanStatus::Paused => "paused",
            PlanStatus::Setup => "setup",
        };
        f.write_str(label)
    }
}

/// One recurring subscription plus its savings pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub merchant: String,
    pub base_amount_usd: Decimal,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
    pub recipient: String,
    pub addon_usd: Decimal,
    pub status: PlanStatus,
    /// Share of the next bill the pot could offset, 0..=100. Display value only.
    pub coverage_pct: u8,
    pub pot_balance: Decimal,
    pub apr: Decimal,
}

/// Shallow patch for [`Plan`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanPatch {
    pub merchant: Option<String>,
    pub base_amount_usd: Option<Decimal>,
    pub frequency: Option<Frequency>,
    pub due_date: Option<NaiveDate>,
    pub recipient: Option<String>,
    pub addon_usd: Option<Decimal>,
    pub status: Option<PlanStatus>,
    pub coverage_pct: Option<u8>,
    pub pot_balance: Option<Decimal>,
    pub apr: Option<Decimal>,
}

impl PlanPatch {
    /// Merge every `Some` field into `plan`.
    pub fn apply_to(&self, plan: &mut Plan) {
        if let Some(merchant) = &self.merchant {
            plan.merchant = merchant.clone();
        }
        if let Some(base) = self.base_amount_usd {
            plan.base_amount_usd = base;
        }
        if let Some(frequency) = self.frequency {
            plan.frequency = frequency;
        }
        if let Some(due_date) = self.due_date {
            plan.due_date = due_date;
        }
        if let Some(recipient) = &self.recipient {
            plan.recipient = recipient.clone();
        }
        if let Some(addon) = self.addon_usd {
            plan.addon_usd = addon;
        }
        if let Some(status) = self.status {
            plan.status = status;
        }
        if let Some(coverage) = self.coverage_pct {
            plan.coverage_pct = coverage;
        }
        if let Some(pot) = self.pot_balance {
            plan.pot_balance = pot;
        }
        if let Some(apr) = self.apr {
            plan.apr = apr;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Static yield venue descriptor (seed data, read-only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub apr: Decimal,
    pub risk_level: RiskLevel,
    pub chain: String,
    pub venue: String,
}

/// Kind of simulated action recorded on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    TopUp,
    Allocate,
    Redeem,
    Pay,
    RuleChange,
}

impl EntryKind {
    /// Short slug used inside mock transaction hashes.
    pub fn slug(self) -> &'static str {
        match self {
            EntryKind::TopUp => "topup",
            EntryKind::Allocate => "allocate",
            EntryKind::Redeem => "redeem",
            EntryKind::Pay => "payment",
            EntryKind::RuleChange => "rule",
        }
    }
}

/// Append-only audit record of a simulated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub kind: EntryKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub description: String,
    /// Plan this entry belongs to, assigned by the action that created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

/// Which chain environment mock explorer links point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEnv {
    #[default]
    Testnet,
    Mainnet,
}
