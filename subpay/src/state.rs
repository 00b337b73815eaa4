use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::types::{
    EntryKind, Frequency, NetworkEnv, Plan, PlanStatus, RiskLevel, Strategy, TimelineEntry, User,
};

pub const NETFLIX_PLAN_ID: &str = "pln_netflix_001";
pub const SPOTIFY_PLAN_ID: &str = "pln_spotify_001";
pub const DEFAULT_STRATEGY_ID: &str = "strategy_uniswap_stable";
pub const TESTNET_EXPLORER: &str = "https://testnet.flowscan.io";

/// Session-scoped demo data: app flags plus the three collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoState {
    pub demo_mode: bool,
    pub network_env: NetworkEnv,
    pub wallet_connected: bool,
    pub paypal_connected: bool,
    pub user: Option<User>,
    pub plans: Vec<Plan>,
    pub strategies: Vec<Strategy>,
    /// Newest first, by insertion.
    pub timeline: Vec<TimelineEntry>,
}

impl DemoState {
    /// State with flags at their defaults and no data.
    pub fn empty() -> Self {
        Self {
            demo_mode: true,
            network_env: NetworkEnv::Testnet,
            wallet_connected: false,
            paypal_connected: false,
            user: None,
            plans: Vec::new(),
            strategies: Vec::new(),
            timeline: Vec::new(),
        }
    }
}

impl Default for DemoState {
    fn default() -> Self {
        seed_state()
    }
}

/// Built-in seed: a running Netflix plan, a Spotify plan awaiting setup, one
/// stable LP strategy, and three historical timeline entries.
pub fn seed_state() -> DemoState {
    DemoState {
        plans: vec![
            Plan {
                id: NETFLIX_PLAN_ID.to_string(),
                merchant: "Netflix".to_string(),
                base_amount_usd: Decimal::from(19),
                frequency: Frequency::Monthly,
                due_date: date(2024, 8, 28),
                recipient: "netflix@example.com".to_string(),
                addon_usd: Decimal::from(2),
                status: PlanStatus::Active,
                coverage_pct: 9,
                pot_balance: Decimal::new(218, 2),
                apr: Decimal::new(48, 1),
            },
            Plan {
                id: SPOTIFY_PLAN_ID.to_string(),
                merchant: "Spotify".to_string(),
                base_amount_usd: Decimal::from(12),
                frequency: Frequency::Monthly,
                due_date: date(2024, 9, 5),
                recipient: "spotify@example.com".to_string(),
                addon_usd: Decimal::ZERO,
                status: PlanStatus::Setup,
                coverage_pct: 0,
                pot_balance: Decimal::ZERO,
                apr: Decimal::ZERO,
            },
        ],
        strategies: vec![Strategy {
            id: DEFAULT_STRATEGY_ID.to_string(),
            name: "Uniswap Stable LP".to_string(),
            apr: Decimal::new(48, 1),
            risk_level: RiskLevel::Low,
            chain: "Flow EVM".to_string(),
            venue: "Uniswap Stable LP".to_string(),
        }],
        timeline: vec![
            TimelineEntry {
                kind: EntryKind::Pay,
                timestamp: at(2024, 8, 15, 14, 5),
                amount: Some(Decimal::from(19)),
                tx_hash: Some("0xmock_payment_001".to_string()),
                explorer_url: Some(format!("{}/tx/0xmock_payment_001", TESTNET_EXPLORER)),
                description: "Paid Netflix $19".to_string(),
                plan_id: Some(NETFLIX_PLAN_ID.to_string()),
            },
            TimelineEntry {
                kind: EntryKind::TopUp,
                timestamp: at(2024, 8, 15, 14, 3),
                amount: Some(Decimal::from(2)),
                tx_hash: Some("0xmock_topup_001".to_string()),
                explorer_url: Some(format!("{}/tx/0xmock_topup_001", TESTNET_EXPLORER)),
                description: "Added $2 to SubPay pot".to_string(),
                plan_id: Some(NETFLIX_PLAN_ID.to_string()),
            },
            TimelineEntry {
                kind: EntryKind::Allocate,
                timestamp: at(2024, 8, 15, 14, 4),
                amount: Some(Decimal::from(2)),
                tx_hash: None,
                explorer_url: None,
                description: "Allocated to Uniswap Stable LP".to_string(),
                plan_id: Some(NETFLIX_PLAN_ID.to_string()),
            },
        ],
        ..DemoState::empty()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
