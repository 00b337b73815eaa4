//! Screen workflows over the store.
//!
//! Each flow reads the plan it acts on, computes the new plan fields through
//! `core`, writes them with a single `update_plan`, and records what happened
//! on the timeline with a fabricated transaction hash. Flows never wait; the
//! simulated delays live with the caller (see `subpay-ui`).

use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::core::checkout::{CheckoutQuery, DEFAULT_ADDON};
use crate::core::coverage::{CoverageTrigger, recompute};
use crate::core::reducer::Outcome;
use crate::core::summary::next_due_date;
use crate::core::types::{
    EntryKind, Frequency, Plan, PlanPatch, PlanStatus, Strategy, TimelineEntry, User,
};
use crate::io::config::DemoConfig;
use crate::state::DEFAULT_STRATEGY_ID;
use crate::store::Store;

pub const DEMO_EMAIL: &str = "demo@subpay.ai";
pub const DEMO_WALLET: &str = "0x742d35cc6ccAaFa5aC8EB2f8C3b4e6d70C8f83";
const DEFAULT_DUE_DATE: (i32, u32, u32) = (2024, 8, 28);

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex"));

/// Why a flow could not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    PlanNotFound(String),
    StrategyNotFound(String),
    /// Required seed data (plans or strategies) is absent.
    MissingSeedData(&'static str),
    /// The status state machine rejected the change.
    Transition(String),
    /// Topping up would take the pot past `Decimal::MAX`.
    PotOverflow(String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::PlanNotFound(id) => write!(f, "plan '{}' not found", id),
            FlowError::StrategyNotFound(id) => write!(f, "strategy '{}' not found", id),
            FlowError::MissingSeedData(what) => {
                write!(f, "configuration error: missing {} data", what)
            }
            FlowError::Transition(message) => f.write_str(message),
            FlowError::PotOverflow(id) => {
                write!(f, "pot balance for plan '{}' is out of range", id)
            }
        }
    }
}

impl std::error::Error for FlowError {}

/// Shared inputs for every flow.
#[derive(Clone)]
pub struct FlowContext {
    pub config: DemoConfig,
    clock: Arc<dyn Clock>,
}

impl FlowContext {
    pub fn new(config: DemoConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Context backed by the system clock.
    pub fn system(config: DemoConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Build a timeline entry stamped now, optionally with a mock transaction.
    fn entry(
        &self,
        store: &Store,
        kind: EntryKind,
        plan_id: &str,
        amount: Option<Decimal>,
        description: String,
        with_tx: bool,
    ) -> TimelineEntry {
        let timestamp = self.clock.now();
        let (tx_hash, explorer_url) = if with_tx {
            let hash = mock_tx_hash(kind, plan_id, timestamp.timestamp_millis());
            let url = self
                .config
                .explorer
                .tx_url(store.state().network_env, &hash);
            (Some(hash), Some(url))
        } else {
            (None, None)
        };
        TimelineEntry {
            kind,
            timestamp,
            amount,
            tx_hash,
            explorer_url,
            description,
            plan_id: Some(plan_id.to_string()),
        }
    }
}

/// Plan-creation form, prefilled the way the create-plan screen does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePlanRequest {
    pub merchant: String,
    pub base_amount_usd: Decimal,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
    pub addon_usd: Decimal,
    pub strategy_id: String,
}

impl Default for CreatePlanRequest {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_DUE_DATE;
        Self {
            merchant: "Netflix".to_string(),
            base_amount_usd: Decimal::from(19),
            frequency: Frequency::Monthly,
            due_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            addon_usd: Decimal::from(DEFAULT_ADDON),
            strategy_id: DEFAULT_STRATEGY_ID.to_string(),
        }
    }
}

impl CreatePlanRequest {
    /// Prefill from the checkout query string.
    pub fn from_checkout(query: &CheckoutQuery) -> Self {
        let intent = query.resolve();
        Self {
            merchant: intent.merchant,
            base_amount_usd: intent.base_amount_usd,
            frequency: intent.frequency,
            ..Self::default()
        }
    }
}

/// Simulated PayPal OAuth: flags PayPal as connected and sets an email-only user.
pub fn connect_paypal(store: &mut Store) -> User {
    let user = User {
        email: DEMO_EMAIL.to_string(),
        wallet_address: String::new(),
    };
    store.set_paypal_connected(true);
    store.set_user(user.clone());
    info!("paypal connected");
    user
}

/// Simulated wallet connect: flags the wallet and sets a user with an address.
pub fn connect_wallet(store: &mut Store) -> User {
    let user = User {
        email: DEMO_EMAIL.to_string(),
        wallet_address: DEMO_WALLET.to_string(),
    };
    store.set_wallet_connected(true);
    store.set_user(user.clone());
    info!(wallet = %user.wallet_address, "wallet connected");
    user
}

/// Create an active plan from `request` and append it to the store.
///
/// Negative amounts fall back to the form defaults. An unknown strategy
/// leaves the plan at 0% APR.
pub fn create_plan(store: &mut Store, ctx: &FlowContext, request: &CreatePlanRequest) -> Plan {
    let defaults = CreatePlanRequest::default();
    let merchant = match request.merchant.trim() {
        "" => defaults.merchant.clone(),
        name => name.to_string(),
    };
    let slug = merchant_slug(&merchant);
    let apr = store
        .strategy(&request.strategy_id)
        .map(|strategy| strategy.apr)
        .unwrap_or(Decimal::ZERO);

    let plan = Plan {
        id: unique_plan_id(store, &slug, ctx.clock.now().timestamp_millis()),
        merchant,
        base_amount_usd: non_negative_or(request.base_amount_usd, defaults.base_amount_usd),
        frequency: request.frequency,
        due_date: request.due_date,
        recipient: format!("{}@example.com", slug),
        addon_usd: non_negative_or(request.addon_usd, defaults.addon_usd),
        status: PlanStatus::Active,
        coverage_pct: 0,
        pot_balance: Decimal::ZERO,
        apr,
    };

    store.add_plan(plan.clone());
    info!(plan_id = %plan.id, merchant = %plan.merchant, "plan created");
    plan
}

/// Move the plan's add-on into its pot.
pub fn top_up(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
) -> Result<TimelineEntry, FlowError> {
    let mut plan = find_plan(store, plan_id)?;
    plan.pot_balance = plan
        .pot_balance
        .checked_add(plan.addon_usd)
        .ok_or_else(|| FlowError::PotOverflow(plan_id.to_string()))?;
    let coverage = recompute(ctx.config.coverage.formula, CoverageTrigger::TopUp, &plan);

    apply(
        store,
        plan_id,
        PlanPatch {
            pot_balance: Some(plan.pot_balance),
            coverage_pct: Some(coverage),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::TopUp,
        plan_id,
        Some(plan.addon_usd),
        format!("Added {} to SubPay pot", usd(plan.addon_usd)),
        true,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, pot = %plan.pot_balance, coverage, "top-up applied");
    Ok(entry)
}

/// Allocate the pot to `strategy_id`, or the first seeded strategy.
pub fn allocate(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
    strategy_id: Option<&str>,
) -> Result<TimelineEntry, FlowError> {
    if store.plans().is_empty() {
        return Err(FlowError::MissingSeedData("plan"));
    }
    let strategy = pick_strategy(store, strategy_id)?;
    let mut plan = find_plan(store, plan_id)?;
    plan.apr = strategy.apr;
    let coverage = recompute(ctx.config.coverage.formula, CoverageTrigger::Allocate, &plan);

    apply(
        store,
        plan_id,
        PlanPatch {
            apr: Some(strategy.apr),
            coverage_pct: Some(coverage),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::Allocate,
        plan_id,
        Some(plan.pot_balance),
        format!("Allocated {} to {}", usd(plan.pot_balance), strategy.name),
        false,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, strategy = %strategy.id, coverage, "pot allocated");
    Ok(entry)
}

/// Pay the merchant bill and roll the due date forward one period.
pub fn pay(store: &mut Store, ctx: &FlowContext, plan_id: &str) -> Result<TimelineEntry, FlowError> {
    let plan = find_plan(store, plan_id)?;
    let due_date = next_due_date(plan.due_date, plan.frequency);

    apply(
        store,
        plan_id,
        PlanPatch {
            due_date: Some(due_date),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::Pay,
        plan_id,
        Some(plan.base_amount_usd),
        format!("Paid {} {}", plan.merchant, usd(plan.base_amount_usd)),
        true,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, next_due = %due_date, "bill paid");
    Ok(entry)
}

/// Withdraw up to `amount` from the pot. Never takes the pot below zero.
pub fn redeem(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
    amount: Decimal,
) -> Result<TimelineEntry, FlowError> {
    let mut plan = find_plan(store, plan_id)?;
    let redeemed = amount
        .max(Decimal::ZERO)
        .min(plan.pot_balance.max(Decimal::ZERO));
    plan.pot_balance -= redeemed;
    let coverage = recompute(ctx.config.coverage.formula, CoverageTrigger::Redeem, &plan);

    apply(
        store,
        plan_id,
        PlanPatch {
            pot_balance: Some(plan.pot_balance),
            coverage_pct: Some(coverage),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::Redeem,
        plan_id,
        Some(redeemed),
        format!("Redeemed {} from SubPay pot", usd(redeemed)),
        true,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, redeemed = %redeemed, "pot redeemed");
    Ok(entry)
}

/// Change the recurring add-on. Negative input is treated as 0.
pub fn change_addon(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
    amount: Decimal,
) -> Result<TimelineEntry, FlowError> {
    let plan = find_plan(store, plan_id)?;
    let addon = amount.max(Decimal::ZERO);

    apply(
        store,
        plan_id,
        PlanPatch {
            addon_usd: Some(addon),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::RuleChange,
        plan_id,
        Some(addon),
        format!(
            "Changed {} add-on to {}/{}",
            plan.merchant,
            usd(addon),
            plan.frequency.label()
        ),
        false,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, addon = %addon, "add-on changed");
    Ok(entry)
}

/// Finish setup for a plan (`setup -> active`).
pub fn activate(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
) -> Result<TimelineEntry, FlowError> {
    set_status(store, ctx, plan_id, PlanStatus::Active, "Activated")
}

/// Pause a running plan (`active -> paused`).
pub fn pause(store: &mut Store, ctx: &FlowContext, plan_id: &str) -> Result<TimelineEntry, FlowError> {
    set_status(store, ctx, plan_id, PlanStatus::Paused, "Paused")
}

/// Id of the plan the onboarding screens act on.
pub fn current_plan_id(store: &Store) -> Result<String, FlowError> {
    store
        .current_plan()
        .map(|plan| plan.id.clone())
        .ok_or(FlowError::MissingSeedData("plan"))
}

/// Lowercase merchant name with non-alphanumeric runs collapsed to `-`.
pub fn merchant_slug(merchant: &str) -> String {
    let lowered = merchant.to_lowercase();
    let slug = SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "plan".to_string()
    } else {
        slug.to_string()
    }
}

/// `0xmock_<kind>_` plus 16 hex chars of SHA-256 over the action identity.
pub fn mock_tx_hash(kind: EntryKind, plan_id: &str, millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.slug().as_bytes());
    hasher.update(b":");
    hasher.update(plan_id.as_bytes());
    hasher.update(b":");
    hasher.update(millis.to_be_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("0xmock_{}_{}", kind.slug(), &digest[..16])
}

fn set_status(
    store: &mut Store,
    ctx: &FlowContext,
    plan_id: &str,
    status: PlanStatus,
    verb: &str,
) -> Result<TimelineEntry, FlowError> {
    let plan = find_plan(store, plan_id)?;
    apply(
        store,
        plan_id,
        PlanPatch {
            status: Some(status),
            ..PlanPatch::default()
        },
    )?;

    let entry = ctx.entry(
        store,
        EntryKind::RuleChange,
        plan_id,
        None,
        format!("{} {} plan", verb, plan.merchant),
        false,
    );
    store.add_timeline_entry(entry.clone());
    info!(plan_id, %status, "plan status changed");
    Ok(entry)
}

fn find_plan(store: &Store, plan_id: &str) -> Result<Plan, FlowError> {
    store
        .get_plan(plan_id)
        .cloned()
        .ok_or_else(|| FlowError::PlanNotFound(plan_id.to_string()))
}

fn pick_strategy(store: &Store, strategy_id: Option<&str>) -> Result<Strategy, FlowError> {
    match strategy_id {
        Some(id) => store
            .strategy(id)
            .cloned()
            .ok_or_else(|| FlowError::StrategyNotFound(id.to_string())),
        None => store
            .strategies()
            .first()
            .cloned()
            .ok_or(FlowError::MissingSeedData("strategy")),
    }
}

fn apply(store: &mut Store, plan_id: &str, patch: PlanPatch) -> Result<(), FlowError> {
    match store.update_plan(plan_id, patch) {
        Outcome::Applied => Ok(()),
        Outcome::PlanNotFound => Err(FlowError::PlanNotFound(plan_id.to_string())),
        Outcome::TransitionRejected { message, .. } => Err(FlowError::Transition(message)),
    }
}

fn unique_plan_id(store: &Store, slug: &str, millis: i64) -> String {
    let mut suffix = millis;
    loop {
        let id = format!("pln_{}_{}", slug, suffix);
        if !store.contains_plan(&id) {
            return id;
        }
        suffix += 1;
    }
}

fn non_negative_or(value: Decimal, default: Decimal) -> Decimal {
    if value.is_sign_negative() && !value.is_zero() {
        default
    } else {
        value
    }
}

fn usd(amount: Decimal) -> String {
    format!("${}", amount.normalize())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::core::coverage::CoverageFormula;
    use crate::core::types::NetworkEnv;
    use crate::state::{DemoState, NETFLIX_PLAN_ID, SPOTIFY_PLAN_ID};
    use crate::test_support::{FIXED_NOW_MILLIS, fixed_context};

    #[test]
    fn connect_sets_flags_and_replaces_user() {
        let mut store = Store::seeded();
        connect_paypal(&mut store);
        assert!(store.state().paypal_connected);
        assert_eq!(
            store.state().user.as_ref().map(|u| u.wallet_address.as_str()),
            Some("")
        );

        connect_wallet(&mut store);
        assert!(store.state().wallet_connected);
        assert_eq!(
            store.state().user.as_ref().map(|u| u.wallet_address.as_str()),
            Some(DEMO_WALLET)
        );
    }

    #[test]
    fn create_plan_appends_active_plan_with_strategy_apr() {
        let mut store = Store::seeded();
        let ctx = fixed_context();
        let request = CreatePlanRequest {
            merchant: "Disney Plus".to_string(),
            ..CreatePlanRequest::default()
        };

        let plan = create_plan(&mut store, &ctx, &request);

        assert_eq!(plan.id, format!("pln_disney-plus_{}", FIXED_NOW_MILLIS));
        assert_eq!(plan.recipient, "disney-plus@example.com");
        assert_eq!(plan.status, PlanStatus::Active);
        assert_eq!(plan.apr, dec!(4.8));
        assert_eq!(plan.pot_balance, Decimal::ZERO);
        assert_eq!(store.plans().len(), 3);
        assert_eq!(store.plans()[2], plan);
    }

    /// Two plans created in the same millisecond still get distinct ids.
    #[test]
    fn create_plan_bumps_colliding_ids() {
        let mut store = Store::seeded();
        let ctx = fixed_context();
        let first = create_plan(&mut store, &ctx, &CreatePlanRequest::default());
        let second = create_plan(&mut store, &ctx, &CreatePlanRequest::default());
        assert_ne!(first.id, second.id);
        assert_eq!(second.id, format!("pln_netflix_{}", FIXED_NOW_MILLIS + 1));
    }

    #[test]
    fn create_plan_falls_back_on_bad_input() {
        let mut store = Store::seeded();
        let request = CreatePlanRequest {
            merchant: "  ".to_string(),
            base_amount_usd: dec!(-3),
            strategy_id: "unknown".to_string(),
            ..CreatePlanRequest::default()
        };
        let plan = create_plan(&mut store, &fixed_context(), &request);
        assert_eq!(plan.merchant, "Netflix");
        assert_eq!(plan.base_amount_usd, dec!(19));
        assert_eq!(plan.apr, Decimal::ZERO);
    }

    #[test]
    fn top_up_moves_addon_into_pot_and_logs_entry() {
        let mut store = Store::seeded();
        let ctx = fixed_context();

        let entry = top_up(&mut store, &ctx, NETFLIX_PLAN_ID).expect("top up");

        let plan = store.get_plan(NETFLIX_PLAN_ID).expect("plan");
        assert_eq!(plan.pot_balance, dec!(4.18));
        assert_eq!(plan.coverage_pct, 22);
        assert_eq!(store.timeline()[0], entry);
        assert_eq!(entry.kind, EntryKind::TopUp);
        assert_eq!(entry.amount, Some(dec!(2)));
        assert_eq!(entry.description, "Added $2 to SubPay pot");
        assert_eq!(entry.plan_id.as_deref(), Some(NETFLIX_PLAN_ID));
        let hash = entry.tx_hash.as_deref().expect("hash");
        assert!(hash.starts_with("0xmock_topup_"));
        assert_eq!(
            entry.explorer_url,
            Some(format!("https://testnet.flowscan.io/tx/{}", hash))
        );
    }

    #[test]
    fn top_up_with_legacy_formula() {
        let mut store = Store::seeded();
        let mut ctx = fixed_context();
        ctx.config.coverage.formula = CoverageFormula::Legacy;
        top_up(&mut store, &ctx, NETFLIX_PLAN_ID).expect("top up");
        assert_eq!(
            store.get_plan(NETFLIX_PLAN_ID).map(|p| p.coverage_pct),
            Some(1)
        );
    }

    #[test]
    fn explorer_url_follows_network_env() {
        let mut store = Store::seeded();
        store.set_network_env(NetworkEnv::Mainnet);
        let entry = pay(&mut store, &fixed_context(), NETFLIX_PLAN_ID).expect("pay");
        assert!(
            entry
                .explorer_url
                .as_deref()
                .is_some_and(|url| url.starts_with("https://flowscan.io/tx/0xmock_payment_"))
        );
    }

    #[test]
    fn top_up_past_decimal_max_is_rejected() {
        let mut store = Store::seeded();
        let ctx = fixed_context();
        change_addon(&mut store, &ctx, NETFLIX_PLAN_ID, Decimal::MAX).expect("addon");
        let before = store.clone();

        let err = top_up(&mut store, &ctx, NETFLIX_PLAN_ID).expect_err("overflow");

        assert_eq!(err, FlowError::PotOverflow(NETFLIX_PLAN_ID.to_string()));
        assert_eq!(store, before);
    }

    #[test]
    fn top_up_with_tiny_base_saturates_coverage() {
        let mut store = Store::seeded();
        store.update_plan(
            NETFLIX_PLAN_ID,
            PlanPatch {
                base_amount_usd: Some(Decimal::new(1, 28)),
                ..PlanPatch::default()
            },
        );

        top_up(&mut store, &fixed_context(), NETFLIX_PLAN_ID).expect("top up");

        let plan = store.get_plan(NETFLIX_PLAN_ID).expect("plan");
        assert_eq!(plan.coverage_pct, 100);
    }

    #[test]
    fn redeem_from_negative_pot_withdraws_nothing() {
        let mut store = Store::seeded();
        store.update_plan(
            NETFLIX_PLAN_ID,
            PlanPatch {
                pot_balance: Some(dec!(-5)),
                ..PlanPatch::default()
            },
        );
        let entry =
            redeem(&mut store, &fixed_context(), NETFLIX_PLAN_ID, dec!(3)).expect("redeem");
        assert_eq!(entry.amount, Some(Decimal::ZERO));
    }

    #[test]
    fn top_up_unknown_plan_is_not_found() {
        let mut store = Store::seeded();
        let before = store.clone();
        let err = top_up(&mut store, &fixed_context(), "nope").expect_err("missing");
        assert_eq!(err, FlowError::PlanNotFound("nope".to_string()));
        assert_eq!(store, before);
    }

    #[test]
    fn allocate_sets_strategy_apr() {
        let mut store = Store::seeded();
        let ctx = fixed_context();
        store.update_plan(
            NETFLIX_PLAN_ID,
            PlanPatch {
                apr: Some(Decimal::ZERO),
                ..PlanPatch::default()
            },
        );

        let entry = allocate(&mut store, &ctx, NETFLIX_PLAN_ID, None).expect("allocate");

        let plan = store.get_plan(NETFLIX_PLAN_ID).expect("plan");
        assert_eq!(plan.apr, dec!(4.8));
        // 2.18 / 19 = 11.47% -> 11
        assert_eq!(plan.coverage_pct, 11);
        assert_eq!(entry.description, "Allocated $2.18 to Uniswap Stable LP");
        assert_eq!(entry.amount, Some(dec!(2.18)));
        assert!(entry.tx_hash.is_none());
        assert!(entry.explorer_url.is_none());
    }

    #[test]
    fn allocate_without_strategies_is_configuration_error() {
        let mut state = crate::state::seed_state();
        state.strategies.clear();
        let mut store = Store::new(state);
        let err = allocate(&mut store, &fixed_context(), NETFLIX_PLAN_ID, None).expect_err("err");
        assert_eq!(err, FlowError::MissingSeedData("strategy"));
        assert_eq!(
            err.to_string(),
            "configuration error: missing strategy data"
        );
    }

    #[test]
    fn allocate_unknown_strategy_is_reported() {
        let mut store = Store::seeded();
        let err = allocate(&mut store, &fixed_context(), NETFLIX_PLAN_ID, Some("nope"))
            .expect_err("err");
        assert_eq!(err, FlowError::StrategyNotFound("nope".to_string()));
    }

    #[test]
    fn pay_rolls_due_date_forward() {
        let mut store = Store::seeded();
        let entry = pay(&mut store, &fixed_context(), NETFLIX_PLAN_ID).expect("pay");
        assert_eq!(entry.description, "Paid Netflix $19");
        assert_eq!(
            store.get_plan(NETFLIX_PLAN_ID).map(|p| p.due_date),
            NaiveDate::from_ymd_opt(2024, 9, 28)
        );
    }

    #[test]
    fn redeem_never_overdraws() {
        let mut store = Store::seeded();
        let entry =
            redeem(&mut store, &fixed_context(), NETFLIX_PLAN_ID, dec!(10)).expect("redeem");
        assert_eq!(entry.amount, Some(dec!(2.18)));
        let plan = store.get_plan(NETFLIX_PLAN_ID).expect("plan");
        assert_eq!(plan.pot_balance, Decimal::ZERO);
        assert_eq!(plan.coverage_pct, 0);
    }

    #[test]
    fn change_addon_records_rule_change() {
        let mut store = Store::seeded();
        let entry =
            change_addon(&mut store, &fixed_context(), NETFLIX_PLAN_ID, dec!(5)).expect("addon");
        assert_eq!(entry.kind, EntryKind::RuleChange);
        assert_eq!(entry.description, "Changed Netflix add-on to $5/monthly");
        assert!(entry.tx_hash.is_none());
        assert_eq!(
            store.get_plan(NETFLIX_PLAN_ID).map(|p| p.addon_usd),
            Some(dec!(5))
        );
    }

    #[test]
    fn pause_then_pause_again_is_rejected() {
        let mut store = Store::seeded();
        let ctx = fixed_context();
        pause(&mut store, &ctx, NETFLIX_PLAN_ID).expect("pause");
        let timeline_len = store.timeline().len();

        let err = pause(&mut store, &ctx, NETFLIX_PLAN_ID).expect_err("paused twice");
        assert_eq!(
            err,
            FlowError::Transition("invalid status transition: paused -> paused".to_string())
        );
        assert_eq!(store.timeline().len(), timeline_len);
    }

    #[test]
    fn activate_completes_setup() {
        let mut store = Store::seeded();
        let entry = activate(&mut store, &fixed_context(), SPOTIFY_PLAN_ID).expect("activate");
        assert_eq!(entry.description, "Activated Spotify plan");
        assert_eq!(
            store.get_plan(SPOTIFY_PLAN_ID).map(|p| p.status),
            Some(PlanStatus::Active)
        );
    }

    #[test]
    fn current_plan_id_requires_plans() {
        let store = Store::new(DemoState::empty());
        assert_eq!(
            current_plan_id(&store),
            Err(FlowError::MissingSeedData("plan"))
        );
    }

    #[test]
    fn from_checkout_prefills_request() {
        let query = CheckoutQuery {
            merchant: Some("Hulu".to_string()),
            amount: Some("7.99".to_string()),
            freq: Some("yearly".to_string()),
            ..CheckoutQuery::default()
        };
        let request = CreatePlanRequest::from_checkout(&query);
        assert_eq!(request.merchant, "Hulu");
        assert_eq!(request.base_amount_usd, dec!(7.99));
        assert_eq!(request.frequency, Frequency::Yearly);
        assert_eq!(request.addon_usd, dec!(2));
    }

    #[test]
    fn mock_tx_hash_is_deterministic() {
        let a = mock_tx_hash(EntryKind::TopUp, "pln", 1);
        assert_eq!(a, mock_tx_hash(EntryKind::TopUp, "pln", 1));
        assert_ne!(a, mock_tx_hash(EntryKind::TopUp, "pln", 2));
        assert_eq!(a.len(), "0xmock_topup_".len() + 16);
    }
}
