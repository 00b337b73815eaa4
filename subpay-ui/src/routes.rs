//! HTTP route handlers for the UI API.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use subpay::core::checkout::{CheckoutQuery, PayIntentQuote};
use subpay::core::coverage::{monthly_yield, projected_next_coverage};
use subpay::core::invariants::validate_plan;
use subpay::core::reducer::Outcome;
use subpay::core::summary::{DashboardSummary, dashboard_summary, days_until_due};
use subpay::core::types::{NetworkEnv, Plan, PlanPatch, Strategy, TimelineEntry, User};
use subpay::flows::{self, CreatePlanRequest, FlowContext, FlowError};
use subpay::io::config::SimulatedStep;
use subpay::state::DemoState;
use subpay::store::Store;
use tracing::warn;

use crate::simulate::after_delay;
use crate::state::{AppState, ChangeEvent};

/// Where the detail screen sends users when a plan is missing.
const BACK_LINK: &str = "/app";

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/settings", put(put_settings))
        .route("/connect/paypal", post(post_connect_paypal))
        .route("/connect/wallet", post(post_connect_wallet))
        .route("/plans", get(list_plans).post(post_create_plan))
        .route("/plans/{id}", get(get_plan).patch(patch_plan))
        .route("/plans/{id}/topup", post(post_top_up))
        .route("/plans/{id}/allocate", post(post_allocate))
        .route("/plans/{id}/pay", post(post_pay))
        .route("/plans/{id}/redeem", post(post_redeem))
        .route("/plans/{id}/addon", post(post_addon))
        .route("/plans/{id}/pause", post(post_pause))
        .route("/plans/{id}/activate", post(post_activate))
        .route("/current-plan", get(get_current_plan))
        .route("/strategies", get(list_strategies))
        .route("/timeline", get(get_timeline))
        .route("/dashboard", get(get_dashboard))
        .route("/pay-intent", get(get_pay_intent))
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    back: Option<&'static str>,
}

/// Error response with a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    back: Option<&'static str>,
}

impl ApiError {
    fn plan_not_found(id: &str) -> Self {
        FlowError::PlanNotFound(id.to_string()).into()
    }

    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
            back: None,
        }
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let (status, back) = match &err {
            FlowError::PlanNotFound(_) => (StatusCode::NOT_FOUND, Some(BACK_LINK)),
            FlowError::StrategyNotFound(_) => (StatusCode::NOT_FOUND, None),
            FlowError::MissingSeedData(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            FlowError::Transition(_) => (StatusCode::CONFLICT, None),
            FlowError::PotOverflow(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        };
        Self {
            status,
            message: err.to_string(),
            back,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            back: self.back,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn health() -> &'static str {
    "ok"
}

/// GET /api/state - the whole session state.
async fn get_state(State(state): State<AppState>) -> Json<DemoState> {
    Json(state.store.read().await.state().clone())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct SessionResponse {
    demo_mode: bool,
    network_env: NetworkEnv,
    wallet_connected: bool,
    paypal_connected: bool,
    user: Option<User>,
}

impl SessionResponse {
    fn of(state: &DemoState) -> Self {
        Self {
            demo_mode: state.demo_mode,
            network_env: state.network_env,
            wallet_connected: state.wallet_connected,
            paypal_connected: state.paypal_connected,
            user: state.user.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsRequest {
    demo_mode: Option<bool>,
    network_env: Option<NetworkEnv>,
}

/// PUT /api/settings - toggle demo mode or switch network.
async fn put_settings(
    State(state): State<AppState>,
    Json(request): Json<SettingsRequest>,
) -> Json<SessionResponse> {
    let session = {
        let mut store = state.store.write().await;
        if let Some(enabled) = request.demo_mode {
            store.set_demo_mode(enabled);
        }
        if let Some(env) = request.network_env {
            store.set_network_env(env);
        }
        SessionResponse::of(store.state())
    };
    state.notify([ChangeEvent::SessionChanged]);
    Json(session)
}

/// POST /api/connect/paypal
async fn post_connect_paypal(State(state): State<AppState>) -> Json<SessionResponse> {
    connect(&state, flows::connect_paypal).await
}

/// POST /api/connect/wallet
async fn post_connect_wallet(State(state): State<AppState>) -> Json<SessionResponse> {
    connect(&state, flows::connect_wallet).await
}

async fn connect<F>(state: &AppState, flow: F) -> Json<SessionResponse>
where
    F: FnOnce(&mut Store) -> User + Send,
{
    let session = after_delay(state, SimulatedStep::Connect, |store| {
        flow(store);
        SessionResponse::of(store.state())
    })
    .await;
    state.notify([ChangeEvent::SessionChanged]);
    Json(session)
}

/// GET /api/plans
async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    Json(state.store.read().await.plans().to_vec())
}

/// POST /api/plans - create a plan from the create-plan form.
async fn post_create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> (StatusCode, Json<Plan>) {
    let ctx = state.flows.clone();
    let plan = after_delay(&state, SimulatedStep::CreatePlan, |store| {
        flows::create_plan(store, &ctx, &request)
    })
    .await;
    state.notify([ChangeEvent::PlanAdded {
        plan_id: plan.id.clone(),
    }]);
    (StatusCode::CREATED, Json(plan))
}

#[derive(Debug, Serialize)]
struct PlanDetail {
    plan: Plan,
    /// Entries linked to this plan, newest first.
    timeline: Vec<TimelineEntry>,
    days_until_due: i64,
    monthly_yield: Decimal,
    projected_next_coverage: Decimal,
}

/// GET /api/plans/{id} - plan detail screen data.
async fn get_plan(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PlanDetail> {
    let store = state.store.read().await;
    let plan = store
        .get_plan(&id)
        .cloned()
        .ok_or_else(|| ApiError::plan_not_found(&id))?;
    let timeline = store.timeline_for_plan(&id).into_iter().cloned().collect();

    Ok(Json(PlanDetail {
        days_until_due: days_until_due(plan.due_date, state.flows.clock().now()),
        monthly_yield: monthly_yield(&plan),
        projected_next_coverage: projected_next_coverage(&plan),
        timeline,
        plan,
    }))
}

/// PATCH /api/plans/{id} - partial update through the store.
async fn patch_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PlanPatch>,
) -> ApiResult<Plan> {
    let plan = {
        let mut store = state.store.write().await;
        let mut merged = store
            .get_plan(&id)
            .cloned()
            .ok_or_else(|| ApiError::plan_not_found(&id))?;
        patch.apply_to(&mut merged);
        let errors = validate_plan(&merged);
        if !errors.is_empty() {
            warn!(plan_id = %id, errors = ?errors, "rejected plan patch");
            return Err(ApiError::bad_request(errors.join("; ")));
        }

        match store.update_plan(&id, patch) {
            Outcome::Applied => store
                .get_plan(&id)
                .cloned()
                .ok_or_else(|| ApiError::plan_not_found(&id))?,
            Outcome::PlanNotFound => return Err(ApiError::plan_not_found(&id)),
            Outcome::TransitionRejected { message, .. } => {
                return Err(FlowError::Transition(message).into());
            }
        }
    };
    state.notify([ChangeEvent::PlanUpdated { plan_id: id }]);
    Ok(Json(plan))
}

/// Run a plan flow, optionally after its simulated delay, and broadcast.
async fn run_step<F>(
    state: &AppState,
    step: Option<SimulatedStep>,
    plan_id: String,
    flow: F,
) -> ApiResult<TimelineEntry>
where
    F: FnOnce(&mut Store, &FlowContext, &str) -> Result<TimelineEntry, FlowError> + Send,
{
    let ctx = state.flows.clone();
    let result = match step {
        Some(step) => after_delay(state, step, |store| flow(store, &*ctx, &plan_id)).await,
        None => {
            let mut store = state.store.write().await;
            flow(&mut *store, &*ctx, &plan_id)
        }
    };
    let entry = result.inspect_err(|err| warn!(plan_id = %plan_id, error = %err, "flow failed"))?;

    state.notify([
        ChangeEvent::PlanUpdated {
            plan_id: plan_id.clone(),
        },
        ChangeEvent::TimelineAppended {
            plan_id: Some(plan_id),
        },
    ]);
    Ok(Json(entry))
}

/// POST /api/plans/{id}/topup
async fn post_top_up(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TimelineEntry> {
    run_step(&state, Some(SimulatedStep::TopUp), id, flows::top_up).await
}

#[derive(Debug, Default, Deserialize)]
struct AllocateQuery {
    strategy_id: Option<String>,
}

/// POST /api/plans/{id}/allocate?strategy_id=...
async fn post_allocate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AllocateQuery>,
) -> ApiResult<TimelineEntry> {
    run_step(
        &state,
        Some(SimulatedStep::Allocate),
        id,
        move |store, ctx, plan_id| flows::allocate(store, ctx, plan_id, query.strategy_id.as_deref()),
    )
    .await
}

/// POST /api/plans/{id}/pay
async fn post_pay(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TimelineEntry> {
    run_step(&state, Some(SimulatedStep::Pay), id, flows::pay).await
}

#[derive(Debug, Deserialize)]
struct AmountRequest {
    amount: Decimal,
}

/// POST /api/plans/{id}/redeem
async fn post_redeem(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> ApiResult<TimelineEntry> {
    run_step(&state, None, id, move |store, ctx, plan_id| {
        flows::redeem(store, ctx, plan_id, request.amount)
    })
    .await
}

/// POST /api/plans/{id}/addon
async fn post_addon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> ApiResult<TimelineEntry> {
    run_step(&state, None, id, move |store, ctx, plan_id| {
        flows::change_addon(store, ctx, plan_id, request.amount)
    })
    .await
}

/// POST /api/plans/{id}/pause
async fn post_pause(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TimelineEntry> {
    run_step(&state, None, id, flows::pause).await
}

/// POST /api/plans/{id}/activate
async fn post_activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TimelineEntry> {
    run_step(&state, None, id, flows::activate).await
}

/// GET /api/current-plan - the plan the onboarding screens act on.
async fn get_current_plan(State(state): State<AppState>) -> ApiResult<Plan> {
    let store = state.store.read().await;
    let id = flows::current_plan_id(&store)?;
    store
        .get_plan(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::plan_not_found(&id))
}

/// GET /api/strategies
async fn list_strategies(State(state): State<AppState>) -> Json<Vec<Strategy>> {
    Json(state.store.read().await.strategies().to_vec())
}

/// GET /api/timeline - all entries, newest first.
async fn get_timeline(State(state): State<AppState>) -> Json<Vec<TimelineEntry>> {
    Json(state.store.read().await.timeline().to_vec())
}

#[derive(Debug, Serialize)]
struct PlanCard {
    #[serde(flatten)]
    plan: Plan,
    days_until_due: i64,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    summary: DashboardSummary,
    plans: Vec<PlanCard>,
}

/// GET /api/dashboard - summary cards plus every plan with its due countdown.
async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let store = state.store.read().await;
    let now = state.flows.clock().now();
    let plans = store
        .plans()
        .iter()
        .map(|plan| PlanCard {
            days_until_due: days_until_due(plan.due_date, now),
            plan: plan.clone(),
        })
        .collect();

    Json(DashboardResponse {
        summary: dashboard_summary(store.plans()),
        plans,
    })
}

/// GET /api/pay-intent?merchant=&amount=&currency=&freq=&addon=
async fn get_pay_intent(
    State(state): State<AppState>,
    Query(query): Query<CheckoutQuery>,
) -> Json<PayIntentQuote> {
    let apr = state
        .store
        .read()
        .await
        .strategies()
        .first()
        .map(|strategy| strategy.apr);
    Json(query.quote(apr))
}
