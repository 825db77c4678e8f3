use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{billable_id}", get(get_billable))
        .route("/{billable_id}/subscription", post(swap_subscription))
        .route("/{billable_id}/subscription/cancel", post(cancel_subscription))
        .route("/{billable_id}/subscription/resume", post(resume_subscription))
        .route(
            "/{billable_id}/charges/{charge_id}/refund",
            post(refund_charge),
        )
}

#[derive(Deserialize)]
struct OverviewParams {
    brief: Option<String>,
}

impl OverviewParams {
    /// Any value other than empty, `0` or `false` asks for the brief view.
    fn brief(&self) -> bool {
        self.brief.as_deref().map(str::trim).is_some_and(|v| {
            !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        })
    }
}

async fn get_billable(
    State(app_state): State<AppState>,
    Path(billable_id): Path<i64>,
    Query(params): Query<OverviewParams>,
) -> AppResult<impl IntoResponse> {
    let overview = app_state
        .billable_admin_use_cases
        .overview(billable_id, params.brief())
        .await?;

    Ok(Json(overview))
}

#[derive(Deserialize, Default)]
struct CancelPayload {
    #[serde(default)]
    now: bool,
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    Path(billable_id): Path<i64>,
    payload: Option<Json<CancelPayload>>,
) -> AppResult<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    app_state
        .billable_admin_use_cases
        .cancel(billable_id, payload.now)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct SwapPayload {
    plan: Option<String>,
}

async fn swap_subscription(
    State(app_state): State<AppState>,
    Path(billable_id): Path<i64>,
    Json(payload): Json<SwapPayload>,
) -> AppResult<impl IntoResponse> {
    let plan = payload
        .plan
        .ok_or_else(|| AppError::InvalidInput("plan is required".to_string()))?;

    app_state
        .billable_admin_use_cases
        .swap(billable_id, &plan)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn resume_subscription(
    State(app_state): State<AppState>,
    Path(billable_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    app_state
        .billable_admin_use_cases
        .resume(billable_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Default)]
struct RefundPayload {
    amount: Option<i64>,
    notes: Option<String>,
}

async fn refund_charge(
    State(app_state): State<AppState>,
    Path((billable_id, charge_id)): Path<(i64, String)>,
    payload: Option<Json<RefundPayload>>,
) -> AppResult<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let refund = app_state
        .billable_admin_use_cases
        .refund(billable_id, &charge_id, payload.amount, payload.notes)
        .await?;

    Ok(Json(refund))
}
