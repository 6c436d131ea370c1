use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crates::{
    application::usercases::{earnings::EarningsUseCase, reversals::ReversalUseCase},
    domain::repositories::{earnings::EarningRepository, outbox::OutboxRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{earnings::EarningPostgres, outbox::OutboxPostgres},
    },
};

use crate::{auth::AdminUser, axum_http::error_responses::error_response};

#[derive(Clone)]
pub struct AdminState {
    earnings_usecase: Arc<EarningsUseCase>,
    reversal_usecase: Arc<ReversalUseCase>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let earning_repo: Arc<dyn EarningRepository + Send + Sync> =
        Arc::new(EarningPostgres::new(Arc::clone(&db_pool)));
    let outbox_repo: Arc<dyn OutboxRepository + Send + Sync> =
        Arc::new(OutboxPostgres::new(Arc::clone(&db_pool)));

    let earnings_usecase = Arc::new(EarningsUseCase::new(
        Arc::clone(&earning_repo),
        Arc::clone(&outbox_repo),
    ));
    let reversal_usecase = Arc::new(ReversalUseCase::new(earning_repo, outbox_repo));

    Router::new()
        .route("/earnings/:earning_id/approve", post(approve_earning))
        .route("/earnings/:earning_id/dispute", post(dispute_earning))
        .route("/earnings/:earning_id/cancel", post(cancel_earning))
        .route("/earnings/bulk/approve", post(bulk_approve_earnings))
        .route("/earnings/bulk/dispute", post(bulk_dispute_earnings))
        .route("/earnings/bulk/cancel", post(bulk_cancel_earnings))
        .route(
            "/subscriptions/:subscription_ref/reverse",
            post(reverse_subscription),
        )
        .with_state(AdminState {
            earnings_usecase,
            reversal_usecase,
        })
}

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkApproveBody {
    pub earning_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BulkReasonBody {
    pub earning_ids: Vec<Uuid>,
    pub reason: String,
}

pub async fn approve_earning(
    State(state): State<AdminState>,
    admin: AdminUser,
    Path(earning_id): Path<Uuid>,
) -> Response {
    match state
        .earnings_usecase
        .approve(earning_id, admin.admin_id)
        .await
    {
        Ok(earning) => (StatusCode::OK, Json(earning)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn dispute_earning(
    State(state): State<AdminState>,
    admin: AdminUser,
    Path(earning_id): Path<Uuid>,
    Json(body): Json<ReasonBody>,
) -> Response {
    match state
        .earnings_usecase
        .dispute(earning_id, admin.admin_id, body.reason)
        .await
    {
        Ok(earning) => (StatusCode::OK, Json(earning)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn cancel_earning(
    State(state): State<AdminState>,
    admin: AdminUser,
    Path(earning_id): Path<Uuid>,
    Json(body): Json<ReasonBody>,
) -> Response {
    match state
        .earnings_usecase
        .cancel(earning_id, admin.admin_id, body.reason)
        .await
    {
        Ok(earning) => (StatusCode::OK, Json(earning)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn bulk_approve_earnings(
    State(state): State<AdminState>,
    admin: AdminUser,
    Json(body): Json<BulkApproveBody>,
) -> Response {
    match state
        .earnings_usecase
        .approve_bulk(body.earning_ids, admin.admin_id)
        .await
    {
        Ok(approved) => (StatusCode::OK, Json(json!({ "approved": approved }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn bulk_dispute_earnings(
    State(state): State<AdminState>,
    admin: AdminUser,
    Json(body): Json<BulkReasonBody>,
) -> Response {
    match state
        .earnings_usecase
        .dispute_bulk(body.earning_ids, admin.admin_id, body.reason)
        .await
    {
        Ok(disputed) => (StatusCode::OK, Json(json!({ "disputed": disputed }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn bulk_cancel_earnings(
    State(state): State<AdminState>,
    admin: AdminUser,
    Json(body): Json<BulkReasonBody>,
) -> Response {
    match state
        .earnings_usecase
        .cancel_bulk(body.earning_ids, admin.admin_id, body.reason)
        .await
    {
        Ok(cancelled) => (StatusCode::OK, Json(json!({ "cancelled": cancelled }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn reverse_subscription(
    State(state): State<AdminState>,
    admin: AdminUser,
    Path(subscription_ref): Path<String>,
    Json(body): Json<ReasonBody>,
) -> Response {
    if body.reason.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "a reason is required");
    }

    match state
        .reversal_usecase
        .reverse_for_subscription(&subscription_ref, &body.reason, Some(admin.admin_id))
        .await
    {
        Ok(cancelled) => (StatusCode::OK, Json(json!({ "cancelled": cancelled }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
