use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crates::{
    application::usercases::payouts::PayoutUseCase,
    billing::payout_gateway::PayoutDispatchClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{outbox::OutboxPostgres, payouts::PayoutPostgres},
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::error_response,
    config::config_model::DotEnvyConfig,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let payout_repo = Arc::new(PayoutPostgres::new(Arc::clone(&db_pool)));
    let outbox_repo = Arc::new(OutboxPostgres::new(Arc::clone(&db_pool)));
    let dispatch_client = Arc::new(PayoutDispatchClient::new(
        config.billing_provider.payout_api_key.clone(),
        config.billing_provider.payout_api_base.clone(),
    ));
    let usecase = Arc::new(PayoutUseCase::new(
        payout_repo,
        outbox_repo,
        dispatch_client,
        config.payout.fee_schedule(),
        config.payout.minimum_table(),
    ));

    Router::new()
        .route("/", post(request_payout).get(payout_history))
        .with_state(usecase)
}

#[derive(Debug, Deserialize)]
pub struct RequestPayoutBody {
    pub destination_account_ref: String,
    pub method: String,
    pub min_amount_minor: Option<i64>,
}

pub async fn request_payout(
    State(usecase): State<Arc<PayoutUseCase>>,
    auth: AuthUser,
    Json(body): Json<RequestPayoutBody>,
) -> Response {
    match usecase
        .request_payout(
            auth.user_id,
            body.destination_account_ref,
            body.method,
            body.min_amount_minor,
        )
        .await
    {
        Ok(payout) => (StatusCode::CREATED, Json(payout)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn payout_history(
    State(usecase): State<Arc<PayoutUseCase>>,
    auth: AuthUser,
) -> Response {
    match usecase.history(auth.user_id).await {
        Ok(payouts) => (StatusCode::OK, Json(payouts)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
