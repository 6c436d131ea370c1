use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::warn;

use crates::{
    application::usercases::{
        billing_webhook::{BillingEventGateway, BillingWebhookUseCase, IngestOutcome},
        payouts::{OutcomeApplication, PayoutUseCase},
        reversals::ReversalUseCase,
    },
    billing::{payout_gateway::PayoutDispatchClient, provider_events::BillingProviderClient},
    domain::repositories::{earnings::EarningRepository, outbox::OutboxRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            billing_dedup::BillingDedupPostgres, earnings::EarningPostgres,
            outbox::OutboxPostgres, payouts::PayoutPostgres,
        },
    },
};

use crate::{axum_http::error_responses::error_response, config::config_model::DotEnvyConfig};

pub const BILLING_SIGNATURE_HEADER: &str = "x-billing-signature";
pub const PAYOUT_SIGNATURE_HEADER: &str = "x-payout-signature";

#[derive(Clone)]
pub struct BillingWebhookState {
    billing_usecase: Arc<BillingWebhookUseCase>,
    payout_usecase: Arc<PayoutUseCase>,
    provider_client: Arc<BillingProviderClient>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let provider_client = Arc::new(BillingProviderClient::new(
        config.billing_provider.billing_webhook_secret.clone(),
        config.billing_provider.payout_webhook_secret.clone(),
    ));

    let dedup_repo = Arc::new(BillingDedupPostgres::new(Arc::clone(&db_pool)));
    let earning_repo: Arc<dyn EarningRepository + Send + Sync> =
        Arc::new(EarningPostgres::new(Arc::clone(&db_pool)));
    let outbox_repo: Arc<dyn OutboxRepository + Send + Sync> =
        Arc::new(OutboxPostgres::new(Arc::clone(&db_pool)));
    let payout_repo = Arc::new(PayoutPostgres::new(Arc::clone(&db_pool)));

    let gateway: Arc<dyn BillingEventGateway> = provider_client.clone();
    let reversals = Arc::new(ReversalUseCase::new(
        Arc::clone(&earning_repo),
        Arc::clone(&outbox_repo),
    ));
    let billing_usecase = Arc::new(BillingWebhookUseCase::new(
        gateway,
        dedup_repo,
        earning_repo,
        Arc::clone(&outbox_repo),
        reversals,
        config.commission.table(),
        config.commission.hold(),
    ));

    let dispatch_client = Arc::new(PayoutDispatchClient::new(
        config.billing_provider.payout_api_key.clone(),
        config.billing_provider.payout_api_base.clone(),
    ));
    let payout_usecase = Arc::new(PayoutUseCase::new(
        payout_repo,
        outbox_repo,
        dispatch_client,
        config.payout.fee_schedule(),
        config.payout.minimum_table(),
    ));

    Router::new()
        .route("/webhook", post(billing_webhook))
        .route("/payout-webhook", post(payout_webhook))
        .with_state(BillingWebhookState {
            billing_usecase,
            payout_usecase,
            provider_client,
        })
}

fn signature_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub async fn billing_webhook(
    State(state): State<BillingWebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = signature_header(&headers, BILLING_SIGNATURE_HEADER) else {
        return error_response(StatusCode::BAD_REQUEST, "missing signature header");
    };

    match state.billing_usecase.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            let body = match outcome {
                IngestOutcome::Created { earning_ids } => {
                    json!({ "outcome": "created", "earning_ids": earning_ids })
                }
                IngestOutcome::DuplicateEffect | IngestOutcome::DuplicateEvent => {
                    json!({ "outcome": "duplicate" })
                }
                IngestOutcome::SkippedGifted => json!({ "outcome": "skipped_gifted" }),
                IngestOutcome::Reversed { cancelled } => {
                    json!({ "outcome": "reversed", "cancelled": cancelled })
                }
                IngestOutcome::Ignored => json!({ "outcome": "ignored" }),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn payout_webhook(
    State(state): State<BillingWebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = signature_header(&headers, PAYOUT_SIGNATURE_HEADER) else {
        return error_response(StatusCode::BAD_REQUEST, "missing signature header");
    };

    let event = match state.provider_client.verify_payout_signature(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "payout webhook: signature verification failed");
            return error_response(StatusCode::BAD_REQUEST, "signature verification failed");
        }
    };

    let Some(outcome) = BillingProviderClient::extract_payout_outcome(&event) else {
        // Unknown payout event kinds are acknowledged so the provider
        // stops redelivering them.
        return (StatusCode::OK, Json(json!({ "outcome": "ignored" }))).into_response();
    };

    match state.payout_usecase.handle_dispatch_outcome(outcome).await {
        Ok(OutcomeApplication::Applied(status)) => (
            StatusCode::OK,
            Json(json!({ "outcome": "applied", "status": status })),
        )
            .into_response(),
        Ok(OutcomeApplication::Ignored) => {
            (StatusCode::OK, Json(json!({ "outcome": "ignored" }))).into_response()
        }
        // 5xx signals the provider to redeliver; transient failures only.
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
