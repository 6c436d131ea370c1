use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use crates::application::usercases::hold_sweep::HoldSweepUseCase;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::config_model::DotEnvyConfig;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/sweep/hold-period" \
//     -H "Authorization: Bearer $INTERNAL_SWEEP_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"dry_run":true}'

#[derive(Clone)]
pub struct SweepRouteState {
    config: Arc<DotEnvyConfig>,
    usecase: Arc<HoldSweepUseCase>,
}

pub fn routes(config: Arc<DotEnvyConfig>, usecase: Arc<HoldSweepUseCase>) -> Router {
    Router::new()
        .route("/hold-period", post(run_hold_sweep))
        .with_state(SweepRouteState { config, usecase })
}

#[derive(Debug, Deserialize)]
pub struct RunSweepRequest {
    pub as_of: Option<DateTime<Utc>>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RunSweepResponse {
    pub matured: usize,
    pub beneficiaries: usize,
    pub dry_run: bool,
}

pub async fn run_hold_sweep(
    State(state): State<SweepRouteState>,
    headers: HeaderMap,
    Json(payload): Json<RunSweepRequest>,
) -> Response {
    let expected_token = match state.config.sweep.internal_token.as_deref() {
        Some(token) => token,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "sweep token is not configured",
            )
                .into_response();
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    let as_of = payload.as_of.unwrap_or_else(Utc::now);
    let dry_run = payload.dry_run.unwrap_or(false);

    if dry_run {
        return match state.usecase.pending_eligible(as_of).await {
            Ok(eligible) => Json(RunSweepResponse {
                matured: eligible as usize,
                beneficiaries: 0,
                dry_run: true,
            })
            .into_response(),
            Err(err) => {
                error!(error = ?err, "run_hold_sweep: dry run failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "sweep failed").into_response()
            }
        };
    }

    match state.usecase.sweep(as_of).await {
        Ok(outcome) => Json(RunSweepResponse {
            matured: outcome.matured,
            beneficiaries: outcome.beneficiaries,
            dry_run: false,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "run_hold_sweep: sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "sweep failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
