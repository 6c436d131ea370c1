use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crates::{
    application::usercases::earnings::EarningsUseCase,
    domain::value_objects::{
        earnings::EarningFilter,
        enums::{earning_sources::EarningSource, earning_statuses::EarningStatus},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{earnings::EarningPostgres, outbox::OutboxPostgres},
    },
};

use crate::{auth::AuthUser, axum_http::error_responses::error_response};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let earning_repo = Arc::new(EarningPostgres::new(Arc::clone(&db_pool)));
    let outbox_repo = Arc::new(OutboxPostgres::new(Arc::clone(&db_pool)));
    let usecase = Arc::new(EarningsUseCase::new(earning_repo, outbox_repo));

    Router::new()
        .route("/", get(list_earnings))
        .route("/summary", get(earnings_summary))
        .with_state(usecase)
}

#[derive(Debug, Deserialize)]
pub struct ListEarningsQuery {
    pub status: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_earnings(
    State(usecase): State<Arc<EarningsUseCase>>,
    auth: AuthUser,
    Query(query): Query<ListEarningsQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match EarningStatus::from_str(raw) {
            Some(status) => Some(status),
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("unknown status '{raw}'"),
                );
            }
        },
    };
    let source = match query.source.as_deref() {
        None => None,
        Some(raw) => match EarningSource::from_str(raw) {
            Some(source) => Some(source),
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("unknown source '{raw}'"),
                );
            }
        },
    };

    let filter = EarningFilter {
        status,
        source,
        limit: query.limit,
        offset: query.offset,
    };

    match usecase.list(auth.user_id, filter).await {
        Ok(earnings) => (StatusCode::OK, Json(earnings)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn earnings_summary(
    State(usecase): State<Arc<EarningsUseCase>>,
    auth: AuthUser,
) -> Response {
    match usecase.summary(auth.user_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
