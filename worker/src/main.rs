use anyhow::Result;
use crates::application::usercases::hold_sweep::HoldSweepUseCase;
use crates::domain::repositories::{
    billing_dedup::BillingDedupRepository, earnings::EarningRepository, outbox::OutboxRepository,
};
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{
            billing_dedup::BillingDedupPostgres, earnings::EarningPostgres, outbox::OutboxPostgres,
        },
    },
    notify::{OutboxDelivery, WebhookOutboxDelivery},
};
use std::sync::Arc;
use tracing::error;
use tracing::info;
use url::Url;
use worker::{axum_http, config, services};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    // Repositories sharing the DB pool.
    let earning_repository: Arc<dyn EarningRepository + Send + Sync> =
        Arc::new(EarningPostgres::new(Arc::clone(&db_pool_arc)));
    let outbox_repository: Arc<dyn OutboxRepository + Send + Sync> =
        Arc::new(OutboxPostgres::new(Arc::clone(&db_pool_arc)));
    let dedup_repository: Arc<dyn BillingDedupRepository + Send + Sync> =
        Arc::new(BillingDedupPostgres::new(Arc::clone(&db_pool_arc)));

    let sweep_usecase = Arc::new(HoldSweepUseCase::new(
        Arc::clone(&earning_repository),
        Arc::clone(&outbox_repository),
    ));

    let sweep_loop = tokio::spawn(services::sweep_loop::run(
        Arc::clone(&sweep_usecase),
        dotenvy_env.sweep.interval_secs,
    ));

    let prune_loop = tokio::spawn(services::prune_loop::run(
        dedup_repository,
        dotenvy_env.sweep.event_cache_retention_hours,
    ));

    let outbox_loop = match dotenvy_env.outbox.webhook_url.as_deref() {
        Some(raw_url) => {
            let webhook_url = Url::parse(raw_url)?;
            let delivery: Arc<dyn OutboxDelivery> =
                Arc::new(WebhookOutboxDelivery::new(webhook_url));
            tokio::spawn(services::outbox_loop::run(
                outbox_repository,
                delivery,
                dotenvy_env.outbox.interval_secs,
                dotenvy_env.outbox.batch_size,
                dotenvy_env.outbox.max_attempts,
            ))
        }
        None => {
            info!("OUTBOX_WEBHOOK_URL not set; outbox drain loop disabled");
            tokio::spawn(std::future::pending::<Result<()>>())
        }
    };

    let server_config = Arc::clone(&dotenvy_env);
    let internal_server =
        tokio::spawn(
            async move { axum_http::http_serve::start(server_config, sweep_usecase).await },
        );

    tokio::select! {
        result = sweep_loop => result??,
        result = prune_loop => result??,
        result = outbox_loop => result??,
        result = internal_server => result??,
    };
    Ok(())
}
