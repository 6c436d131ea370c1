use anyhow::Result;

use super::config_model::{Database, DotEnvyConfig, Outbox, Sweep, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .expect("SERVER_PORT_WORKER is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let sweep = Sweep {
        interval_secs: std::env::var("HOLD_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()?,
        internal_token: std::env::var("INTERNAL_SWEEP_TOKEN").ok().filter(|t| !t.is_empty()),
        event_cache_retention_hours: std::env::var("EVENT_CACHE_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()?,
    };

    let outbox = Outbox {
        interval_secs: std::env::var("OUTBOX_INTERVAL_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?,
        batch_size: std::env::var("OUTBOX_BATCH_SIZE")
            .unwrap_or_else(|_| "50".to_string())
            .parse()?,
        max_attempts: std::env::var("OUTBOX_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?,
        webhook_url: std::env::var("OUTBOX_WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        sweep,
        outbox,
    })
}
