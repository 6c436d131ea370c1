#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub sweep: Sweep,
    pub outbox: Outbox,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Sweep {
    pub interval_secs: u64,
    pub internal_token: Option<String>,
    pub event_cache_retention_hours: i64,
}

#[derive(Debug, Clone)]
pub struct Outbox {
    pub interval_secs: u64,
    pub batch_size: i64,
    pub max_attempts: i32,
    pub webhook_url: Option<String>,
}
