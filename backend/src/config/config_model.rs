use std::collections::HashMap;

use rust_decimal::Decimal;

use crates::domain::value_objects::payouts::FeeRule;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub billing_provider: BillingProvider,
    pub commission: Commission,
    pub payout: Payout,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct BillingProvider {
    pub billing_webhook_secret: String,
    pub payout_webhook_secret: String,
    pub payout_api_key: String,
    pub payout_api_base: String,
}

#[derive(Debug, Clone)]
pub struct Commission {
    pub plan_rates: HashMap<String, Decimal>,
    pub sub_affiliate_rate: Decimal,
    pub hold_policy: String,
    pub hold_period_days: i32,
}

#[derive(Debug, Clone)]
pub struct Payout {
    pub minimums: HashMap<String, i64>,
    pub fee_rules: HashMap<String, FeeRule>,
}

#[derive(Debug, Clone)]
pub struct AuthSecret {
    pub secret: String,
}
