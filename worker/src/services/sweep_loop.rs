use anyhow::Result;
use chrono::Utc;
use crates::application::usercases::hold_sweep::HoldSweepUseCase;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Recurring hold-period sweep, independent of request traffic. The
/// underlying update is conditional, so overlapping runs across worker
/// instances are harmless.
pub async fn run(usecase: Arc<HoldSweepUseCase>, interval_secs: u64) -> Result<()> {
    info!(interval_secs, "Starting hold-period sweep loop");
    loop {
        match usecase.sweep(Utc::now()).await {
            Ok(outcome) if outcome.matured > 0 => {
                info!(
                    matured = outcome.matured,
                    beneficiaries = outcome.beneficiaries,
                    "Hold-period sweep matured earnings"
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("Hold-period sweep failed: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}
