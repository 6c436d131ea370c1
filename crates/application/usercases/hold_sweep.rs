use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::ledger_outbox::InsertLedgerOutboxEntity,
    repositories::{earnings::EarningRepository, outbox::OutboxRepository},
    value_objects::enums::outbox_statuses::OutboxStatus,
};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    pub matured: usize,
    pub beneficiaries: usize,
}

/// Matures pending earnings whose hold window has elapsed.
///
/// The mutation is one conditional bulk update, so concurrent sweeps (or a
/// sweep racing an admin approval) cannot double-apply; a re-run simply
/// matches nothing.
pub struct HoldSweepUseCase {
    earning_repo: Arc<dyn EarningRepository + Send + Sync>,
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
}

impl HoldSweepUseCase {
    pub fn new(
        earning_repo: Arc<dyn EarningRepository + Send + Sync>,
        outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    ) -> Self {
        Self {
            earning_repo,
            outbox_repo,
        }
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepOutcome, SweepError> {
        let matured = self.earning_repo.mature_eligible(now).await.map_err(|err| {
            error!(db_error = ?err, "hold sweep: bulk maturation failed");
            SweepError::Internal(err)
        })?;

        if matured.is_empty() {
            info!(%now, "hold sweep: no earnings ready to mature");
            return Ok(SweepOutcome::default());
        }

        // One notification per beneficiary so downstream summary caches
        // refresh once, not per line.
        let mut per_beneficiary: HashMap<Uuid, (usize, i64)> = HashMap::new();
        for row in &matured {
            let slot = per_beneficiary
                .entry(row.beneficiary_user_id)
                .or_insert((0, 0));
            slot.0 += 1;
            slot.1 += row.commission_amount_minor;
        }

        let outcome = SweepOutcome {
            matured: matured.len(),
            beneficiaries: per_beneficiary.len(),
        };
        info!(
            %now,
            matured = outcome.matured,
            beneficiaries = outcome.beneficiaries,
            "hold sweep: earnings matured to approved"
        );

        let entries = per_beneficiary
            .into_iter()
            .map(|(beneficiary, (count, total_minor))| InsertLedgerOutboxEntity {
                topic: "earnings.matured".to_string(),
                payload: json!({
                    "beneficiary_user_id": beneficiary,
                    "count": count,
                    "total_minor": total_minor,
                }),
                status: OutboxStatus::Pending.as_str().to_string(),
            })
            .collect();
        if let Err(err) = self.outbox_repo.enqueue(entries).await {
            warn!(error = ?err, "hold sweep: failed to enqueue maturation notifications");
        }

        Ok(outcome)
    }

    /// How many lines the next sweep would mature, without mutating.
    pub async fn pending_eligible(&self, now: DateTime<Utc>) -> Result<i64, SweepError> {
        Ok(self.earning_repo.count_eligible(now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        repositories::{earnings::MockEarningRepository, outbox::MockOutboxRepository},
        value_objects::earnings::MaturedEarning,
    };

    fn matured(beneficiary: Uuid, amount: i64) -> MaturedEarning {
        MaturedEarning {
            id: Uuid::new_v4(),
            beneficiary_user_id: beneficiary,
            commission_amount_minor: amount,
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn matures_and_notifies_per_beneficiary() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        earning_repo.expect_mature_eligible().times(1).returning(
            move |_| Ok(vec![matured(alice, 500), matured(alice, 300), matured(bob, 80)]),
        );
        outbox_repo
            .expect_enqueue()
            .withf(|entries| {
                entries.len() == 2 && entries.iter().all(|e| e.topic == "earnings.matured")
            })
            .times(1)
            .returning(|_| Ok(()));

        let usecase = HoldSweepUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let outcome = usecase.sweep(Utc::now()).await.unwrap();
        assert_eq!(outcome.matured, 3);
        assert_eq!(outcome.beneficiaries, 2);
    }

    #[tokio::test]
    async fn rerun_after_full_sweep_is_a_noop() {
        let mut earning_repo = MockEarningRepository::new();
        let outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_mature_eligible()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let usecase = HoldSweepUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let outcome = usecase.sweep(Utc::now()).await.unwrap();
        assert_eq!(outcome, SweepOutcome::default());
    }
}
