use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::ledger_outbox::InsertLedgerOutboxEntity,
    repositories::{earnings::EarningRepository, outbox::OutboxRepository},
    value_objects::{
        earnings::{EarningDto, EarningFilter, EarningsSummaryDto, StatusBucket},
        enums::{earning_statuses::EarningStatus, outbox_statuses::OutboxStatus},
    },
};

#[derive(Debug, Error)]
pub enum EarningActionError {
    #[error("earning not found")]
    NotFound,
    #[error("invalid transition from '{0}'")]
    InvalidTransition(String),
    #[error("a reason is required")]
    MissingReason,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EarningActionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EarningActionError::NotFound => StatusCode::NOT_FOUND,
            EarningActionError::InvalidTransition(_) => StatusCode::CONFLICT,
            EarningActionError::MissingReason => StatusCode::BAD_REQUEST,
            EarningActionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Beneficiary-facing queries plus the manual admin transitions. Every
/// admin transition is a guarded update; the guard losing tells us whether
/// the line was missing or just in the wrong state.
pub struct EarningsUseCase {
    earning_repo: Arc<dyn EarningRepository + Send + Sync>,
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
}

impl EarningsUseCase {
    pub fn new(
        earning_repo: Arc<dyn EarningRepository + Send + Sync>,
        outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    ) -> Self {
        Self {
            earning_repo,
            outbox_repo,
        }
    }

    pub async fn list(
        &self,
        beneficiary_user_id: Uuid,
        filter: EarningFilter,
    ) -> Result<Vec<EarningDto>, EarningActionError> {
        let rows = self
            .earning_repo
            .list_for_beneficiary(beneficiary_user_id, filter)
            .await
            .map_err(EarningActionError::Internal)?;
        Ok(rows.into_iter().map(EarningDto::from).collect())
    }

    pub async fn summary(
        &self,
        beneficiary_user_id: Uuid,
    ) -> Result<EarningsSummaryDto, EarningActionError> {
        let rows = self
            .earning_repo
            .summary_for_beneficiary(beneficiary_user_id)
            .await
            .map_err(EarningActionError::Internal)?;

        let mut summary = EarningsSummaryDto::default();
        for row in rows {
            let Some(status) = EarningStatus::from_str(&row.status) else {
                warn!(status = %row.status, "earnings: unknown status in summary row");
                continue;
            };
            summary.apply(
                status,
                StatusBucket {
                    count: row.count,
                    total_minor: row.total_minor,
                },
            );
        }
        Ok(summary)
    }

    /// Admin override of the hold window, `pending -> approved`.
    pub async fn approve(
        &self,
        earning_id: Uuid,
        actor: Uuid,
    ) -> Result<EarningDto, EarningActionError> {
        let now = Utc::now();
        let rows = self
            .earning_repo
            .approve_pending(earning_id, actor, now)
            .await
            .map_err(EarningActionError::Internal)?;

        if rows == 0 {
            return Err(self.transition_refusal(earning_id).await?);
        }

        info!(%earning_id, %actor, "earnings: approved by admin");
        self.notify("earning.approved", json!({ "earning_id": earning_id, "actor": actor }))
            .await;
        self.reload(earning_id).await
    }

    pub async fn approve_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
    ) -> Result<usize, EarningActionError> {
        let now = Utc::now();
        let requested = earning_ids.len();
        let rows = self
            .earning_repo
            .approve_pending_bulk(earning_ids, actor, now)
            .await
            .map_err(EarningActionError::Internal)?;

        info!(%actor, requested, approved = rows, "earnings: bulk approval");
        if rows > 0 {
            self.notify("earning.approved", json!({ "approved": rows, "actor": actor }))
                .await;
        }
        Ok(rows)
    }

    pub async fn dispute(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
    ) -> Result<EarningDto, EarningActionError> {
        if reason.trim().is_empty() {
            return Err(EarningActionError::MissingReason);
        }

        let now = Utc::now();
        let rows = self
            .earning_repo
            .dispute(earning_id, actor, reason.clone(), now)
            .await
            .map_err(EarningActionError::Internal)?;

        if rows == 0 {
            return Err(self.transition_refusal(earning_id).await?);
        }

        info!(%earning_id, %actor, reason = %reason, "earnings: disputed by admin");
        self.notify(
            "earning.disputed",
            json!({ "earning_id": earning_id, "actor": actor, "reason": reason }),
        )
        .await;
        self.reload(earning_id).await
    }

    pub async fn cancel(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
    ) -> Result<EarningDto, EarningActionError> {
        if reason.trim().is_empty() {
            return Err(EarningActionError::MissingReason);
        }

        let now = Utc::now();
        let rows = self
            .earning_repo
            .cancel(earning_id, actor, reason.clone(), now)
            .await
            .map_err(EarningActionError::Internal)?;

        if rows == 0 {
            return Err(self.transition_refusal(earning_id).await?);
        }

        info!(%earning_id, %actor, reason = %reason, "earnings: cancelled by admin");
        self.notify(
            "earning.cancelled",
            json!({ "earning_id": earning_id, "actor": actor, "reason": reason }),
        )
        .await;
        self.reload(earning_id).await
    }

    pub async fn dispute_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
    ) -> Result<usize, EarningActionError> {
        if reason.trim().is_empty() {
            return Err(EarningActionError::MissingReason);
        }

        let now = Utc::now();
        let requested = earning_ids.len();
        let rows = self
            .earning_repo
            .dispute_bulk(earning_ids, actor, reason.clone(), now)
            .await
            .map_err(EarningActionError::Internal)?;

        info!(%actor, requested, disputed = rows, reason = %reason, "earnings: bulk dispute");
        if rows > 0 {
            self.notify("earning.disputed", json!({ "disputed": rows, "actor": actor }))
                .await;
        }
        Ok(rows)
    }

    pub async fn cancel_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
    ) -> Result<usize, EarningActionError> {
        if reason.trim().is_empty() {
            return Err(EarningActionError::MissingReason);
        }

        let now = Utc::now();
        let requested = earning_ids.len();
        let rows = self
            .earning_repo
            .cancel_bulk(earning_ids, actor, reason.clone(), now)
            .await
            .map_err(EarningActionError::Internal)?;

        info!(%actor, requested, cancelled = rows, reason = %reason, "earnings: bulk cancel");
        if rows > 0 {
            self.notify("earning.cancelled", json!({ "cancelled": rows, "actor": actor }))
                .await;
        }
        Ok(rows)
    }

    /// A guard that matched nothing either had no row or the wrong state;
    /// the reload distinguishes the two for the caller.
    async fn transition_refusal(
        &self,
        earning_id: Uuid,
    ) -> Result<EarningActionError, EarningActionError> {
        let current = self
            .earning_repo
            .find_by_id(earning_id)
            .await
            .map_err(EarningActionError::Internal)?;
        match current {
            None => Ok(EarningActionError::NotFound),
            Some(entity) => Ok(EarningActionError::InvalidTransition(entity.status)),
        }
    }

    async fn reload(&self, earning_id: Uuid) -> Result<EarningDto, EarningActionError> {
        let entity = self
            .earning_repo
            .find_by_id(earning_id)
            .await
            .map_err(EarningActionError::Internal)?
            .ok_or(EarningActionError::NotFound)?;
        Ok(EarningDto::from(entity))
    }

    async fn notify(&self, topic: &str, payload: serde_json::Value) {
        let entry = InsertLedgerOutboxEntity {
            topic: topic.to_string(),
            payload,
            status: OutboxStatus::Pending.as_str().to_string(),
        };
        if let Err(err) = self.outbox_repo.enqueue(vec![entry]).await {
            error!(topic, error = ?err, "earnings: failed to enqueue notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::earnings::EarningEntity,
        repositories::{earnings::MockEarningRepository, outbox::MockOutboxRepository},
        value_objects::earnings::SummaryRow,
    };
    use mockall::predicate::eq;

    fn entity(id: Uuid, status: &str) -> EarningEntity {
        let now = Utc::now();
        EarningEntity {
            id,
            beneficiary_user_id: Uuid::new_v4(),
            referred_user_id: Uuid::new_v4(),
            subscription_ref: "sub_42".to_string(),
            source: "purchase".to_string(),
            origin_earning_id: None,
            gross_amount_minor: 10_000,
            commission_rate: "0.08".parse().unwrap(),
            commission_amount_minor: 800,
            currency: "USD".to_string(),
            status: status.to_string(),
            tier_level: 1,
            is_gifted: false,
            payment_completed_at: Some(now),
            hold_policy: "timed".to_string(),
            hold_period_days: 30,
            eligible_for_payout_at: now,
            approved_at: None,
            approved_by: None,
            paid_at: None,
            disputed_at: None,
            disputed_by: None,
            disputed_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            cancelled_reason: None,
            payout_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn approve_returns_the_updated_line() {
        let earning_id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_approve_pending()
            .times(1)
            .returning(|_, _, _| Ok(1));
        earning_repo
            .expect_find_by_id()
            .with(eq(earning_id))
            .returning(move |id| Ok(Some(entity(id, "approved"))));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));

        let usecase = EarningsUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let dto = usecase.approve(earning_id, actor).await.unwrap();
        assert_eq!(dto.status, EarningStatus::Approved);
    }

    #[tokio::test]
    async fn approving_a_paid_line_is_an_invalid_transition() {
        let earning_id = Uuid::new_v4();
        let mut earning_repo = MockEarningRepository::new();

        earning_repo
            .expect_approve_pending()
            .times(1)
            .returning(|_, _, _| Ok(0));
        earning_repo
            .expect_find_by_id()
            .returning(move |id| Ok(Some(entity(id, "paid"))));

        let usecase =
            EarningsUseCase::new(Arc::new(earning_repo), Arc::new(MockOutboxRepository::new()));
        let err = usecase.approve(earning_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EarningActionError::InvalidTransition(status) if status == "paid"));
    }

    #[tokio::test]
    async fn approving_a_missing_line_is_not_found() {
        let mut earning_repo = MockEarningRepository::new();
        earning_repo
            .expect_approve_pending()
            .returning(|_, _, _| Ok(0));
        earning_repo.expect_find_by_id().returning(|_| Ok(None));

        let usecase =
            EarningsUseCase::new(Arc::new(earning_repo), Arc::new(MockOutboxRepository::new()));
        let err = usecase
            .approve(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, EarningActionError::NotFound));
    }

    #[tokio::test]
    async fn dispute_requires_a_reason() {
        let usecase = EarningsUseCase::new(
            Arc::new(MockEarningRepository::new()),
            Arc::new(MockOutboxRepository::new()),
        );
        let err = usecase
            .dispute(Uuid::new_v4(), Uuid::new_v4(), "   ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EarningActionError::MissingReason));
    }

    #[tokio::test]
    async fn cancel_carries_reason_through() {
        let earning_id = Uuid::new_v4();
        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_cancel()
            .withf(|_, _, reason, _| reason == "fraudulent signup")
            .times(1)
            .returning(|_, _, _, _| Ok(1));
        earning_repo
            .expect_find_by_id()
            .returning(move |id| Ok(Some(entity(id, "cancelled"))));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));

        let usecase = EarningsUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let dto = usecase
            .cancel(earning_id, Uuid::new_v4(), "fraudulent signup".to_string())
            .await
            .unwrap();
        assert_eq!(dto.status, EarningStatus::Cancelled);
    }

    #[tokio::test]
    async fn bulk_cancel_reports_how_many_rows_matched() {
        let actor = Uuid::new_v4();
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        // One of the three is already terminal; the guard skips it.
        earning_repo
            .expect_cancel_bulk()
            .times(1)
            .returning(|_, _, _, _| Ok(2));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));

        let usecase = EarningsUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let cancelled = usecase
            .cancel_bulk(ids, actor, "plan migration".to_string())
            .await
            .unwrap();
        assert_eq!(cancelled, 2);
    }

    #[tokio::test]
    async fn summary_folds_aggregation_rows() {
        let beneficiary = Uuid::new_v4();
        let mut earning_repo = MockEarningRepository::new();

        earning_repo
            .expect_summary_for_beneficiary()
            .with(eq(beneficiary))
            .returning(|_| {
                Ok(vec![
                    SummaryRow {
                        status: "pending".to_string(),
                        count: 3,
                        total_minor: 2400,
                    },
                    SummaryRow {
                        status: "approved".to_string(),
                        count: 1,
                        total_minor: 800,
                    },
                ])
            });

        let usecase =
            EarningsUseCase::new(Arc::new(earning_repo), Arc::new(MockOutboxRepository::new()));
        let summary = usecase.summary(beneficiary).await.unwrap();
        assert_eq!(summary.pending.count, 3);
        assert_eq!(summary.pending.total_minor, 2400);
        assert_eq!(summary.approved.count, 1);
        assert_eq!(summary.paid, StatusBucket::default());
    }
}
