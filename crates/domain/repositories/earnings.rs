use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        earnings::{EarningEntity, InsertEarningEntity},
        processed_payments::InsertProcessedPaymentEntity,
    },
    value_objects::earnings::{EarningFilter, MaturedEarning, SummaryRow},
};

#[automock]
#[async_trait]
pub trait EarningRepository {
    /// Records the payment-level idempotency row and the earning drafts in
    /// one transaction. Returns `None` when the payment was already
    /// processed, in which case nothing is written.
    async fn create_for_payment(
        &self,
        payment: InsertProcessedPaymentEntity,
        drafts: Vec<InsertEarningEntity>,
    ) -> Result<Option<Vec<Uuid>>>;

    /// Earliest purchase earning for the subscription and beneficiary,
    /// used as the provenance backreference on renewal lines.
    async fn find_purchase_origin(
        &self,
        subscription_ref: &str,
        beneficiary_user_id: Uuid,
    ) -> Result<Option<Uuid>>;

    async fn find_by_id(&self, earning_id: Uuid) -> Result<Option<EarningEntity>>;

    async fn list_for_beneficiary(
        &self,
        beneficiary_user_id: Uuid,
        filter: EarningFilter,
    ) -> Result<Vec<EarningEntity>>;

    async fn summary_for_beneficiary(&self, beneficiary_user_id: Uuid) -> Result<Vec<SummaryRow>>;

    /// Single conditional bulk update: every pending, non-gifted line whose
    /// eligibility timestamp has passed becomes approved. Safe to re-run.
    async fn mature_eligible(&self, now: DateTime<Utc>) -> Result<Vec<MaturedEarning>>;

    async fn count_eligible(&self, now: DateTime<Utc>) -> Result<i64>;

    /// Guarded on `status = pending`; the affected-row count tells the
    /// caller whether the transition happened.
    async fn approve_pending(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    async fn approve_pending_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Guarded on `status IN (pending, approved)`; releases any payout link
    /// in the same transaction.
    async fn dispute(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    async fn cancel(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    async fn dispute_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    async fn cancel_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Cancels every pending/approved line for the subscription, releasing
    /// payout links first. Returns the number of lines cancelled.
    async fn cancel_for_subscription(
        &self,
        subscription_ref: &str,
        reason: &str,
        actor: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<usize>;
}
