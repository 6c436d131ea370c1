use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            earnings::{EarningEntity, InsertEarningEntity},
            processed_payments::InsertProcessedPaymentEntity,
        },
        repositories::earnings::EarningRepository,
        value_objects::{
            earnings::{EarningFilter, MaturedEarning, SummaryRow},
            enums::{earning_sources::EarningSource, earning_statuses::EarningStatus},
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{earnings, processed_payments},
    },
};

const OPEN_STATUSES: [&str; 2] = ["pending", "approved"];

pub struct EarningPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EarningPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EarningRepository for EarningPostgres {
    async fn create_for_payment(
        &self,
        payment: InsertProcessedPaymentEntity,
        drafts: Vec<InsertEarningEntity>,
    ) -> Result<Option<Vec<Uuid>>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = conn.transaction::<Option<Vec<Uuid>>, anyhow::Error, _>(|conn| {
            // The unique key on (subscription_ref, provider_payment_id) is
            // the idempotency guard; losing the conflict means another
            // delivery already applied this payment.
            let inserted = insert_into(processed_payments::table)
                .values(&payment)
                .on_conflict((
                    processed_payments::subscription_ref,
                    processed_payments::provider_payment_id,
                ))
                .do_nothing()
                .execute(conn)?;

            if inserted == 0 {
                return Ok(None);
            }
            if drafts.is_empty() {
                return Ok(Some(Vec::new()));
            }

            let ids = insert_into(earnings::table)
                .values(&drafts)
                .returning(earnings::id)
                .get_results::<Uuid>(conn)?;
            Ok(Some(ids))
        })?;

        Ok(created)
    }

    async fn find_purchase_origin(
        &self,
        subscription_ref: &str,
        beneficiary_user_id: Uuid,
    ) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let origin = earnings::table
            .filter(earnings::subscription_ref.eq(subscription_ref))
            .filter(earnings::beneficiary_user_id.eq(beneficiary_user_id))
            .filter(earnings::source.eq(EarningSource::Purchase.as_str()))
            .order(earnings::created_at.asc())
            .select(earnings::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(origin)
    }

    async fn find_by_id(&self, earning_id: Uuid) -> Result<Option<EarningEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entity = earnings::table
            .filter(earnings::id.eq(earning_id))
            .select(EarningEntity::as_select())
            .first::<EarningEntity>(&mut conn)
            .optional()?;

        Ok(entity)
    }

    async fn list_for_beneficiary(
        &self,
        beneficiary_user_id: Uuid,
        filter: EarningFilter,
    ) -> Result<Vec<EarningEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = earnings::table
            .filter(earnings::beneficiary_user_id.eq(beneficiary_user_id))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(earnings::status.eq(status.as_str()));
        }
        if let Some(source) = filter.source {
            query = query.filter(earnings::source.eq(source.as_str()));
        }

        let limit = filter.limit.unwrap_or(50).clamp(1, 200);
        let offset = filter.offset.unwrap_or(0).max(0);

        let rows = query
            .order(earnings::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(EarningEntity::as_select())
            .load::<EarningEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn summary_for_beneficiary(&self, beneficiary_user_id: Uuid) -> Result<Vec<SummaryRow>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = earnings::table
            .filter(earnings::beneficiary_user_id.eq(beneficiary_user_id))
            .group_by(earnings::status)
            .select((
                earnings::status,
                diesel::dsl::count_star(),
                diesel::dsl::sum(earnings::commission_amount_minor),
            ))
            .load::<(String, i64, Option<Decimal>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(status, count, total)| SummaryRow {
                status,
                count,
                total_minor: total.and_then(|d| d.to_i64()).unwrap_or(0),
            })
            .collect())
    }

    async fn mature_eligible(&self, now: DateTime<Utc>) -> Result<Vec<MaturedEarning>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::status
                    .eq(EarningStatus::Pending.as_str())
                    .and(earnings::payment_completed_at.is_not_null())
                    .and(earnings::eligible_for_payout_at.le(now))
                    .and(earnings::is_gifted.eq(false)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Approved.as_str()),
            earnings::approved_at.eq(now),
            earnings::updated_at.eq(now),
        ))
        .returning((
            earnings::id,
            earnings::beneficiary_user_id,
            earnings::commission_amount_minor,
            earnings::currency,
        ))
        .get_results::<(Uuid, Uuid, i64, String)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(id, beneficiary_user_id, commission_amount_minor, currency)| MaturedEarning {
                id,
                beneficiary_user_id,
                commission_amount_minor,
                currency,
            })
            .collect())
    }

    async fn count_eligible(&self, now: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = earnings::table
            .filter(
                earnings::status
                    .eq(EarningStatus::Pending.as_str())
                    .and(earnings::payment_completed_at.is_not_null())
                    .and(earnings::eligible_for_payout_at.le(now))
                    .and(earnings::is_gifted.eq(false)),
            )
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn approve_pending(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq(earning_id)
                    .and(earnings::status.eq(EarningStatus::Pending.as_str())),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Approved.as_str()),
            earnings::approved_at.eq(now),
            earnings::approved_by.eq(actor),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn approve_pending_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq_any(earning_ids)
                    .and(earnings::status.eq(EarningStatus::Pending.as_str())),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Approved.as_str()),
            earnings::approved_at.eq(now),
            earnings::approved_by.eq(actor),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn dispute(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Clearing payout_id in the same statement releases any payout
        // link atomically with the transition.
        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq(earning_id)
                    .and(earnings::status.eq_any(OPEN_STATUSES)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Disputed.as_str()),
            earnings::disputed_at.eq(now),
            earnings::disputed_by.eq(actor),
            earnings::disputed_reason.eq(reason),
            earnings::payout_id.eq::<Option<Uuid>>(None),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn cancel(
        &self,
        earning_id: Uuid,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq(earning_id)
                    .and(earnings::status.eq_any(OPEN_STATUSES)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Cancelled.as_str()),
            earnings::cancelled_at.eq(now),
            earnings::cancelled_by.eq(actor),
            earnings::cancelled_reason.eq(reason),
            earnings::payout_id.eq::<Option<Uuid>>(None),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn dispute_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq_any(earning_ids)
                    .and(earnings::status.eq_any(OPEN_STATUSES)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Disputed.as_str()),
            earnings::disputed_at.eq(now),
            earnings::disputed_by.eq(actor),
            earnings::disputed_reason.eq(reason),
            earnings::payout_id.eq::<Option<Uuid>>(None),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn cancel_bulk(
        &self,
        earning_ids: Vec<Uuid>,
        actor: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::id
                    .eq_any(earning_ids)
                    .and(earnings::status.eq_any(OPEN_STATUSES)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Cancelled.as_str()),
            earnings::cancelled_at.eq(now),
            earnings::cancelled_by.eq(actor),
            earnings::cancelled_reason.eq(reason),
            earnings::payout_id.eq::<Option<Uuid>>(None),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn cancel_for_subscription(
        &self,
        subscription_ref: &str,
        reason: &str,
        actor: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            earnings::table.filter(
                earnings::subscription_ref
                    .eq(subscription_ref)
                    .and(earnings::status.eq_any(OPEN_STATUSES)),
            ),
        )
        .set((
            earnings::status.eq(EarningStatus::Cancelled.as_str()),
            earnings::cancelled_at.eq(now),
            earnings::cancelled_by.eq(actor),
            earnings::cancelled_reason.eq(reason),
            earnings::payout_id.eq::<Option<Uuid>>(None),
            earnings::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }
}
