use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::Error as DieselError;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            earnings::EarningEntity,
            payouts::{InsertPayoutEntity, PayoutEntity},
        },
        repositories::payouts::PayoutRepository,
        value_objects::enums::{earning_statuses::EarningStatus, payout_statuses::PayoutStatus},
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{earnings, payouts},
    },
};

const NON_TERMINAL_STATUSES: [&str; 3] = ["pending", "processing", "in_transit"];

pub struct PayoutPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PayoutPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PayoutRepository for PayoutPostgres {
    async fn eligible_earnings(
        &self,
        beneficiary_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<EarningEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = earnings::table
            .filter(earnings::beneficiary_user_id.eq(beneficiary_user_id))
            .filter(earnings::status.eq(EarningStatus::Approved.as_str()))
            .filter(earnings::payout_id.is_null())
            .filter(earnings::eligible_for_payout_at.le(now))
            .filter(earnings::is_gifted.eq(false))
            .order(earnings::created_at.asc())
            .select(EarningEntity::as_select())
            .load::<EarningEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn create_with_links(
        &self,
        payout: InsertPayoutEntity,
        earning_ids: Vec<Uuid>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let payout_id = payout.id;
        let expected = earning_ids.len();

        let result = conn.transaction::<(), DieselError, _>(|conn| {
            insert_into(payouts::table).values(&payout).execute(conn)?;

            let linked = update(
                earnings::table.filter(
                    earnings::id
                        .eq_any(&earning_ids)
                        .and(earnings::status.eq(EarningStatus::Approved.as_str()))
                        .and(earnings::payout_id.is_null()),
                ),
            )
            .set((
                earnings::payout_id.eq(payout_id),
                earnings::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            // Partial linkage must never be observable; a concurrent claim
            // on any selected line rolls the whole batch back.
            if linked != expected {
                return Err(DieselError::RollbackTransaction);
            }
            Ok(())
        });

        match result {
            Ok(()) => Ok(true),
            Err(DieselError::RollbackTransaction) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, payout_id: Uuid) -> Result<Option<PayoutEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entity = payouts::table
            .filter(payouts::id.eq(payout_id))
            .select(PayoutEntity::as_select())
            .first::<PayoutEntity>(&mut conn)
            .optional()?;

        Ok(entity)
    }

    async fn find_by_provider_id(
        &self,
        provider_payout_id: &str,
    ) -> Result<Option<PayoutEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entity = payouts::table
            .filter(payouts::provider_payout_id.eq(provider_payout_id))
            .select(PayoutEntity::as_select())
            .first::<PayoutEntity>(&mut conn)
            .optional()?;

        Ok(entity)
    }

    async fn history_for_beneficiary(
        &self,
        beneficiary_user_id: Uuid,
    ) -> Result<Vec<(PayoutEntity, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = payouts::table
            .filter(payouts::beneficiary_user_id.eq(beneficiary_user_id))
            .order(payouts::requested_at.desc())
            .select(PayoutEntity::as_select())
            .load::<PayoutEntity>(&mut conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let counts: HashMap<Uuid, i64> = earnings::table
            .filter(earnings::payout_id.eq_any(&ids))
            .group_by(earnings::payout_id)
            .select((earnings::payout_id, diesel::dsl::count_star()))
            .load::<(Option<Uuid>, i64)>(&mut conn)?
            .into_iter()
            .filter_map(|(payout_id, count)| payout_id.map(|id| (id, count)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|payout| {
                let count = counts.get(&payout.id).copied().unwrap_or(0);
                (payout, count)
            })
            .collect())
    }

    async fn linked_earning_count(&self, payout_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = earnings::table
            .filter(earnings::payout_id.eq(payout_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn mark_processing(
        &self,
        payout_id: Uuid,
        provider_payout_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            payouts::table.filter(
                payouts::id
                    .eq(payout_id)
                    .and(payouts::status.eq(PayoutStatus::Pending.as_str())),
            ),
        )
        .set((
            payouts::status.eq(PayoutStatus::Processing.as_str()),
            payouts::provider_payout_id.eq(provider_payout_id),
            payouts::processed_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn mark_in_transit(&self, payout_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(
            payouts::table.filter(
                payouts::id
                    .eq(payout_id)
                    .and(payouts::status.eq_any(["pending", "processing"])),
            ),
        )
        .set((
            payouts::status.eq(PayoutStatus::InTransit.as_str()),
            payouts::processed_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows)
    }

    async fn mark_paid(&self, payout_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = conn.transaction::<usize, DieselError, _>(|conn| {
            let rows = update(
                payouts::table.filter(
                    payouts::id
                        .eq(payout_id)
                        .and(payouts::status.eq_any(NON_TERMINAL_STATUSES)),
                ),
            )
            .set((
                payouts::status.eq(PayoutStatus::Paid.as_str()),
                payouts::paid_at.eq(now),
            ))
            .execute(conn)?;

            if rows > 0 {
                update(
                    earnings::table.filter(
                        earnings::payout_id
                            .eq(payout_id)
                            .and(earnings::status.eq(EarningStatus::Approved.as_str())),
                    ),
                )
                .set((
                    earnings::status.eq(EarningStatus::Paid.as_str()),
                    earnings::paid_at.eq(now),
                    earnings::updated_at.eq(now),
                ))
                .execute(conn)?;
            }

            Ok(rows)
        })?;

        Ok(rows)
    }

    async fn mark_released_terminal(
        &self,
        payout_id: Uuid,
        status: &str,
        failure_code: Option<String>,
        failure_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = conn.transaction::<usize, DieselError, _>(|conn| {
            let rows = update(
                payouts::table.filter(
                    payouts::id
                        .eq(payout_id)
                        .and(payouts::status.eq_any(NON_TERMINAL_STATUSES)),
                ),
            )
            .set((
                payouts::status.eq(status),
                payouts::failure_code.eq(failure_code),
                payouts::failure_message.eq(failure_message),
                payouts::failed_at.eq(now),
            ))
            .execute(conn)?;

            // Releasing in the same transaction keeps the linkage invariant:
            // a failed payout never pins earnings out of the eligible pool.
            if rows > 0 {
                update(
                    earnings::table.filter(
                        earnings::payout_id
                            .eq(payout_id)
                            .and(earnings::status.eq(EarningStatus::Approved.as_str())),
                    ),
                )
                .set((
                    earnings::payout_id.eq::<Option<Uuid>>(None),
                    earnings::updated_at.eq(now),
                ))
                .execute(conn)?;
            }

            Ok(rows)
        })?;

        Ok(rows)
    }
}
