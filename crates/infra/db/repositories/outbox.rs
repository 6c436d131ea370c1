use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::ledger_outbox::{InsertLedgerOutboxEntity, LedgerOutboxEntity},
        repositories::outbox::OutboxRepository,
        value_objects::enums::outbox_statuses::OutboxStatus,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::ledger_outbox},
};

pub struct OutboxPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OutboxPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OutboxRepository for OutboxPostgres {
    async fn enqueue(&self, entries: Vec<InsertLedgerOutboxEntity>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(ledger_outbox::table)
            .values(&entries)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<LedgerOutboxEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = ledger_outbox::table
            .filter(ledger_outbox::status.eq(OutboxStatus::Pending.as_str()))
            .order(ledger_outbox::created_at.asc())
            .limit(limit)
            .select(LedgerOutboxEntity::as_select())
            .load::<LedgerOutboxEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn mark_sent(&self, outbox_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(ledger_outbox::table.filter(ledger_outbox::id.eq(outbox_id)))
            .set((
                ledger_outbox::status.eq(OutboxStatus::Sent.as_str()),
                ledger_outbox::sent_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_attempt_failed(
        &self,
        outbox_id: Uuid,
        error: &str,
        max_attempts: i32,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(ledger_outbox::table.filter(ledger_outbox::id.eq(outbox_id)))
            .set((
                ledger_outbox::attempts.eq(ledger_outbox::attempts + 1),
                ledger_outbox::last_error.eq(error),
            ))
            .execute(&mut conn)?;

        // Park entries that exhausted their retries so the drain loop
        // stops picking them up.
        update(
            ledger_outbox::table.filter(
                ledger_outbox::id
                    .eq(outbox_id)
                    .and(ledger_outbox::attempts.ge(max_attempts)),
            ),
        )
        .set(ledger_outbox::status.eq(OutboxStatus::Failed.as_str()))
        .execute(&mut conn)?;

        Ok(())
    }
}
