use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::webhook_events::InsertWebhookEventEntity,
        repositories::billing_dedup::BillingDedupRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::webhook_events},
};

pub struct BillingDedupPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BillingDedupPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BillingDedupRepository for BillingDedupPostgres {
    async fn record_event_if_new(&self, provider_event_id: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(webhook_events::table)
            .values(&InsertWebhookEventEntity {
                provider_event_id: provider_event_id.to_string(),
            })
            .on_conflict(webhook_events::provider_event_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted > 0)
    }

    async fn prune_events_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let removed = delete(webhook_events::table.filter(webhook_events::received_at.lt(cutoff)))
            .execute(&mut conn)?;

        Ok(removed)
    }
}
