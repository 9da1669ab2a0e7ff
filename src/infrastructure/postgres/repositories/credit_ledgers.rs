use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::domain::{
    entities::credit_ledgers::{CreditLedgerEntity, InsertCreditLedgerEntity},
    repositories::credit_ledgers::CreditLedgerRepository,
};
use crate::infrastructure::postgres::{postgres_connection::PgPool, schema::credit_ledgers};

pub struct CreditLedgerPostgres {
    db_pool: Arc<PgPool>,
}

impl CreditLedgerPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CreditLedgerRepository for CreditLedgerPostgres {
    async fn insert_if_absent(&self, entity: InsertCreditLedgerEntity) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = insert_into(credit_ledgers::table)
            .values(&entity)
            .on_conflict(credit_ledgers::user_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CreditLedgerEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = credit_ledgers::table
            .filter(credit_ledgers::user_id.eq(user_id))
            .select(CreditLedgerEntity::as_select())
            .first::<CreditLedgerEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn patch_balance(&self, user_id: Uuid, balance: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(credit_ledgers::table)
            .filter(credit_ledgers::user_id.eq(user_id))
            .set((
                credit_ledgers::balance.eq(balance),
                credit_ledgers::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(rows)
    }

    async fn patch_usage(
        &self,
        user_id: Uuid,
        balance: i64,
        total_consumed: i64,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(credit_ledgers::table)
            .filter(credit_ledgers::user_id.eq(user_id))
            .set((
                credit_ledgers::balance.eq(balance),
                credit_ledgers::total_consumed.eq(total_consumed),
                credit_ledgers::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(rows)
    }

    async fn patch_plan(
        &self,
        user_id: Uuid,
        plan_id: String,
        balance: i64,
        plan_expiry: DateTime<Utc>,
        last_reset: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = update(credit_ledgers::table)
            .filter(credit_ledgers::user_id.eq(user_id))
            .set((
                credit_ledgers::plan_id.eq(plan_id),
                credit_ledgers::balance.eq(balance),
                credit_ledgers::plan_expiry.eq(plan_expiry),
                credit_ledgers::last_reset.eq(last_reset),
                credit_ledgers::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(rows)
    }
}
