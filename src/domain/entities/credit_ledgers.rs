use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::credit_ledgers;

/// Per-user credit ledger. One row per user, created on first authenticated
/// access and never hard-deleted.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = credit_ledgers, primary_key(user_id))]
pub struct CreditLedgerEntity {
    pub user_id: Uuid,
    pub balance: i64,
    pub plan_id: String,
    pub plan_expiry: DateTime<Utc>,
    pub total_consumed: i64,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = credit_ledgers)]
pub struct InsertCreditLedgerEntity {
    pub user_id: Uuid,
    pub balance: i64,
    pub plan_id: String,
    pub plan_expiry: DateTime<Utc>,
    pub total_consumed: i64,
    pub last_reset: DateTime<Utc>,
}
