use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::credit_ledgers::{CreditLedgerEntity, InsertCreditLedgerEntity};

/// Document-style access to the per-user ledger. Every patch method writes
/// absolute values computed by the caller; the store is last-write-wins and
/// nothing here provides compare-and-swap. Patch methods report the number
/// of rows touched so callers can detect a missing ledger.
#[async_trait]
#[automock]
pub trait CreditLedgerRepository {
    /// Creates the ledger if no row exists for the user. Returns `true`
    /// when a row was created, `false` when one was already present.
    async fn insert_if_absent(&self, entity: InsertCreditLedgerEntity) -> Result<bool>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CreditLedgerEntity>>;

    async fn patch_balance(&self, user_id: Uuid, balance: i64) -> Result<usize>;

    async fn patch_usage(&self, user_id: Uuid, balance: i64, total_consumed: i64)
    -> Result<usize>;

    async fn patch_plan(
        &self,
        user_id: Uuid,
        plan_id: String,
        balance: i64,
        plan_expiry: DateTime<Utc>,
        last_reset: DateTime<Utc>,
    ) -> Result<usize>;
}
