use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::{
        action_logs::{ActionLogEntity, InsertActionLogEntity},
        credit_ledgers::{CreditLedgerEntity, InsertCreditLedgerEntity},
        invite_tokens::{InsertInviteTokenEntity, InviteTokenEntity},
    },
    repositories::{
        action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository,
        invite_tokens::InviteTokenRepository,
    },
};

#[derive(Default)]
pub struct InMemoryCreditLedgerRepository {
    rows: Mutex<HashMap<Uuid, CreditLedgerEntity>>,
}

#[async_trait]
impl CreditLedgerRepository for InMemoryCreditLedgerRepository {
    async fn insert_if_absent(&self, entity: InsertCreditLedgerEntity) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&entity.user_id) {
            return Ok(false);
        }

        let now = Utc::now();
        rows.insert(
            entity.user_id,
            CreditLedgerEntity {
                user_id: entity.user_id,
                balance: entity.balance,
                plan_id: entity.plan_id,
                plan_expiry: entity.plan_expiry,
                total_consumed: entity.total_consumed,
                last_reset: entity.last_reset,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(true)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CreditLedgerEntity>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn patch_balance(&self, user_id: Uuid, balance: i64) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&user_id) {
            Some(row) => {
                row.balance = balance;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn patch_usage(
        &self,
        user_id: Uuid,
        balance: i64,
        total_consumed: i64,
    ) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&user_id) {
            Some(row) => {
                row.balance = balance;
                row.total_consumed = total_consumed;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn patch_plan(
        &self,
        user_id: Uuid,
        plan_id: String,
        balance: i64,
        plan_expiry: DateTime<Utc>,
        last_reset: DateTime<Utc>,
    ) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&user_id) {
            Some(row) => {
                row.plan_id = plan_id;
                row.balance = balance;
                row.plan_expiry = plan_expiry;
                row.last_reset = last_reset;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[derive(Default)]
pub struct InMemoryInviteTokenRepository {
    rows: Mutex<Vec<InviteTokenEntity>>,
}

#[async_trait]
impl InviteTokenRepository for InMemoryInviteTokenRepository {
    async fn create(&self, entity: InsertInviteTokenEntity) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(InviteTokenEntity {
            id,
            code: entity.code,
            issuer_user_id: entity.issuer_user_id,
            used_by: entity.used_by,
            is_active: entity.is_active,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<InviteTokenEntity>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|token| token.code == code)
            .cloned())
    }

    async fn replace_used_by(&self, token_id: Uuid, used_by: Vec<Uuid>) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(token) = rows.iter_mut().find(|token| token.id == token_id) {
            token.used_by = used_by;
        }
        Ok(())
    }

    async fn list_by_issuer(&self, issuer_user_id: Uuid) -> Result<Vec<InviteTokenEntity>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|token| token.issuer_user_id == issuer_user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryActionLogRepository {
    rows: Mutex<Vec<ActionLogEntity>>,
}

impl InMemoryActionLogRepository {
    pub fn entries(&self) -> Vec<ActionLogEntity> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionLogRepository for InMemoryActionLogRepository {
    async fn append(&self, entity: InsertActionLogEntity) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(ActionLogEntity {
            id,
            correlation_id: entity.correlation_id,
            user_id: entity.user_id,
            kind: entity.kind,
            payload: entity.payload,
            referral_code: entity.referral_code,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}
