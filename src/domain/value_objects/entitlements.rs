use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::credit_ledgers::CreditLedgerEntity,
    value_objects::{enums::plan_ids::PlanId, plans::PlanCatalog},
};

/// Why a gated action was denied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    UserNotFound,
    PlanExpired,
    InsufficientCredits,
    UpstreamStoreFailure,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AuthorizeDecision {
    pub allowed: bool,
    pub reason: Option<ReasonCode>,
}

impl AuthorizeDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: ReasonCode) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditBalanceDto {
    pub user_id: Uuid,
    pub balance: i64,
    pub plan_id: String,
    pub plan_name: String,
    pub plan_expiry: DateTime<Utc>,
    pub total_consumed: i64,
    pub last_reset: DateTime<Utc>,
}

impl From<CreditLedgerEntity> for CreditBalanceDto {
    fn from(ledger: CreditLedgerEntity) -> Self {
        let plan_name = PlanId::from_str(&ledger.plan_id)
            .map(|id| PlanCatalog::find_by_id(id).name.to_string())
            .unwrap_or_else(|| ledger.plan_id.clone());

        Self {
            user_id: ledger.user_id,
            balance: ledger.balance,
            plan_id: ledger.plan_id,
            plan_name,
            plan_expiry: ledger.plan_expiry,
            total_consumed: ledger.total_consumed,
            last_reset: ledger.last_reset,
        }
    }
}
