use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::invite_tokens::InviteTokenEntity;

#[derive(Debug, Clone, Serialize)]
pub struct InviteTokenSummary {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub used_count: usize,
    pub is_active: bool,
}

impl From<&InviteTokenEntity> for InviteTokenSummary {
    fn from(token: &InviteTokenEntity) -> Self {
        Self {
            code: token.code.clone(),
            created_at: token.created_at,
            used_count: token.used_by.len(),
            is_active: token.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteStats {
    pub total_issued: usize,
    pub active_count: usize,
    pub total_credits_earned: i64,
    pub recent_tokens: Vec<InviteTokenSummary>,
}
