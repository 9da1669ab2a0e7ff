use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::action_logs;

/// Append-only action record. Never mutated and never consulted for
/// authorization decisions.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = action_logs)]
pub struct ActionLogEntity {
    pub id: Uuid,
    pub correlation_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub referral_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = action_logs)]
pub struct InsertActionLogEntity {
    pub correlation_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub referral_code: Option<String>,
}
