use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::invite_tokens;

/// An issued invite token. `used_by` grows with each redemption; a token is
/// multi-use and stays active after being redeemed.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invite_tokens)]
pub struct InviteTokenEntity {
    pub id: Uuid,
    pub code: String,
    pub issuer_user_id: Uuid,
    pub used_by: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invite_tokens)]
pub struct InsertInviteTokenEntity {
    pub code: String,
    pub issuer_user_id: Uuid,
    pub used_by: Vec<Uuid>,
    pub is_active: bool,
}
