use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::domain::{
    entities::invite_tokens::{InsertInviteTokenEntity, InviteTokenEntity},
    repositories::invite_tokens::InviteTokenRepository,
};
use crate::infrastructure::postgres::{postgres_connection::PgPool, schema::invite_tokens};

pub struct InviteTokenPostgres {
    db_pool: Arc<PgPool>,
}

impl InviteTokenPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InviteTokenRepository for InviteTokenPostgres {
    async fn create(&self, entity: InsertInviteTokenEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = insert_into(invite_tokens::table)
            .values(&entity)
            .returning(invite_tokens::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<InviteTokenEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = invite_tokens::table
            .filter(invite_tokens::code.eq(code))
            .select(InviteTokenEntity::as_select())
            .first::<InviteTokenEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn replace_used_by(&self, token_id: Uuid, used_by: Vec<Uuid>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(invite_tokens::table)
            .filter(invite_tokens::id.eq(token_id))
            .set(invite_tokens::used_by.eq(used_by))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_by_issuer(&self, issuer_user_id: Uuid) -> Result<Vec<InviteTokenEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = invite_tokens::table
            .filter(invite_tokens::issuer_user_id.eq(issuer_user_id))
            .order(invite_tokens::created_at.desc())
            .select(InviteTokenEntity::as_select())
            .load::<InviteTokenEntity>(&mut conn)?;

        Ok(rows)
    }
}
