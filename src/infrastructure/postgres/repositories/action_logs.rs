use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use uuid::Uuid;

use crate::domain::{
    entities::action_logs::InsertActionLogEntity,
    repositories::action_logs::ActionLogRepository,
};
use crate::infrastructure::postgres::{postgres_connection::PgPool, schema::action_logs};

pub struct ActionLogPostgres {
    db_pool: Arc<PgPool>,
}

impl ActionLogPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ActionLogRepository for ActionLogPostgres {
    async fn append(&self, entity: InsertActionLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = insert_into(action_logs::table)
            .values(&entity)
            .returning(action_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }
}
