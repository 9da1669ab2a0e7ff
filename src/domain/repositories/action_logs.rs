use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::action_logs::InsertActionLogEntity;

/// Insert-only audit sink. Entries are never updated, deleted, or read back
/// for authorization.
#[async_trait]
#[automock]
pub trait ActionLogRepository {
    async fn append(&self, entity: InsertActionLogEntity) -> Result<Uuid>;
}
