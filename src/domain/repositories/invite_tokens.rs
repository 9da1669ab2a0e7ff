use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::invite_tokens::{InsertInviteTokenEntity, InviteTokenEntity};

#[async_trait]
#[automock]
pub trait InviteTokenRepository {
    async fn create(&self, entity: InsertInviteTokenEntity) -> Result<Uuid>;

    async fn find_by_code(&self, code: &str) -> Result<Option<InviteTokenEntity>>;

    /// Replaces the full redeemer list, mirroring a document update of the
    /// `used_by` field. Last write wins.
    async fn replace_used_by(&self, token_id: Uuid, used_by: Vec<Uuid>) -> Result<()>;

    /// All tokens issued by a user, newest first.
    async fn list_by_issuer(&self, issuer_user_id: Uuid) -> Result<Vec<InviteTokenEntity>>;
}
