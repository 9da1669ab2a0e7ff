use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    entities::action_logs::InsertActionLogEntity,
    repositories::action_logs::ActionLogRepository, value_objects::actions::ActionPayload,
};

/// Append-only recorder for tracked user actions. Returns a correlation id
/// per call; nothing downstream ever reads the log for authorization.
pub struct ActionLogUseCase<A>
where
    A: ActionLogRepository + Send + Sync + 'static,
{
    action_log_repo: Arc<A>,
}

impl<A> ActionLogUseCase<A>
where
    A: ActionLogRepository + Send + Sync + 'static,
{
    pub fn new(action_log_repo: Arc<A>) -> Self {
        Self { action_log_repo }
    }

    pub async fn record(
        &self,
        user_id: Uuid,
        payload: ActionPayload,
        referral_code: Option<String>,
    ) -> Result<Uuid> {
        let correlation_id = Uuid::new_v4();
        let kind = payload.kind();

        self.action_log_repo
            .append(InsertActionLogEntity {
                correlation_id,
                user_id,
                kind: kind.as_str().to_string(),
                payload: serde_json::to_value(&payload)?,
                referral_code,
            })
            .await?;

        debug!(%user_id, %correlation_id, kind = %kind, "action_logs: action recorded");
        Ok(correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryActionLogRepository;

    #[tokio::test]
    async fn record_appends_an_entry_and_returns_its_correlation_id() {
        let repo = Arc::new(InMemoryActionLogRepository::default());
        let usecase = ActionLogUseCase::new(Arc::clone(&repo));
        let user_id = Uuid::new_v4();

        let correlation_id = usecase
            .record(
                user_id,
                ActionPayload::ChatbotOpened {},
                Some("abc-123".to_string()),
            )
            .await
            .unwrap();

        let entries = repo.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].correlation_id, correlation_id);
        assert_eq!(entries[0].user_id, user_id);
        assert_eq!(entries[0].kind, "chatbot_opened");
        assert_eq!(entries[0].referral_code.as_deref(), Some("abc-123"));
    }

    #[tokio::test]
    async fn every_record_gets_a_distinct_correlation_id() {
        let repo = Arc::new(InMemoryActionLogRepository::default());
        let usecase = ActionLogUseCase::new(repo);
        let user_id = Uuid::new_v4();

        let first = usecase
            .record(user_id, ActionPayload::ChatbotOpened {}, None)
            .await
            .unwrap();
        let second = usecase
            .record(user_id, ActionPayload::ChatbotOpened {}, None)
            .await
            .unwrap();

        assert_ne!(first, second);
    }
}
