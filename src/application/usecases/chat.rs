use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::usecases::{
    action_logs::ActionLogUseCase, entitlements::EntitlementUseCase,
};
use crate::domain::{
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::{
        actions::ActionPayload,
        chat::{ChatReply, ChatTurn},
        entitlements::ReasonCode,
    },
};

/// Opaque single-shot call to the assistant backend. No retry; a failure
/// propagates to the caller, which discards the just-sent user turn.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, message: &str, history: &[ChatTurn]) -> AnyResult<String>;
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat is not available: {0:?}")]
    NotAllowed(ReasonCode),
    #[error("failed to deduct credits")]
    ConsumeFailed,
    #[error("assistant upstream call failed")]
    Upstream(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ChatError::NotAllowed(ReasonCode::UserNotFound) => StatusCode::NOT_FOUND,
            ChatError::NotAllowed(ReasonCode::UpstreamStoreFailure) => StatusCode::BAD_GATEWAY,
            ChatError::NotAllowed(_) => StatusCode::PAYMENT_REQUIRED,
            ChatError::ConsumeFailed => StatusCode::PAYMENT_REQUIRED,
            ChatError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The gated chat turn: authorize, deduct one credit, then call the
/// assistant. The credit is spent before the upstream call resolves, so an
/// upstream failure leaves the deduction in place.
pub struct ChatUseCase<L, A, G>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    G: ChatGateway + 'static,
{
    entitlements: Arc<EntitlementUseCase<L, A>>,
    action_logs: Arc<ActionLogUseCase<A>>,
    chat_gateway: Arc<G>,
}

impl<L, A, G> ChatUseCase<L, A, G>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    G: ChatGateway + 'static,
{
    pub fn new(
        entitlements: Arc<EntitlementUseCase<L, A>>,
        action_logs: Arc<ActionLogUseCase<A>>,
        chat_gateway: Arc<G>,
    ) -> Self {
        Self {
            entitlements,
            action_logs,
            chat_gateway,
        }
    }

    pub async fn send_message(
        &self,
        user_id: Uuid,
        message: String,
        history: Vec<ChatTurn>,
    ) -> Result<ChatReply, ChatError> {
        let decision = self.entitlements.authorize(user_id).await;
        if !decision.allowed {
            let reason = decision.reason.unwrap_or(ReasonCode::UpstreamStoreFailure);
            warn!(%user_id, ?reason, "chat: message rejected");
            return Err(ChatError::NotAllowed(reason));
        }

        let prompt_correlation_id = self
            .record(
                user_id,
                ActionPayload::MessageSent {
                    content: message.clone(),
                },
            )
            .await;

        if !self.entitlements.consume(user_id, 1).await {
            warn!(%user_id, "chat: credit deduction failed after authorize");
            return Err(ChatError::ConsumeFailed);
        }

        let reply = self
            .chat_gateway
            .send(&message, &history)
            .await
            .map_err(ChatError::Upstream)?;

        let reply_correlation_id = self
            .record(
                user_id,
                ActionPayload::MessageReceived {
                    response: reply.clone(),
                },
            )
            .await;

        info!(%user_id, "chat: message answered");
        Ok(ChatReply {
            reply,
            prompt_correlation_id,
            reply_correlation_id,
        })
    }

    async fn record(&self, user_id: Uuid, payload: ActionPayload) -> Option<Uuid> {
        self.action_logs
            .record(user_id, payload, None)
            .await
            .map_err(|err| {
                warn!(%user_id, db_error = ?err, "chat: failed to record action");
            })
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{
        InMemoryActionLogRepository, InMemoryCreditLedgerRepository,
    };
    use anyhow::anyhow;

    fn setup(
        gateway: MockChatGateway,
    ) -> (
        ChatUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository, MockChatGateway>,
        Arc<EntitlementUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository>>,
        Arc<InMemoryActionLogRepository>,
    ) {
        let ledgers = Arc::new(InMemoryCreditLedgerRepository::default());
        let logs = Arc::new(InMemoryActionLogRepository::default());
        let entitlements = Arc::new(EntitlementUseCase::new(ledgers, Arc::clone(&logs)));
        let action_logs = Arc::new(ActionLogUseCase::new(Arc::clone(&logs)));
        let usecase = ChatUseCase::new(
            Arc::clone(&entitlements),
            action_logs,
            Arc::new(gateway),
        );
        (usecase, entitlements, logs)
    }

    #[tokio::test]
    async fn a_chat_turn_costs_one_credit_and_is_fully_logged() {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_send()
            .withf(|message, history| message == "hello" && history.is_empty())
            .returning(|_, _| Ok("hi there".to_string()));

        let (usecase, entitlements, logs) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();

        let reply = usecase
            .send_message(user_id, "hello".to_string(), Vec::new())
            .await
            .unwrap();

        assert_eq!(reply.reply, "hi there");
        assert!(reply.prompt_correlation_id.is_some());
        assert!(reply.reply_correlation_id.is_some());

        let ledger = entitlements.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 9);
        assert_eq!(ledger.total_consumed, 1);

        let kinds: Vec<String> = logs.entries().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, ["message_sent", "usage", "message_received"]);
    }

    #[tokio::test]
    async fn an_empty_balance_blocks_the_turn_before_the_upstream_call() {
        let mut gateway = MockChatGateway::new();
        gateway.expect_send().times(0);

        let (usecase, entitlements, _) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();
        for _ in 0..10 {
            assert!(entitlements.consume(user_id, 1).await);
        }

        let err = usecase
            .send_message(user_id, "hello".to_string(), Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::NotAllowed(ReasonCode::InsufficientCredits)
        ));
    }

    #[tokio::test]
    async fn an_unknown_user_is_rejected() {
        let mut gateway = MockChatGateway::new();
        gateway.expect_send().times(0);

        let (usecase, _, _) = setup(gateway);

        let err = usecase
            .send_message(Uuid::new_v4(), "hello".to_string(), Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::NotAllowed(ReasonCode::UserNotFound)
        ));
    }

    // The deduction lands before the upstream call resolves, so a failed
    // reply still costs the credit. The caller discards the user turn.
    #[tokio::test]
    async fn an_upstream_failure_still_costs_the_credit() {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_send()
            .returning(|_, _| Err(anyhow!("model overloaded")));

        let (usecase, entitlements, _) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();

        let err = usecase
            .send_message(user_id, "hello".to_string(), Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Upstream(_)));
        let ledger = entitlements.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 9);
    }
}
