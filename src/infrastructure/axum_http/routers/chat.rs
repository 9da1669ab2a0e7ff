use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use tracing::info;

use crate::application::usecases::{
    action_logs::ActionLogUseCase,
    chat::{ChatGateway, ChatUseCase},
    entitlements::EntitlementUseCase,
};
use crate::config::config_model::DotEnvyConfig;
use crate::domain::{
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::chat::ChatTurn,
};
use crate::infrastructure::ai::gemini_client::GeminiClient;
use crate::infrastructure::axum_http::{
    auth::AuthUser,
    error_responses::{AppError, error_response},
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPool,
    repositories::{action_logs::ActionLogPostgres, credit_ledgers::CreditLedgerPostgres},
};

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

pub fn routes(db_pool: Arc<PgPool>, config: Arc<DotEnvyConfig>) -> Router {
    let ledger_repo = Arc::new(CreditLedgerPostgres::new(Arc::clone(&db_pool)));
    let action_log_repo = Arc::new(ActionLogPostgres::new(Arc::clone(&db_pool)));
    let entitlements = Arc::new(EntitlementUseCase::new(
        ledger_repo,
        Arc::clone(&action_log_repo),
    ));
    let action_logs = Arc::new(ActionLogUseCase::new(action_log_repo));
    let gemini_client = Arc::new(GeminiClient::new(
        config.gemini.api_key.clone(),
        config.gemini.model.clone(),
    ));
    let usecase = ChatUseCase::new(entitlements, action_logs, gemini_client);

    Router::new()
        .route("/send", post(send_message))
        .with_state(Arc::new(usecase))
}

pub async fn send_message<L, A, G>(
    State(usecase): State<Arc<ChatUseCase<L, A, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<SendMessageBody>,
) -> impl IntoResponse
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    G: ChatGateway + 'static,
{
    info!(%user_id, "chat: send request received");

    if body.message.trim().is_empty() {
        return AppError::BadRequest("message must not be empty".to_string()).into_response();
    }

    match usecase
        .send_message(user_id, body.message, body.history)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
