use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::usecases::action_logs::ActionLogUseCase;
use crate::domain::{
    repositories::action_logs::ActionLogRepository, value_objects::actions::ActionPayload,
};
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses::AppError};
use crate::infrastructure::postgres::{
    postgres_connection::PgPool, repositories::action_logs::ActionLogPostgres,
};

#[derive(Debug, Deserialize)]
pub struct RecordActionBody {
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordActionResponse {
    pub correlation_id: Uuid,
}

pub fn routes(db_pool: Arc<PgPool>) -> Router {
    let action_log_repo = ActionLogPostgres::new(Arc::clone(&db_pool));
    let usecase = ActionLogUseCase::new(Arc::new(action_log_repo));

    Router::new()
        .route("/", post(record_action))
        .with_state(Arc::new(usecase))
}

pub async fn record_action<A>(
    State(usecase): State<Arc<ActionLogUseCase<A>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<RecordActionBody>,
) -> impl IntoResponse
where
    A: ActionLogRepository + Send + Sync + 'static,
{
    if body.action.trim().is_empty() {
        return AppError::BadRequest("action must not be empty".to_string()).into_response();
    }

    let payload = ActionPayload::Other {
        action: body.action,
        data: body.data,
    };

    match usecase.record(user_id, payload, body.referral_code).await {
        Ok(correlation_id) => (
            StatusCode::CREATED,
            Json(RecordActionResponse { correlation_id }),
        )
            .into_response(),
        Err(err) => AppError::Internal(err).into_response(),
    }
}
