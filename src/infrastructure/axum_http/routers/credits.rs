use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use tracing::info;

use crate::application::usecases::entitlements::EntitlementUseCase;
use crate::domain::{
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::entitlements::CreditBalanceDto,
};
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses::error_response};
use crate::infrastructure::postgres::{
    postgres_connection::PgPool,
    repositories::{action_logs::ActionLogPostgres, credit_ledgers::CreditLedgerPostgres},
};

pub fn routes(db_pool: Arc<PgPool>) -> Router {
    let ledger_repo = CreditLedgerPostgres::new(Arc::clone(&db_pool));
    let action_log_repo = ActionLogPostgres::new(Arc::clone(&db_pool));
    let entitlements = EntitlementUseCase::new(Arc::new(ledger_repo), Arc::new(action_log_repo));

    Router::new()
        .route("/me", get(get_my_credits))
        .with_state(Arc::new(entitlements))
}

pub async fn get_my_credits<L, A>(
    State(entitlements): State<Arc<EntitlementUseCase<L, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    info!(%user_id, "credits: balance request received");

    // First authenticated access creates the ledger with free-tier defaults.
    if let Err(err) = entitlements.initialize(user_id).await {
        return error_response(err.status_code(), err.to_string());
    }

    match entitlements.get_ledger(user_id).await {
        Ok(ledger) => (StatusCode::OK, Json(CreditBalanceDto::from(ledger))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
