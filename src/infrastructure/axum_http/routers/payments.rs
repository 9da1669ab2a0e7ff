use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::usecases::{
    entitlements::EntitlementUseCase,
    payments::{PaymentGateway, PaymentUseCase},
};
use crate::config::config_model::DotEnvyConfig;
use crate::domain::{
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::enums::payment_methods::PaymentMethod,
};
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses::error_response};
use crate::infrastructure::payments::charge_client::ChargeClient;
use crate::infrastructure::postgres::{
    postgres_connection::PgPool,
    repositories::{action_logs::ActionLogPostgres, credit_ledgers::CreditLedgerPostgres},
};

#[derive(Debug, Deserialize)]
pub struct PurchasePlanBody {
    pub plan_id: String,
    pub method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct PurchasePlanResponse {
    pub upgraded: bool,
    pub plan_id: String,
}

pub fn routes(db_pool: Arc<PgPool>, config: Arc<DotEnvyConfig>) -> Router {
    let ledger_repo = CreditLedgerPostgres::new(Arc::clone(&db_pool));
    let action_log_repo = ActionLogPostgres::new(Arc::clone(&db_pool));
    let entitlements = EntitlementUseCase::new(Arc::new(ledger_repo), Arc::new(action_log_repo));
    let charge_client = ChargeClient::new(
        config.payments.base_url.clone(),
        config.payments.secret_key.clone(),
    );
    let usecase = PaymentUseCase::new(Arc::new(entitlements), Arc::new(charge_client));

    Router::new()
        .route("/purchase", post(purchase_plan))
        .with_state(Arc::new(usecase))
}

pub async fn purchase_plan<L, A, P>(
    State(usecase): State<Arc<PaymentUseCase<L, A, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<PurchasePlanBody>,
) -> impl IntoResponse
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    P: PaymentGateway + 'static,
{
    info!(%user_id, plan_id = %body.plan_id, "payments: purchase request received");

    match usecase
        .purchase_plan(user_id, &body.plan_id, body.method)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(PurchasePlanResponse {
                upgraded: true,
                plan_id: body.plan_id,
            }),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
