use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::usecases::{
    entitlements::EntitlementUseCase,
    referrals::{ReferralError, ReferralUseCase},
};
use crate::domain::repositories::{
    action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository,
    invite_tokens::InviteTokenRepository,
};
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses::error_response};
use crate::infrastructure::postgres::{
    postgres_connection::PgPool,
    repositories::{
        action_logs::ActionLogPostgres, credit_ledgers::CreditLedgerPostgres,
        invite_tokens::InviteTokenPostgres,
    },
};

#[derive(Debug, Deserialize)]
pub struct RedeemInviteBody {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct IssueInviteResponse {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemInviteResponse {
    pub redeemed: bool,
}

pub fn routes(db_pool: Arc<PgPool>) -> Router {
    let invite_repo = InviteTokenPostgres::new(Arc::clone(&db_pool));
    let ledger_repo = CreditLedgerPostgres::new(Arc::clone(&db_pool));
    let action_log_repo = ActionLogPostgres::new(Arc::clone(&db_pool));
    let entitlements = EntitlementUseCase::new(Arc::new(ledger_repo), Arc::new(action_log_repo));
    let referrals = ReferralUseCase::new(Arc::new(invite_repo), Arc::new(entitlements));

    Router::new()
        .route("/", post(issue_invite))
        .route("/redeem", post(redeem_invite))
        .route("/stats", get(invite_stats))
        .with_state(Arc::new(referrals))
}

pub async fn issue_invite<I, L, A>(
    State(referrals): State<Arc<ReferralUseCase<I, L, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    I: InviteTokenRepository + Send + Sync + 'static,
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    info!(%user_id, "invites: issue request received");

    match referrals.issue_token(user_id).await {
        Ok(code) => (StatusCode::CREATED, Json(IssueInviteResponse { code })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn redeem_invite<I, L, A>(
    State(referrals): State<Arc<ReferralUseCase<I, L, A>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<RedeemInviteBody>,
) -> impl IntoResponse
where
    I: InviteTokenRepository + Send + Sync + 'static,
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    info!(%user_id, "invites: redeem request received");

    if referrals.redeem(&body.code, user_id).await {
        (StatusCode::OK, Json(RedeemInviteResponse { redeemed: true })).into_response()
    } else {
        let err = ReferralError::InvalidToken;
        error_response(err.status_code(), err.to_string())
    }
}

pub async fn invite_stats<I, L, A>(
    State(referrals): State<Arc<ReferralUseCase<I, L, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    I: InviteTokenRepository + Send + Sync + 'static,
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    match referrals.stats(user_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
