use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::entitlements::EntitlementUseCase;
use crate::domain::{
    entities::invite_tokens::InsertInviteTokenEntity,
    repositories::{
        action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository,
        invite_tokens::InviteTokenRepository,
    },
    value_objects::referrals::{InviteStats, InviteTokenSummary},
};

/// Credits awarded to the inviting user per redemption.
pub const ISSUER_BONUS_CREDITS: i64 = 5;
/// Credits awarded to the redeeming user.
pub const REDEEMER_BONUS_CREDITS: i64 = 10;

const RECENT_TOKENS_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("invite token not found or inactive")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReferralError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReferralError::InvalidToken => StatusCode::BAD_REQUEST,
            ReferralError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Issues invite tokens and pays out referral bonuses on redemption.
///
/// Tokens are multi-use: redemption appends to `used_by` without a
/// duplicate check and never flips `is_active`, so the same user redeeming
/// a code twice is awarded twice. Award writes are best-effort; a failed
/// award after the token mutation is logged, not rolled back.
pub struct ReferralUseCase<I, L, A>
where
    I: InviteTokenRepository + Send + Sync + 'static,
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    invite_repo: Arc<I>,
    entitlements: Arc<EntitlementUseCase<L, A>>,
}

impl<I, L, A> ReferralUseCase<I, L, A>
where
    I: InviteTokenRepository + Send + Sync + 'static,
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    pub fn new(invite_repo: Arc<I>, entitlements: Arc<EntitlementUseCase<L, A>>) -> Self {
        Self {
            invite_repo,
            entitlements,
        }
    }

    /// Issues a fresh opaque invite code for the user. There is no cap on
    /// outstanding tokens per issuer.
    pub async fn issue_token(&self, issuer_user_id: Uuid) -> Result<String, ReferralError> {
        let code = Uuid::new_v4().to_string();

        self.invite_repo
            .create(InsertInviteTokenEntity {
                code: code.clone(),
                issuer_user_id,
                used_by: Vec::new(),
                is_active: true,
            })
            .await
            .map_err(|err| {
                error!(%issuer_user_id, db_error = ?err, "referrals: failed to persist invite token");
                ReferralError::Internal(err)
            })?;

        info!(%issuer_user_id, "referrals: invite token issued");
        Ok(code)
    }

    /// Redeems `code` for `redeemer_user_id` and pays both parties. Returns
    /// `false` when the code is unknown or inactive.
    pub async fn redeem(&self, code: &str, redeemer_user_id: Uuid) -> bool {
        let token = match self.invite_repo.find_by_code(code).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!(%redeemer_user_id, "referrals: redemption of unknown code");
                return false;
            }
            Err(err) => {
                error!(%redeemer_user_id, db_error = ?err, "referrals: failed to look up invite code");
                return false;
            }
        };

        if !token.is_active {
            warn!(%redeemer_user_id, token_id = %token.id, "referrals: redemption of inactive token");
            return false;
        }

        let mut used_by = token.used_by.clone();
        used_by.push(redeemer_user_id);

        if let Err(err) = self.invite_repo.replace_used_by(token.id, used_by).await {
            error!(
                %redeemer_user_id,
                token_id = %token.id,
                db_error = ?err,
                "referrals: failed to record redemption"
            );
            return false;
        }

        // Both awards are best-effort; see add_credits.
        self.entitlements
            .add_credits(token.issuer_user_id, ISSUER_BONUS_CREDITS, "Referral bonus")
            .await;
        self.entitlements
            .add_credits(
                redeemer_user_id,
                REDEEMER_BONUS_CREDITS,
                "Referral welcome bonus",
            )
            .await;

        info!(
            %redeemer_user_id,
            issuer_user_id = %token.issuer_user_id,
            token_id = %token.id,
            "referrals: invite redeemed"
        );
        true
    }

    /// Aggregated invite statistics for an issuer. `total_credits_earned`
    /// is derived from the token rows, not the ledger, so it can drift from
    /// actually-awarded credits if a redemption partially failed.
    pub async fn stats(&self, issuer_user_id: Uuid) -> Result<InviteStats, ReferralError> {
        let tokens = self
            .invite_repo
            .list_by_issuer(issuer_user_id)
            .await
            .map_err(|err| {
                error!(%issuer_user_id, db_error = ?err, "referrals: failed to load invite tokens");
                ReferralError::Internal(err)
            })?;

        let total_issued = tokens.len();
        let active_count = tokens.iter().filter(|token| token.is_active).count();
        let total_credits_earned = ISSUER_BONUS_CREDITS
            * tokens
                .iter()
                .map(|token| token.used_by.len() as i64)
                .sum::<i64>();
        let recent_tokens = tokens
            .iter()
            .take(RECENT_TOKENS_LIMIT)
            .map(InviteTokenSummary::from)
            .collect();

        Ok(InviteStats {
            total_issued,
            active_count,
            total_credits_earned,
            recent_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{
        InMemoryActionLogRepository, InMemoryCreditLedgerRepository, InMemoryInviteTokenRepository,
    };

    type TestReferrals = ReferralUseCase<
        InMemoryInviteTokenRepository,
        InMemoryCreditLedgerRepository,
        InMemoryActionLogRepository,
    >;

    fn setup() -> (
        TestReferrals,
        Arc<EntitlementUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository>>,
        Arc<InMemoryInviteTokenRepository>,
    ) {
        let ledgers = Arc::new(InMemoryCreditLedgerRepository::default());
        let logs = Arc::new(InMemoryActionLogRepository::default());
        let invites = Arc::new(InMemoryInviteTokenRepository::default());
        let entitlements = Arc::new(EntitlementUseCase::new(ledgers, logs));
        let referrals = ReferralUseCase::new(Arc::clone(&invites), Arc::clone(&entitlements));
        (referrals, entitlements, invites)
    }

    async fn balance_of(
        entitlements: &EntitlementUseCase<
            InMemoryCreditLedgerRepository,
            InMemoryActionLogRepository,
        >,
        user_id: Uuid,
    ) -> i64 {
        entitlements.get_ledger(user_id).await.unwrap().balance
    }

    #[tokio::test]
    async fn redemption_awards_both_parties_and_shows_in_stats() {
        let (referrals, entitlements, _) = setup();
        let issuer = Uuid::new_v4();
        let redeemer = Uuid::new_v4();
        entitlements.initialize(issuer).await.unwrap();
        entitlements.initialize(redeemer).await.unwrap();

        let code = referrals.issue_token(issuer).await.unwrap();
        assert!(referrals.redeem(&code, redeemer).await);

        assert_eq!(balance_of(&entitlements, issuer).await, 10 + 5);
        assert_eq!(balance_of(&entitlements, redeemer).await, 10 + 10);

        let stats = referrals.stats(issuer).await.unwrap();
        assert_eq!(stats.total_issued, 1);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.total_credits_earned, 5);
    }

    #[tokio::test]
    async fn redeeming_an_unknown_code_fails() {
        let (referrals, _, _) = setup();

        assert!(!referrals.redeem("no-such-code", Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn tokens_stay_active_and_redeemable_after_use() {
        let (referrals, entitlements, _) = setup();
        let issuer = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        for user in [issuer, first, second] {
            entitlements.initialize(user).await.unwrap();
        }

        let code = referrals.issue_token(issuer).await.unwrap();
        assert!(referrals.redeem(&code, first).await);
        assert!(referrals.redeem(&code, second).await);

        assert_eq!(balance_of(&entitlements, issuer).await, 10 + 5 + 5);

        let stats = referrals.stats(issuer).await.unwrap();
        assert_eq!(stats.total_credits_earned, 10);
        assert_eq!(stats.recent_tokens[0].used_count, 2);
    }

    // Known gap, kept on purpose: nothing stops a user from redeeming the
    // same code twice, and each redemption pays out again.
    #[tokio::test]
    async fn the_same_user_can_redeem_twice_and_is_paid_twice() {
        let (referrals, entitlements, _) = setup();
        let issuer = Uuid::new_v4();
        let redeemer = Uuid::new_v4();
        entitlements.initialize(issuer).await.unwrap();
        entitlements.initialize(redeemer).await.unwrap();

        let code = referrals.issue_token(issuer).await.unwrap();
        assert!(referrals.redeem(&code, redeemer).await);
        assert!(referrals.redeem(&code, redeemer).await);

        assert_eq!(balance_of(&entitlements, redeemer).await, 10 + 10 + 10);
        assert_eq!(balance_of(&entitlements, issuer).await, 10 + 5 + 5);
    }

    #[tokio::test]
    async fn stats_lists_at_most_five_recent_tokens_newest_first() {
        let (referrals, _, _) = setup();
        let issuer = Uuid::new_v4();

        let mut codes = Vec::new();
        for _ in 0..7 {
            codes.push(referrals.issue_token(issuer).await.unwrap());
        }

        let stats = referrals.stats(issuer).await.unwrap();
        assert_eq!(stats.total_issued, 7);
        assert_eq!(stats.recent_tokens.len(), 5);
        assert_eq!(stats.recent_tokens[0].code, codes[6]);
    }

    #[tokio::test]
    async fn awards_still_flow_when_one_ledger_is_missing() {
        let (referrals, entitlements, _) = setup();
        let issuer = Uuid::new_v4();
        let redeemer = Uuid::new_v4();
        // Only the redeemer has a ledger; the issuer award is silently skipped.
        entitlements.initialize(redeemer).await.unwrap();

        let code = referrals.issue_token(issuer).await.unwrap();
        assert!(referrals.redeem(&code, redeemer).await);

        assert_eq!(balance_of(&entitlements, redeemer).await, 20);
        let stats = referrals.stats(issuer).await.unwrap();
        // The derived stat counts the redemption even though the award never landed.
        assert_eq!(stats.total_credits_earned, 5);
    }
}
