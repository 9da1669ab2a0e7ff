use std::sync::Arc;

use anyhow::Result as AnyResult;
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::credit_ledgers::{CreditLedgerEntity, InsertCreditLedgerEntity},
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::{
        actions::ActionPayload,
        entitlements::{AuthorizeDecision, ReasonCode},
        plans::PlanCatalog,
    },
};

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("user ledger not found")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl EntitlementError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EntitlementError::UserNotFound => StatusCode::NOT_FOUND,
            EntitlementError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The credit ledger state machine: balance checks, deductions, top-ups,
/// plan upgrades, and the lazy expiry transition back to the free tier.
///
/// Every operation fetches current state, computes new values, and writes
/// them back without versioning; two overlapping gated actions can both
/// authorize against the same stale balance. The store is last-write-wins.
pub struct EntitlementUseCase<L, A>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    ledger_repo: Arc<L>,
    action_log_repo: Arc<A>,
}

impl<L, A> EntitlementUseCase<L, A>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
{
    pub fn new(ledger_repo: Arc<L>, action_log_repo: Arc<A>) -> Self {
        Self {
            ledger_repo,
            action_log_repo,
        }
    }

    /// Creates the ledger with free-tier defaults on first access. Safe to
    /// call on every login; an existing row is left untouched.
    pub async fn initialize(&self, user_id: Uuid) -> Result<(), EntitlementError> {
        let created = self
            .ledger_repo
            .insert_if_absent(Self::free_tier_defaults(user_id))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to initialize ledger");
                EntitlementError::Store(err)
            })?;

        if created {
            info!(%user_id, "entitlements: ledger created with free-tier defaults");
        } else {
            debug!(%user_id, "entitlements: ledger already present");
        }

        Ok(())
    }

    pub async fn get_ledger(&self, user_id: Uuid) -> Result<CreditLedgerEntity, EntitlementError> {
        self.ledger_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to load ledger");
                EntitlementError::Store(err)
            })?
            .ok_or(EntitlementError::UserNotFound)
    }

    /// Decides whether the user may perform a gated action right now.
    ///
    /// An expired plan is reset to the free tier before the denial is
    /// returned, so the next call evaluates against the fresh free-tier
    /// state. Expiry is only ever detected here; there is no background
    /// sweep and `consume` does not re-check it.
    pub async fn authorize(&self, user_id: Uuid) -> AuthorizeDecision {
        let ledger = match self.ledger_repo.find_by_user_id(user_id).await {
            Ok(Some(ledger)) => ledger,
            Ok(None) => {
                warn!(%user_id, "entitlements: authorize for unknown user");
                return AuthorizeDecision::denied(ReasonCode::UserNotFound);
            }
            Err(err) => {
                error!(%user_id, db_error = ?err, "entitlements: authorize failed to load ledger");
                return AuthorizeDecision::denied(ReasonCode::UpstreamStoreFailure);
            }
        };

        if ledger.plan_expiry < Utc::now() {
            info!(
                %user_id,
                plan_id = %ledger.plan_id,
                plan_expiry = %ledger.plan_expiry,
                "entitlements: plan expired, resetting to free tier"
            );
            self.reset_to_free(user_id).await;
            return AuthorizeDecision::denied(ReasonCode::PlanExpired);
        }

        if ledger.balance <= 0 {
            debug!(%user_id, "entitlements: no credits left");
            return AuthorizeDecision::denied(ReasonCode::InsufficientCredits);
        }

        AuthorizeDecision::allowed()
    }

    /// Deducts `amount` credits. Returns `false` and leaves the ledger
    /// unchanged when the balance does not cover the deduction. Callers
    /// must `authorize` first; this is not a standalone gate.
    pub async fn consume(&self, user_id: Uuid, amount: i64) -> bool {
        let ledger = match self.ledger_repo.find_by_user_id(user_id).await {
            Ok(Some(ledger)) => ledger,
            Ok(None) => {
                warn!(%user_id, "entitlements: consume for unknown user");
                return false;
            }
            Err(err) => {
                error!(%user_id, db_error = ?err, "entitlements: consume failed to load ledger");
                return false;
            }
        };

        if ledger.balance < amount {
            warn!(
                %user_id,
                balance = ledger.balance,
                amount,
                "entitlements: consume rejected, insufficient balance"
            );
            return false;
        }

        if let Err(err) = self
            .ledger_repo
            .patch_usage(
                user_id,
                ledger.balance - amount,
                ledger.total_consumed + amount,
            )
            .await
        {
            error!(%user_id, db_error = ?err, "entitlements: failed to persist deduction");
            return false;
        }

        if let Err(err) = self
            .append_audit(
                user_id,
                ActionPayload::Usage {
                    amount: -amount,
                    description: "chat usage".to_string(),
                },
            )
            .await
        {
            error!(%user_id, db_error = ?err, "entitlements: failed to append usage audit entry");
            return false;
        }

        debug!(
            %user_id,
            balance = ledger.balance - amount,
            "entitlements: credits consumed"
        );
        true
    }

    /// Best-effort top-up. A missing ledger or a failed write is logged and
    /// swallowed; callers should ensure `initialize` ran first.
    pub async fn add_credits(&self, user_id: Uuid, amount: i64, description: &str) {
        let ledger = match self.ledger_repo.find_by_user_id(user_id).await {
            Ok(Some(ledger)) => ledger,
            Ok(None) => {
                warn!(%user_id, "entitlements: skipping credit addition, ledger missing");
                return;
            }
            Err(err) => {
                error!(%user_id, db_error = ?err, "entitlements: add_credits failed to load ledger");
                return;
            }
        };

        if let Err(err) = self
            .ledger_repo
            .patch_balance(user_id, ledger.balance + amount)
            .await
        {
            error!(%user_id, db_error = ?err, "entitlements: failed to persist credit addition");
            return;
        }

        if let Err(err) = self
            .append_audit(
                user_id,
                ActionPayload::Addition {
                    amount,
                    description: description.to_string(),
                },
            )
            .await
        {
            error!(%user_id, db_error = ?err, "entitlements: failed to append addition audit entry");
            return;
        }

        info!(%user_id, amount, "entitlements: credits added");
    }

    /// Moves the user onto `plan_id`, replacing (not topping up) the balance
    /// with the tier's allotment and opening a fresh validity window.
    pub async fn upgrade_plan(&self, user_id: Uuid, plan_id: &str) -> bool {
        let Some(tier) = PlanCatalog::resolve(plan_id) else {
            warn!(%user_id, plan_id, "entitlements: upgrade to unknown plan rejected");
            return false;
        };

        let now = Utc::now();
        let rows = match self
            .ledger_repo
            .patch_plan(
                user_id,
                tier.id.as_str().to_string(),
                tier.credit_allotment,
                now + Duration::days(tier.duration_days),
                now,
            )
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                error!(%user_id, plan_id, db_error = ?err, "entitlements: failed to persist plan upgrade");
                return false;
            }
        };

        if rows == 0 {
            warn!(%user_id, plan_id, "entitlements: upgrade found no ledger to update");
            return false;
        }

        if let Err(err) = self
            .append_audit(
                user_id,
                ActionPayload::PlanUpgrade {
                    amount: tier.credit_allotment,
                    plan_id: tier.id,
                    description: format!("Upgraded to the {} plan", tier.name),
                },
            )
            .await
        {
            error!(%user_id, plan_id, db_error = ?err, "entitlements: failed to append upgrade audit entry");
            return false;
        }

        info!(
            %user_id,
            plan_id = %tier.id,
            balance = tier.credit_allotment,
            "entitlements: plan upgraded"
        );
        true
    }

    /// Unconditionally puts the ledger back on the free tier with a fresh
    /// expiry window. Idempotent; failures are logged and swallowed.
    pub async fn reset_to_free(&self, user_id: Uuid) {
        let free = PlanCatalog::free();
        let now = Utc::now();

        match self
            .ledger_repo
            .patch_plan(
                user_id,
                free.id.as_str().to_string(),
                free.credit_allotment,
                now + Duration::days(free.duration_days),
                now,
            )
            .await
        {
            Ok(0) => warn!(%user_id, "entitlements: reset found no ledger to update"),
            Ok(_) => info!(%user_id, "entitlements: ledger reset to free tier"),
            Err(err) => {
                error!(%user_id, db_error = ?err, "entitlements: failed to reset ledger to free tier");
            }
        }
    }

    fn free_tier_defaults(user_id: Uuid) -> InsertCreditLedgerEntity {
        let free = PlanCatalog::free();
        let now = Utc::now();

        InsertCreditLedgerEntity {
            user_id,
            balance: free.credit_allotment,
            plan_id: free.id.as_str().to_string(),
            plan_expiry: now + Duration::days(free.duration_days),
            total_consumed: 0,
            last_reset: now,
        }
    }

    async fn append_audit(&self, user_id: Uuid, payload: ActionPayload) -> AnyResult<Uuid> {
        let entity = crate::domain::entities::action_logs::InsertActionLogEntity {
            correlation_id: Uuid::new_v4(),
            user_id,
            kind: payload.kind().as_str().to_string(),
            payload: serde_json::to_value(&payload)?,
            referral_code: None,
        };

        self.action_log_repo.append(entity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::credit_ledgers::MockCreditLedgerRepository;
    use crate::domain::value_objects::enums::plan_ids::PlanId;
    use crate::infrastructure::memory::{InMemoryActionLogRepository, InMemoryCreditLedgerRepository};
    use anyhow::anyhow;

    fn engine() -> (
        EntitlementUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository>,
        Arc<InMemoryCreditLedgerRepository>,
        Arc<InMemoryActionLogRepository>,
    ) {
        let ledgers = Arc::new(InMemoryCreditLedgerRepository::default());
        let logs = Arc::new(InMemoryActionLogRepository::default());
        let engine = EntitlementUseCase::new(Arc::clone(&ledgers), Arc::clone(&logs));
        (engine, ledgers, logs)
    }

    async fn fresh_user(
        engine: &EntitlementUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository>,
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        engine.initialize(user_id).await.unwrap();
        user_id
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (engine, _, _) = engine();
        let user_id = fresh_user(&engine).await;

        assert!(engine.consume(user_id, 1).await);
        engine.initialize(user_id).await.unwrap();

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 9);
        assert_eq!(ledger.total_consumed, 1);
    }

    #[tokio::test]
    async fn authorize_unknown_user_is_denied() {
        let (engine, _, _) = engine();

        let decision = engine.authorize(Uuid::new_v4()).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(ReasonCode::UserNotFound));
    }

    #[tokio::test]
    async fn authorize_with_zero_balance_reports_insufficient_credits() {
        let (engine, ledgers, _) = engine();
        let user_id = fresh_user(&engine).await;
        ledgers.patch_balance(user_id, 0).await.unwrap();

        let decision = engine.authorize(user_id).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(ReasonCode::InsufficientCredits));
    }

    #[tokio::test]
    async fn expired_plan_is_reset_and_next_call_sees_fresh_free_tier() {
        let (engine, ledgers, _) = engine();
        let user_id = fresh_user(&engine).await;

        let past = Utc::now() - Duration::days(1);
        ledgers
            .patch_plan(user_id, "pro".to_string(), 500, past, past)
            .await
            .unwrap();

        let decision = engine.authorize(user_id).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(ReasonCode::PlanExpired));

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.plan_id, "free");
        assert_eq!(ledger.balance, 10);
        assert!(ledger.plan_expiry > Utc::now());

        let second = engine.authorize(user_id).await;
        assert!(second.allowed);
    }

    #[tokio::test]
    async fn authorize_surfaces_store_failures() {
        let mut ledgers = MockCreditLedgerRepository::new();
        ledgers
            .expect_find_by_user_id()
            .returning(|_| Box::pin(async { Err(anyhow!("connection refused")) }));

        let engine = EntitlementUseCase::new(
            Arc::new(ledgers),
            Arc::new(InMemoryActionLogRepository::default()),
        );

        let decision = engine.authorize(Uuid::new_v4()).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(ReasonCode::UpstreamStoreFailure));
    }

    #[tokio::test]
    async fn consume_decrements_balance_and_records_usage() {
        let (engine, _, logs) = engine();
        let user_id = fresh_user(&engine).await;

        assert!(engine.consume(user_id, 1).await);

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 9);
        assert_eq!(ledger.total_consumed, 1);

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "usage");
        assert_eq!(entries[0].payload["amount"], -1);
    }

    #[tokio::test]
    async fn consume_never_drives_balance_negative() {
        let (engine, ledgers, logs) = engine();
        let user_id = fresh_user(&engine).await;
        ledgers.patch_balance(user_id, 3).await.unwrap();

        assert!(!engine.consume(user_id, 5).await);

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 3);
        assert_eq!(ledger.total_consumed, 0);
        assert!(logs.entries().is_empty());
    }

    #[tokio::test]
    async fn seven_single_consumes_then_an_oversized_one() {
        let (engine, _, _) = engine();
        let user_id = fresh_user(&engine).await;

        for _ in 0..7 {
            assert!(engine.consume(user_id, 1).await);
        }

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 3);
        assert_eq!(ledger.total_consumed, 7);

        assert!(!engine.consume(user_id, 5).await);
        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 3);
        assert_eq!(ledger.total_consumed, 7);
    }

    #[tokio::test]
    async fn add_credits_tops_up_and_records_addition() {
        let (engine, ledgers, logs) = engine();
        let user_id = fresh_user(&engine).await;
        ledgers.patch_balance(user_id, 3).await.unwrap();

        engine.add_credits(user_id, 20, "bonus").await;

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 23);

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "addition");
        assert_eq!(entries[0].payload["amount"], 20);
        assert_eq!(entries[0].payload["description"], "bonus");
    }

    #[tokio::test]
    async fn add_credits_without_ledger_is_a_logged_no_op() {
        let (engine, _, logs) = engine();

        engine.add_credits(Uuid::new_v4(), 20, "bonus").await;
        assert!(logs.entries().is_empty());
    }

    #[tokio::test]
    async fn upgrade_replaces_balance_with_the_tier_allotment() {
        let (engine, ledgers, logs) = engine();
        let user_id = fresh_user(&engine).await;
        ledgers.patch_balance(user_id, 3).await.unwrap();

        assert!(engine.upgrade_plan(user_id, "pro").await);

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.balance, 500);
        assert_eq!(ledger.plan_id, "pro");
        assert!(ledger.plan_expiry > Utc::now() + Duration::days(29));

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "plan_upgrade");
        assert_eq!(entries[0].payload["plan_id"], PlanId::Pro.as_str());
    }

    #[tokio::test]
    async fn upgrade_to_unknown_plan_fails() {
        let (engine, _, _) = engine();
        let user_id = fresh_user(&engine).await;

        assert!(!engine.upgrade_plan(user_id, "enterprise").await);

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.plan_id, "free");
    }

    #[tokio::test]
    async fn upgrade_without_ledger_fails() {
        let (engine, _, _) = engine();

        assert!(!engine.upgrade_plan(Uuid::new_v4(), "pro").await);
    }

    #[tokio::test]
    async fn reset_to_free_restores_defaults_but_keeps_total_consumed() {
        let (engine, _, _) = engine();
        let user_id = fresh_user(&engine).await;

        assert!(engine.consume(user_id, 4).await);
        assert!(engine.upgrade_plan(user_id, "flash").await);

        engine.reset_to_free(user_id).await;

        let ledger = engine.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.plan_id, "free");
        assert_eq!(ledger.balance, 10);
        assert_eq!(ledger.total_consumed, 4);
    }
}
