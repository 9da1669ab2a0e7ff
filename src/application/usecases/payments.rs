use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::entitlements::EntitlementUseCase;
use crate::domain::{
    repositories::{action_logs::ActionLogRepository, credit_ledgers::CreditLedgerRepository},
    value_objects::{
        enums::payment_methods::PaymentMethod, payments::ChargeOutcome, plans::PlanCatalog,
    },
};

/// Opaque charge authorization against the payment provider. The provider
/// either authorizes the full amount or reports a failure; nothing else
/// about the payment flow is visible here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        user_id: Uuid,
        amount_minor: i32,
        method: PaymentMethod,
    ) -> AnyResult<ChargeOutcome>;
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("the free plan cannot be purchased")]
    FreePlanNotPurchasable,
    #[error("charge declined: {0}")]
    ChargeDeclined(String),
    #[error("charge succeeded but the plan upgrade did not apply")]
    UpgradeFailed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::PlanNotFound => StatusCode::NOT_FOUND,
            PaymentError::FreePlanNotPurchasable => StatusCode::BAD_REQUEST,
            PaymentError::ChargeDeclined(_) => StatusCode::PAYMENT_REQUIRED,
            PaymentError::UpgradeFailed | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub struct PaymentUseCase<L, A, P>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    P: PaymentGateway + 'static,
{
    entitlements: Arc<EntitlementUseCase<L, A>>,
    payment_gateway: Arc<P>,
}

impl<L, A, P> PaymentUseCase<L, A, P>
where
    L: CreditLedgerRepository + Send + Sync + 'static,
    A: ActionLogRepository + Send + Sync + 'static,
    P: PaymentGateway + 'static,
{
    pub fn new(entitlements: Arc<EntitlementUseCase<L, A>>, payment_gateway: Arc<P>) -> Self {
        Self {
            entitlements,
            payment_gateway,
        }
    }

    /// Charges the user for a paid tier and applies the upgrade once the
    /// charge is authorized.
    pub async fn purchase_plan(
        &self,
        user_id: Uuid,
        plan_id: &str,
        method: PaymentMethod,
    ) -> Result<(), PaymentError> {
        let Some(tier) = PlanCatalog::resolve(plan_id) else {
            warn!(%user_id, plan_id, "payments: purchase of unknown plan rejected");
            return Err(PaymentError::PlanNotFound);
        };

        if tier.price_minor == 0 {
            warn!(%user_id, plan_id, "payments: free plan purchase attempted");
            return Err(PaymentError::FreePlanNotPurchasable);
        }

        info!(
            %user_id,
            plan_id = %tier.id,
            amount_minor = tier.price_minor,
            method = %method,
            "payments: authorizing charge"
        );

        let outcome = self
            .payment_gateway
            .charge(user_id, tier.price_minor, method)
            .await
            .map_err(|err| {
                error!(%user_id, plan_id, error = ?err, "payments: charge call failed");
                PaymentError::Internal(err)
            })?;

        if !outcome.success {
            let reason = outcome
                .error
                .unwrap_or_else(|| "charge was declined".to_string());
            warn!(%user_id, plan_id, reason = %reason, "payments: charge declined");
            return Err(PaymentError::ChargeDeclined(reason));
        }

        if !self.entitlements.upgrade_plan(user_id, plan_id).await {
            // The user has paid at this point; this must be loud.
            error!(
                %user_id,
                plan_id,
                "payments: charge authorized but plan upgrade failed"
            );
            return Err(PaymentError::UpgradeFailed);
        }

        info!(%user_id, plan_id = %tier.id, "payments: plan purchased");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{
        InMemoryActionLogRepository, InMemoryCreditLedgerRepository,
    };
    use mockall::predicate::{always, eq};

    fn setup(
        gateway: MockPaymentGateway,
    ) -> (
        PaymentUseCase<
            InMemoryCreditLedgerRepository,
            InMemoryActionLogRepository,
            MockPaymentGateway,
        >,
        Arc<EntitlementUseCase<InMemoryCreditLedgerRepository, InMemoryActionLogRepository>>,
    ) {
        let ledgers = Arc::new(InMemoryCreditLedgerRepository::default());
        let logs = Arc::new(InMemoryActionLogRepository::default());
        let entitlements = Arc::new(EntitlementUseCase::new(ledgers, logs));
        let usecase = PaymentUseCase::new(Arc::clone(&entitlements), Arc::new(gateway));
        (usecase, entitlements)
    }

    #[tokio::test]
    async fn a_successful_charge_applies_the_upgrade() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_charge()
            .with(always(), eq(4500), eq(PaymentMethod::CreditCard))
            .returning(|_, _, _| {
                Ok(ChargeOutcome {
                    success: true,
                    error: None,
                })
            });

        let (usecase, entitlements) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();

        usecase
            .purchase_plan(user_id, "pro", PaymentMethod::CreditCard)
            .await
            .unwrap();

        let ledger = entitlements.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.plan_id, "pro");
        assert_eq!(ledger.balance, 500);
    }

    #[tokio::test]
    async fn a_declined_charge_leaves_the_ledger_untouched() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge().returning(|_, _, _| {
            Ok(ChargeOutcome {
                success: false,
                error: Some("card expired".to_string()),
            })
        });

        let (usecase, entitlements) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();

        let err = usecase
            .purchase_plan(user_id, "flash", PaymentMethod::CreditCard)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ChargeDeclined(reason) if reason == "card expired"));
        let ledger = entitlements.get_ledger(user_id).await.unwrap();
        assert_eq!(ledger.plan_id, "free");
        assert_eq!(ledger.balance, 10);
    }

    #[tokio::test]
    async fn the_free_plan_is_not_purchasable() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge().times(0);

        let (usecase, entitlements) = setup(gateway);
        let user_id = Uuid::new_v4();
        entitlements.initialize(user_id).await.unwrap();

        let err = usecase
            .purchase_plan(user_id, "free", PaymentMethod::Paypal)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::FreePlanNotPurchasable));
    }

    #[tokio::test]
    async fn an_unknown_plan_is_rejected_before_charging() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge().times(0);

        let (usecase, _) = setup(gateway);

        let err = usecase
            .purchase_plan(Uuid::new_v4(), "enterprise", PaymentMethod::CreditCard)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::PlanNotFound));
    }
}
