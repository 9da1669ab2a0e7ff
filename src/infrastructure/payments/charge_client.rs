use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::application::usecases::payments::PaymentGateway;
use crate::domain::value_objects::{enums::payment_methods::PaymentMethod, payments::ChargeOutcome};

/// Client for the payment provider's charge-authorization endpoint. The
/// provider is a black box: one call, one success-or-declined answer.
pub struct ChargeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Serialize)]
struct ChargeRequest {
    user_id: Uuid,
    amount_minor: i32,
    method: PaymentMethod,
}

impl ChargeClient {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            secret_key,
        }
    }

    pub async fn authorize_charge(
        &self,
        user_id: Uuid,
        amount_minor: i32,
        method: PaymentMethod,
    ) -> Result<ChargeOutcome> {
        let url = format!("{}/v1/charges", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .json(&ChargeRequest {
                user_id,
                amount_minor,
                method,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = %status,
                response_body = %body,
                "payment provider charge request failed"
            );
            anyhow::bail!("charge authorization failed with status {}", status);
        }

        let outcome: ChargeOutcome = resp.json().await?;
        Ok(outcome)
    }
}

#[async_trait]
impl PaymentGateway for ChargeClient {
    async fn charge(
        &self,
        user_id: Uuid,
        amount_minor: i32,
        method: PaymentMethod,
    ) -> Result<ChargeOutcome> {
        self.authorize_charge(user_id, amount_minor, method).await
    }
}
