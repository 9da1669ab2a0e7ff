use serde::Deserialize;

/// Result of an opaque charge-authorization call against the payment
/// provider. The provider either authorizes the amount or reports why not.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeOutcome {
    pub success: bool,
    pub error: Option<String>,
}
