//! Payment token capability used when submitting carts.
//!
//! Submitting a Rye cart requires a payment token from a tokenization
//! provider (Spreedly or Rye Pay). The proxy performs no tokenization itself;
//! it asks an injected [`PaymentTokenSource`] for a token. The only shipped
//! source hands out a statically configured value.

use async_trait::async_trait;
use rye_cart_core::CartId;
use secrecy::SecretString;
use thiserror::Error;

/// Token sent when `RYE_PAYMENT_TOKEN` is not configured.
pub const PLACEHOLDER_PAYMENT_TOKEN: &str = "<YOUR_SPREEDLY_OR_RYE_PAY_TOKEN>";

/// Errors obtaining a payment token.
#[derive(Debug, Error)]
pub enum PaymentTokenError {
    /// The tokenization provider could not issue a token.
    #[error("payment token unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the payment token for a cart submission.
#[async_trait]
pub trait PaymentTokenSource: Send + Sync {
    /// Obtain a token to pay for `cart_id`.
    async fn payment_token(&self, cart_id: &CartId) -> Result<SecretString, PaymentTokenError>;
}

/// Returns the same configured token for every cart.
pub struct StaticPaymentToken {
    token: SecretString,
}

impl StaticPaymentToken {
    /// Use `token`, or the placeholder when none is configured.
    #[must_use]
    pub fn new(token: Option<SecretString>) -> Self {
        let token = token.unwrap_or_else(|| {
            tracing::warn!("RYE_PAYMENT_TOKEN not set, submitting carts with a placeholder token");
            SecretString::from(PLACEHOLDER_PAYMENT_TOKEN)
        });
        Self { token }
    }
}

#[async_trait]
impl PaymentTokenSource for StaticPaymentToken {
    async fn payment_token(&self, _cart_id: &CartId) -> Result<SecretString, PaymentTokenError> {
        Ok(self.token.clone())
    }
}
