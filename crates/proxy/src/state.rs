//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::payment::{PaymentTokenSource, StaticPaymentToken};
use crate::rye::{CommerceApi, RyeClient, RyeError};
use crate::session::CartSession;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the remote
/// commerce API, the payment token source, and the single cart session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    commerce: Arc<dyn CommerceApi>,
    payments: Arc<dyn PaymentTokenSource>,
    session: CartSession,
}

impl AppState {
    /// Create application state from explicit collaborators.
    ///
    /// The cart session starts empty.
    #[must_use]
    pub fn new(commerce: Arc<dyn CommerceApi>, payments: Arc<dyn PaymentTokenSource>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                commerce,
                payments,
                session: CartSession::new(),
            }),
        }
    }

    /// Create application state wired to Rye as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the Rye client cannot be built from `config`.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, RyeError> {
        let commerce = RyeClient::new(&config.rye)?;
        let payments = StaticPaymentToken::new(config.payment_token.clone());
        Ok(Self::new(Arc::new(commerce), Arc::new(payments)))
    }

    /// Get the remote commerce API.
    #[must_use]
    pub fn commerce(&self) -> &dyn CommerceApi {
        self.inner.commerce.as_ref()
    }

    /// Get the payment token source.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentTokenSource {
        self.inner.payments.as_ref()
    }

    /// Get the cart session.
    #[must_use]
    pub fn session(&self) -> &CartSession {
        &self.inner.session
    }
}
