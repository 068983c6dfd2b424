//! Single-slot cart session.
//!
//! The proxy tracks exactly one "current" cart for the whole process. The
//! slot starts empty, is overwritten by every successful cart creation, is
//! read by the add, buyer-update and submit operations, and is never cleared.
//! Concurrent creations race: whichever completes last wins.

use rye_cart_core::CartId;
use tokio::sync::RwLock;

/// Holds the identifier of the active cart, if any.
#[derive(Debug, Default)]
pub struct CartSession {
    current: RwLock<Option<CartId>>,
}

impl CartSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active cart, if one has been created.
    pub async fn current(&self) -> Option<CartId> {
        self.current.read().await.clone()
    }

    /// Make `cart_id` the active cart, returning the one it replaces.
    pub async fn replace(&self, cart_id: CartId) -> Option<CartId> {
        self.current.write().await.replace(cart_id)
    }
}
