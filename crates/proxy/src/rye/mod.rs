//! Rye commerce GraphQL API client.
//!
//! # Architecture
//!
//! - [`CommerceApi`] is the port the HTTP layer depends on; handlers never
//!   see GraphQL shapes
//! - [`RyeClient`] implements it with `reqwest` and `graphql_client`
//!   envelopes, one hand-written [`GraphQLQuery`](graphql_client::GraphQLQuery)
//!   per mutation
//! - Every mutation payload is `{cart, errors}`; it is decoded into a
//!   [`MutationOutcome`] so business errors are a value, not an `Err`
//!
//! # Error tiers
//!
//! - Business errors (`errors` inside a successful payload) become
//!   [`MutationOutcome::Rejected`]
//! - Everything else - network, non-2xx, malformed JSON, top-level GraphQL
//!   errors, missing data - is a [`RyeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use rye_cart_proxy::rye::{CartItemInput, CommerceApi, RyeClient};
//!
//! let client = RyeClient::new(&config.rye)?;
//! let item = CartItemInput::new(ProductId::parse("B08CQDF382")?, None);
//! match client.create_cart(item).await? {
//!     MutationOutcome::Applied(cart) => println!("{}", cart.id),
//!     MutationOutcome::Rejected(errors) => println!("{errors:?}"),
//! }
//! ```

mod client;
pub mod queries;

pub use client::RyeClient;

use async_trait::async_trait;
use rye_cart_core::{
    BusinessError, BuyerIdentity, Cart, CartCostSummary, CartId, ProductId, SubmitCartResult,
    resolve_quantity,
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Transport-tier failures talking to Rye.
#[derive(Debug, Error)]
pub enum RyeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rye answered with a non-success status.
    #[error("Rye returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// GraphQL query returned top-level errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// Response carried neither data nor errors, or a null mutation field.
    #[error("No data in {0} response")]
    MissingData(&'static str),

    /// Mutation succeeded without errors but returned no cart.
    #[error("{0} returned no cart and no errors")]
    MissingCart(&'static str),

    /// Configured header value cannot be sent over HTTP.
    #[error("Invalid header {0}")]
    InvalidHeader(&'static str),
}

/// A GraphQL error returned at the top level of a Rye response.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<String>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                format!("{} (path: {})", e.message, e.path.join("."))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a cart mutation that reached Rye and was understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// Rye applied the mutation.
    Applied(T),
    /// Rye refused the mutation with one or more business errors.
    Rejected(Vec<BusinessError>),
}

/// The `{cart, errors}` payload every Rye cart mutation returns.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationPayload<T> {
    pub cart: Option<T>,
    #[serde(default, deserialize_with = "rye_cart_core::null_as_empty")]
    pub errors: Vec<BusinessError>,
}

impl<T> MutationPayload<T> {
    /// Decode the payload of `operation`.
    ///
    /// Business errors take precedence over a cart that may accompany them.
    ///
    /// # Errors
    ///
    /// Returns [`RyeError::MissingCart`] if there are neither errors nor a cart.
    pub fn into_outcome(self, operation: &'static str) -> Result<MutationOutcome<T>, RyeError> {
        if !self.errors.is_empty() {
            return Ok(MutationOutcome::Rejected(self.errors));
        }
        self.cart
            .map(MutationOutcome::Applied)
            .ok_or(RyeError::MissingCart(operation))
    }
}

// =============================================================================
// Port
// =============================================================================

/// One line item to put in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartItemInput {
    /// Build an item, resolving an absent or zero quantity to 1.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Option<i64>) -> Self {
        Self {
            product_id,
            quantity: resolve_quantity(quantity),
        }
    }
}

/// Remote commerce operations the proxy forwards to.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Create a cart holding a single line item.
    async fn create_cart(&self, item: CartItemInput) -> Result<MutationOutcome<Cart>, RyeError>;

    /// Append a line item to an existing cart.
    async fn add_cart_items(
        &self,
        cart_id: &CartId,
        item: CartItemInput,
    ) -> Result<MutationOutcome<Cart>, RyeError>;

    /// Attach or replace the buyer identity and shipping address.
    async fn update_buyer_identity(
        &self,
        cart_id: &CartId,
        buyer: BuyerIdentity,
    ) -> Result<MutationOutcome<CartCostSummary>, RyeError>;

    /// Submit the cart for checkout. The result is passed through as-is.
    async fn submit_cart(
        &self,
        cart_id: &CartId,
        payment_token: &SecretString,
    ) -> Result<SubmitCartResult, RyeError>;
}
