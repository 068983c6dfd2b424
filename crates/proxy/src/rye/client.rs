//! Rye GraphQL API client implementation.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP. Nothing is
//! cached: every call is a cart mutation.

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::{GraphQLQuery, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rye_cart_core::{BuyerIdentity, Cart, CartCostSummary, CartId, SubmitCartResult};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::queries::{
    AddCartItems, CreateCart, SubmitCart, UpdateCartBuyerIdentity, add_cart_items, create_cart,
    submit_cart, update_cart_buyer_identity,
};
use super::{CartItemInput, CommerceApi, GraphQLError, MutationOutcome, RyeError};
use crate::config::RyeConfig;

/// Header carrying the shopper's IP address on every Rye request.
pub const SHOPPER_IP_HEADER: &str = "Rye-Shopper-IP";

/// Maximum number of response body characters kept for logs and errors.
const BODY_EXCERPT_CHARS: usize = 500;

// =============================================================================
// RyeClient
// =============================================================================

/// Client for the Rye commerce GraphQL API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct RyeClient {
    inner: Arc<RyeClientInner>,
}

struct RyeClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl RyeClient {
    /// Create a new Rye API client.
    ///
    /// The authorization and shopper-IP headers are installed as default
    /// headers, so every request carries them.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header value is not valid HTTP or the
    /// HTTP client fails to build.
    pub fn new(config: &RyeConfig) -> Result<Self, RyeError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(config.auth_header.expose_secret())
            .map_err(|_| RyeError::InvalidHeader("Authorization"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        headers.insert(
            SHOPPER_IP_HEADER,
            HeaderValue::from_str(&config.shopper_ip)
                .map_err(|_| RyeError::InvalidHeader(SHOPPER_IP_HEADER))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(RyeClientInner {
                client,
                endpoint: config.endpoint.clone(),
            }),
        })
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, RyeError> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation,
                status = %status,
                body = %excerpt(&response_text),
                "Rye API returned non-success status"
            );
            return Err(RyeError::Status {
                status: status.as_u16(),
                body: excerpt(&response_text),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %excerpt(&response_text),
                    "Failed to parse Rye GraphQL response"
                );
                return Err(RyeError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation, errors = ?errors, "GraphQL errors in response");

            return Err(RyeError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => s,
                                    graphql_client::PathFragment::Index(i) => i.to_string(),
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %excerpt(&response_text),
                "Rye GraphQL response has no data and no errors"
            );
            RyeError::MissingData(operation)
        })
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[async_trait]
impl CommerceApi for RyeClient {
    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    async fn create_cart(&self, item: CartItemInput) -> Result<MutationOutcome<Cart>, RyeError> {
        let variables = create_cart::Variables {
            product_id: item.product_id.into_inner(),
            quantity: item.quantity,
        };

        self.execute::<CreateCart>(variables)
            .await?
            .create_cart
            .ok_or(RyeError::MissingData("createCart"))?
            .into_outcome("createCart")
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, product_id = %item.product_id))]
    async fn add_cart_items(
        &self,
        cart_id: &CartId,
        item: CartItemInput,
    ) -> Result<MutationOutcome<Cart>, RyeError> {
        let variables = add_cart_items::Variables {
            cart_id: cart_id.as_str().to_string(),
            product_id: item.product_id.into_inner(),
            quantity: item.quantity,
        };

        self.execute::<AddCartItems>(variables)
            .await?
            .add_cart_items
            .ok_or(RyeError::MissingData("addCartItems"))?
            .into_outcome("addCartItems")
    }

    #[instrument(skip(self, buyer), fields(cart_id = %cart_id))]
    async fn update_buyer_identity(
        &self,
        cart_id: &CartId,
        buyer: BuyerIdentity,
    ) -> Result<MutationOutcome<CartCostSummary>, RyeError> {
        let variables = update_cart_buyer_identity::Variables {
            cart_id: cart_id.as_str().to_string(),
            buyer,
        };

        self.execute::<UpdateCartBuyerIdentity>(variables)
            .await?
            .update_cart_buyer_identity
            .ok_or(RyeError::MissingData("updateCartBuyerIdentity"))?
            .into_outcome("updateCartBuyerIdentity")
    }

    #[instrument(skip(self, payment_token), fields(cart_id = %cart_id))]
    async fn submit_cart(
        &self,
        cart_id: &CartId,
        payment_token: &SecretString,
    ) -> Result<SubmitCartResult, RyeError> {
        let variables = submit_cart::Variables {
            cart_id: cart_id.as_str().to_string(),
            token: payment_token.expose_secret().to_string(),
        };

        self.execute::<SubmitCart>(variables)
            .await?
            .submit_cart
            .ok_or(RyeError::MissingData("submitCart"))
    }
}
