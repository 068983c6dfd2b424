//! Cart API route handlers.
//!
//! Each handler checks its preconditions locally, forwards one mutation to
//! Rye, and relays the result. The cart session is only written after a
//! fully successful cart creation.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request, State},
};
use rye_cart_core::{
    BuyerIdentity, BuyerIdentityPatch, Cart, CartCostSummary, CartId, CartItemRequest, ProductId,
    SubmitCartResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::rye::{CartItemInput, MutationOutcome};
use crate::state::AppState;

const NO_CART_TO_ADD_TO: &str = "No cart exists yet!";
const NO_CART_FOR_BUYER: &str = "No cart to update buyer for!";
const NO_CART_TO_SUBMIT: &str = "No cart to submit!";

const CREATE_FAILED: &str = "Error creating cart";
const ADD_FAILED: &str = "Error adding items to cart";
const BUYER_FAILED: &str = "Error updating buyer identity";
const SUBMIT_FAILED: &str = "Error submitting cart";

// =============================================================================
// Request Body
// =============================================================================

/// JSON body extractor that treats an empty body as `T::default()`.
///
/// Unlike `axum::Json` it does not insist on a `Content-Type`. Anything but
/// a JSON object is answered with the API's own error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let invalid = || AppError::BadRequest("Invalid JSON body".to_string());
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Self)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate the presence of `productId` and resolve the quantity.
fn cart_item(request: CartItemRequest) -> Result<CartItemInput> {
    let product_id = request
        .product_id
        .and_then(|id| ProductId::parse(id).ok())
        .ok_or_else(|| AppError::BadRequest("productId is required".to_string()))?;

    Ok(CartItemInput::new(product_id, request.quantity))
}

/// Get the active cart or fail with `message`.
async fn active_cart(state: &AppState, message: &'static str) -> Result<CartId> {
    state
        .session()
        .current()
        .await
        .ok_or(AppError::NoActiveCart(message))
}

/// Turn a Rye rejection into a client error.
fn applied<T>(outcome: MutationOutcome<T>) -> Result<T> {
    match outcome {
        MutationOutcome::Applied(value) => Ok(value),
        MutationOutcome::Rejected(errors) => Err(AppError::Business(errors)),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a cart holding one product and make it the active cart.
#[instrument(skip(state))]
pub async fn create_cart(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CartItemRequest>,
) -> Result<Json<Cart>> {
    let item = cart_item(request)?;

    let outcome = state
        .commerce()
        .create_cart(item)
        .await
        .map_err(|e| AppError::upstream(CREATE_FAILED, e))?;
    let cart = applied(outcome)?;

    let replaced = state.session().replace(cart.id.clone()).await;
    tracing::info!(cart_id = %cart.id, replaced = ?replaced, "Cart created");

    Ok(Json(cart))
}

/// Add one product to the active cart.
#[instrument(skip(state))]
pub async fn add_cart_items(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CartItemRequest>,
) -> Result<Json<Cart>> {
    let cart_id = active_cart(&state, NO_CART_TO_ADD_TO).await?;
    let item = cart_item(request)?;

    let outcome = state
        .commerce()
        .add_cart_items(&cart_id, item)
        .await
        .map_err(|e| AppError::upstream(ADD_FAILED, e))?;

    Ok(Json(applied(outcome)?))
}

/// Attach a buyer identity to the active cart, defaulting missing fields.
#[instrument(skip(state, patch))]
pub async fn update_buyer(
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<BuyerIdentityPatch>,
) -> Result<Json<CartCostSummary>> {
    let cart_id = active_cart(&state, NO_CART_FOR_BUYER).await?;
    let buyer = BuyerIdentity::from_patch(patch);

    let outcome = state
        .commerce()
        .update_buyer_identity(&cart_id, buyer)
        .await
        .map_err(|e| AppError::upstream(BUYER_FAILED, e))?;

    Ok(Json(applied(outcome)?))
}

/// Submit the active cart and pass Rye's result through untouched.
///
/// The session keeps the cart afterwards, so submitting again resubmits the
/// same cart.
#[instrument(skip(state))]
pub async fn submit_cart(State(state): State<AppState>) -> Result<Json<SubmitCartResult>> {
    let cart_id = active_cart(&state, NO_CART_TO_SUBMIT).await?;

    let token = state
        .payments()
        .payment_token(&cart_id)
        .await
        .map_err(|source| AppError::Payment {
            message: SUBMIT_FAILED,
            source,
        })?;

    let result = state
        .commerce()
        .submit_cart(&cart_id, &token)
        .await
        .map_err(|e| AppError::upstream(SUBMIT_FAILED, e))?;

    tracing::info!(
        cart_id = %cart_id,
        errors = result.errors.len(),
        "Cart submitted"
    );

    Ok(Json(result))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request as HttpRequest, StatusCode, header::CONTENT_TYPE},
    };
    use rye_cart_core::{BusinessError, CartCost, CartLine, LineProduct, Money, Store};
    use secrecy::{ExposeSecret, SecretString};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::payment::{PaymentTokenError, PaymentTokenSource, StaticPaymentToken};
    use crate::rye::{CommerceApi, RyeError};

    /// A call the fake commerce API received.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(CartItemInput),
        Add(CartId, CartItemInput),
        Buyer(CartId, BuyerIdentity),
        Submit(CartId, String),
    }

    /// Scripted reply for the next call.
    enum Reply {
        Cart(MutationOutcome<Cart>),
        Summary(MutationOutcome<CartCostSummary>),
        Submitted(SubmitCartResult),
        Fail,
    }

    /// Recording fake for `CommerceApi` with a queue of scripted replies.
    #[derive(Default)]
    struct FakeCommerce {
        calls: Mutex<Vec<Call>>,
        replies: Mutex<VecDeque<Reply>>,
    }

    impl FakeCommerce {
        fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::default(),
                replies: Mutex::new(replies.into_iter().collect()),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, call: Call) -> Reply {
            self.calls.lock().unwrap().push(call);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected remote call")
        }
    }

    fn simulated_failure() -> RyeError {
        RyeError::Status {
            status: 503,
            body: "connection reset by upstream".to_string(),
        }
    }

    #[async_trait]
    impl CommerceApi for FakeCommerce {
        async fn create_cart(
            &self,
            item: CartItemInput,
        ) -> std::result::Result<MutationOutcome<Cart>, RyeError> {
            match self.next(Call::Create(item)) {
                Reply::Cart(outcome) => Ok(outcome),
                Reply::Fail => Err(simulated_failure()),
                _ => panic!("wrong reply scripted for create_cart"),
            }
        }

        async fn add_cart_items(
            &self,
            cart_id: &CartId,
            item: CartItemInput,
        ) -> std::result::Result<MutationOutcome<Cart>, RyeError> {
            match self.next(Call::Add(cart_id.clone(), item)) {
                Reply::Cart(outcome) => Ok(outcome),
                Reply::Fail => Err(simulated_failure()),
                _ => panic!("wrong reply scripted for add_cart_items"),
            }
        }

        async fn update_buyer_identity(
            &self,
            cart_id: &CartId,
            buyer: BuyerIdentity,
        ) -> std::result::Result<MutationOutcome<CartCostSummary>, RyeError> {
            match self.next(Call::Buyer(cart_id.clone(), buyer)) {
                Reply::Summary(outcome) => Ok(outcome),
                Reply::Fail => Err(simulated_failure()),
                _ => panic!("wrong reply scripted for update_buyer_identity"),
            }
        }

        async fn submit_cart(
            &self,
            cart_id: &CartId,
            payment_token: &SecretString,
        ) -> std::result::Result<SubmitCartResult, RyeError> {
            let call = Call::Submit(cart_id.clone(), payment_token.expose_secret().to_string());
            match self.next(call) {
                Reply::Submitted(result) => Ok(result),
                Reply::Fail => Err(simulated_failure()),
                _ => panic!("wrong reply scripted for submit_cart"),
            }
        }
    }

    struct NoTokens;

    #[async_trait]
    impl PaymentTokenSource for NoTokens {
        async fn payment_token(
            &self,
            _cart_id: &CartId,
        ) -> std::result::Result<SecretString, PaymentTokenError> {
            Err(PaymentTokenError::Unavailable("tokenizer offline".to_string()))
        }
    }

    fn cart(id: &str, products: &[&str]) -> Cart {
        Cart {
            id: CartId::parse(id).unwrap(),
            cost: CartCost {
                total: Money {
                    display_value: "$20.00".to_string(),
                    value: Some(2000),
                },
            },
            stores: vec![Store {
                cart_lines: Some(
                    products
                        .iter()
                        .map(|p| CartLine {
                            product: LineProduct {
                                id: (*p).to_string(),
                                title: format!("Product {p}"),
                            },
                            quantity: 1,
                        })
                        .collect(),
                ),
            }],
        }
    }

    fn rejected(code: &str) -> Vec<BusinessError> {
        vec![BusinessError {
            code: code.to_string(),
            message: format!("{code} happened"),
        }]
    }

    fn app(commerce: Arc<FakeCommerce>) -> Router {
        let payments = Arc::new(StaticPaymentToken::new(Some(SecretString::from("tok_test"))));
        crate::routes::router(AppState::new(commerce, payments))
    }

    async fn post(app: &Router, path: &str, body: &str) -> (StatusCode, Value) {
        let request = HttpRequest::post(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_operations_without_cart_fail_before_remote_call() {
        let commerce = Arc::new(FakeCommerce::default());
        let app = app(Arc::clone(&commerce));

        for (path, message) in [
            ("/api/add-cart-items", NO_CART_TO_ADD_TO),
            ("/api/update-buyer", NO_CART_FOR_BUYER),
            ("/api/submit-cart", NO_CART_TO_SUBMIT),
        ] {
            let (status, body) = post(&app, path, r#"{"productId":"B00A2KD8NY"}"#).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(body, json!({ "error": message }), "{path}");
        }

        assert!(commerce.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_add_yields_two_lines() {
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Cart(MutationOutcome::Applied(cart(
                "cart_1",
                &["B08CQDF382", "B00A2KD8NY"],
            ))),
        ]);
        let app = app(Arc::clone(&commerce));

        let (status, body) = post(
            &app,
            "/api/create-cart",
            r#"{"productId":"B08CQDF382","quantity":1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "cart_1");
        assert_eq!(body["cost"]["total"], json!({ "displayValue": "$20.00", "value": 2000 }));

        let (status, body) = post(&app, "/api/add-cart-items", r#"{"productId":"B00A2KD8NY"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let lines = body["stores"][0]["cartLines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["product"]["id"], "B00A2KD8NY");

        let cart_id = CartId::parse("cart_1").unwrap();
        assert_eq!(
            commerce.calls()[1],
            Call::Add(
                cart_id,
                CartItemInput::new(ProductId::parse("B00A2KD8NY").unwrap(), None)
            )
        );
    }

    #[tokio::test]
    async fn test_rejected_create_leaves_session_unset() {
        let commerce = FakeCommerce::with_replies([Reply::Cart(MutationOutcome::Rejected(
            rejected("INVALID_PRODUCT"),
        ))]);
        let app = app(Arc::clone(&commerce));

        let (status, body) = post(&app, "/api/create-cart", r#"{"productId":"B000000000"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": [{ "code": "INVALID_PRODUCT", "message": "INVALID_PRODUCT happened" }] })
        );

        let (status, body) = post(&app, "/api/add-cart-items", r#"{"productId":"B00A2KD8NY"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": NO_CART_TO_ADD_TO }));
        assert_eq!(commerce.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_previous_cart() {
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Fail,
            Reply::Submitted(SubmitCartResult::default()),
        ]);
        let app = app(Arc::clone(&commerce));

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, _) = post(&app, "/api/create-cart", r#"{"productId":"B07PWYB6LZ"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        post(&app, "/api/submit-cart", "{}").await;
        assert!(matches!(
            &commerce.calls()[2],
            Call::Submit(id, _) if id.as_str() == "cart_1"
        ));
    }

    #[tokio::test]
    async fn test_create_requires_product_id() {
        let commerce = Arc::new(FakeCommerce::default());
        let app = app(Arc::clone(&commerce));

        for body in ["{}", r#"{"productId":""}"#, ""] {
            let (status, response) = post(&app, "/api/create-cart", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({ "error": "productId is required" }));
        }
        assert!(commerce.calls().is_empty());
    }

    #[tokio::test]
    async fn test_falsy_quantity_defaults_to_one() {
        for quantity in ["0", "false", r#""""#, "null"] {
            let commerce = FakeCommerce::with_replies([Reply::Cart(MutationOutcome::Applied(
                cart("cart_1", &["B08CQDF382"]),
            ))]);
            let app = app(Arc::clone(&commerce));

            let body = format!(r#"{{"productId":"B08CQDF382","quantity":{quantity}}}"#);
            let (status, _) = post(&app, "/api/create-cart", &body).await;
            assert_eq!(status, StatusCode::OK, "{quantity}");

            let Call::Create(item) = &commerce.calls()[0] else {
                panic!("expected create call");
            };
            assert_eq!(item.quantity, 1, "{quantity}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let commerce = Arc::new(FakeCommerce::default());
        let app = app(commerce);

        let (status, body) = post(&app, "/api/create-cart", "{productId:").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid JSON body" }));
    }

    #[tokio::test]
    async fn test_non_object_json_is_bad_request() {
        let commerce = Arc::new(FakeCommerce::default());
        let app = app(Arc::clone(&commerce));

        for body in [r#"["B08CQDF382", 1]"#, r#""B08CQDF382""#, "42"] {
            let (status, reply) = post(&app, "/api/create-cart", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(reply, json!({ "error": "Invalid JSON body" }), "{body}");
        }
        assert!(commerce.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_buyer_body_forwards_defaults() {
        let summary = CartCostSummary {
            id: CartId::parse("cart_1").unwrap(),
            cost: rye_cart_core::CostBreakdown {
                subtotal: Some(Money {
                    display_value: "$20.00".to_string(),
                    value: None,
                }),
                shipping: Some(Money {
                    display_value: "$5.99".to_string(),
                    value: None,
                }),
                total: Some(Money {
                    display_value: "$25.99".to_string(),
                    value: None,
                }),
            },
        };
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Summary(MutationOutcome::Applied(summary)),
        ]);
        let app = app(Arc::clone(&commerce));

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, body) = post(&app, "/api/update-buyer", "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "id": "cart_1", "cost": {
                "subtotal": { "displayValue": "$20.00" },
                "shipping": { "displayValue": "$5.99" },
                "total": { "displayValue": "$25.99" }
            } })
        );
        assert_eq!(
            commerce.calls()[1],
            Call::Buyer(CartId::parse("cart_1").unwrap(), BuyerIdentity::default())
        );
    }

    #[tokio::test]
    async fn test_buyer_business_errors_are_relayed() {
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Summary(MutationOutcome::Rejected(rejected("INVALID_ADDRESS"))),
        ]);
        let app = app(commerce);

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, body) = post(&app, "/api/update-buyer", r#"{"postalCode":"00000"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "INVALID_ADDRESS");
    }

    #[tokio::test]
    async fn test_submit_twice_resubmits_same_cart() {
        let result: SubmitCartResult = serde_json::from_value(json!({
            "cart": { "id": "cart_1", "stores": [{ "store": "amazon", "status": "COMPLETED" }] },
            "errors": []
        }))
        .unwrap();
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Submitted(result.clone()),
            Reply::Submitted(result),
        ]);
        let app = app(Arc::clone(&commerce));

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, first) = post(&app, "/api/submit-cart", "{}").await;
        let (_, second) = post(&app, "/api/submit-cart", "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(first["cart"]["stores"][0]["status"], "COMPLETED");
        assert_eq!(first["errors"], json!([]));

        let calls = commerce.calls();
        let expected = Call::Submit(CartId::parse("cart_1").unwrap(), "tok_test".to_string());
        assert_eq!(calls[1], expected);
        assert_eq!(calls[2], expected);
    }

    #[tokio::test]
    async fn test_submit_passes_business_errors_through_with_ok() {
        let result = SubmitCartResult {
            cart: None,
            errors: rejected("CART_EXPIRED"),
        };
        let commerce = FakeCommerce::with_replies([
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Submitted(result),
        ]);
        let app = app(commerce);

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, body) = post(&app, "/api/submit-cart", "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cart"], Value::Null);
        assert_eq!(body["errors"][0]["code"], "CART_EXPIRED");
    }

    #[tokio::test]
    async fn test_remote_failure_is_opaque_500() {
        let commerce = FakeCommerce::with_replies([
            Reply::Fail,
            Reply::Cart(MutationOutcome::Applied(cart("cart_1", &["B08CQDF382"]))),
            Reply::Fail,
            Reply::Fail,
            Reply::Fail,
        ]);
        let app = app(commerce);

        let (status, body) = post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": CREATE_FAILED }));

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;

        for (path, message) in [
            ("/api/add-cart-items", ADD_FAILED),
            ("/api/update-buyer", BUYER_FAILED),
            ("/api/submit-cart", SUBMIT_FAILED),
        ] {
            let (status, body) = post(&app, path, r#"{"productId":"B00A2KD8NY"}"#).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
            assert_eq!(body, json!({ "error": message }), "{path}");
            assert!(!body.to_string().contains("connection reset"));
        }
    }

    #[tokio::test]
    async fn test_payment_token_failure_skips_submit() {
        let commerce = FakeCommerce::with_replies([Reply::Cart(MutationOutcome::Applied(cart(
            "cart_1",
            &["B08CQDF382"],
        )))]);
        let state = AppState::new(Arc::clone(&commerce) as Arc<dyn CommerceApi>, Arc::new(NoTokens));
        let app = crate::routes::router(state);

        post(&app, "/api/create-cart", r#"{"productId":"B08CQDF382"}"#).await;
        let (status, body) = post(&app, "/api/submit-cart", "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": SUBMIT_FAILED }));
        assert_eq!(commerce.calls().len(), 1);
    }
}
