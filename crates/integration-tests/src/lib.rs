//! Integration test harness for the Rye cart proxy.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rye-cart-integration-tests
//! ```
//!
//! No network access or Rye credentials are needed: [`MockRye`] stands in for
//! the Rye GraphQL endpoint on an ephemeral local port, and [`TestProxy`]
//! serves the real proxy router against it.
//!
//! # Example
//!
//! ```rust,ignore
//! let rye = MockRye::start().await;
//! let proxy = TestProxy::start(&rye).await;
//!
//! let resp = proxy.post("/api/create-cart", json!({ "productId": "B08CQDF382" })).await;
//! assert_eq!(resp.status(), 200);
//! assert_eq!(rye.requests_for("CreateCart").len(), 1);
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use rye_cart_proxy::{
    AppState,
    config::{ProxyConfig, RyeConfig},
    router,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Cart ID the mock hands out on `CreateCart`; increments per creation.
pub const MOCK_CART_PREFIX: &str = "cart_mock_";

/// Authorization header the harness configures the proxy with.
pub const TEST_AUTH_HEADER: &str = "Basic cnllX3Rlc3Rfa2V5X1g3cVo5bVAy";

/// Shopper IP the harness configures the proxy with.
pub const TEST_SHOPPER_IP: &str = "198.51.100.24";

/// Payment token the harness configures the proxy with.
pub const TEST_PAYMENT_TOKEN: &str = "tok_integration_4242";

// =============================================================================
// Mock Rye
// =============================================================================

/// A GraphQL request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub variables: Value,
    pub authorization: Option<String>,
    pub shopper_ip: Option<String>,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    overrides: Mutex<HashMap<String, (StatusCode, Value)>>,
    carts: Mutex<HashMap<String, Vec<Value>>>,
}

/// Stateful stand-in for the Rye GraphQL API.
///
/// By default it behaves like a well-formed Rye: carts are created and grown
/// in memory, buyer updates quote shipping, and submissions complete. Any
/// operation can be overridden with a fixed status and body.
#[derive(Clone)]
pub struct MockRye {
    endpoint: Url,
    state: Arc<MockState>,
}

impl MockRye {
    /// Start the mock on `127.0.0.1` with an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/v1/query", post(graphql))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: Url::parse(&format!("http://{addr}/v1/query")).unwrap(),
            state,
        }
    }

    /// GraphQL endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Answer every `operation` request with `status` and `body`.
    pub fn respond_with(&self, operation: &str, status: StatusCode, body: Value) {
        self.state
            .overrides
            .lock()
            .unwrap()
            .insert(operation.to_string(), (status, body));
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests received for one operation.
    #[must_use]
    pub fn requests_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }
}

async fn graphql(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    let variables = body["variables"].clone();

    state.requests.lock().unwrap().push(RecordedRequest {
        operation: operation.clone(),
        variables: variables.clone(),
        authorization: header("authorization"),
        shopper_ip: header("rye-shopper-ip"),
    });

    if let Some((status, reply)) = state.overrides.lock().unwrap().get(&operation) {
        return (*status, Json(reply.clone()));
    }

    let reply = match operation.as_str() {
        "CreateCart" => {
            let mut carts = state.carts.lock().unwrap();
            let id = format!("{MOCK_CART_PREFIX}{}", carts.len() + 1);
            let lines = vec![line(&variables)];
            let cart = cart_json(&id, &lines);
            carts.insert(id, lines);
            json!({ "data": { "createCart": { "cart": cart, "errors": [] } } })
        }
        "AddCartItems" => {
            let mut carts = state.carts.lock().unwrap();
            let id = variables["cartId"].as_str().unwrap_or_default().to_string();
            match carts.get_mut(&id) {
                Some(lines) => {
                    lines.push(line(&variables));
                    let cart = cart_json(&id, lines);
                    json!({ "data": { "addCartItems": { "cart": cart, "errors": [] } } })
                }
                None => json!({ "data": { "addCartItems": {
                    "cart": null,
                    "errors": [{ "code": "CART_NOT_FOUND", "message": format!("Cart {id} not found") }]
                } } }),
            }
        }
        "UpdateCartBuyerIdentity" => json!({ "data": { "updateCartBuyerIdentity": {
            "cart": {
                "id": variables["cartId"],
                "cost": {
                    "subtotal": { "displayValue": "$20.00" },
                    "shipping": { "displayValue": "$5.99" },
                    "total": { "displayValue": "$25.99" }
                }
            },
            "errors": []
        } } }),
        "SubmitCart" => json!({ "data": { "submitCart": {
            "cart": {
                "id": variables["cartId"],
                "stores": [{ "store": "amazon", "status": "COMPLETED", "errors": [] }]
            },
            "errors": []
        } } }),
        other => json!({ "errors": [{ "message": format!("Unknown operation {other:?}") }] }),
    };

    (StatusCode::OK, Json(reply))
}

fn line(variables: &Value) -> Value {
    let product_id = &variables["productId"];
    json!({
        "product": { "id": product_id, "title": format!("Product {}", product_id.as_str().unwrap_or("?")) },
        "quantity": variables["quantity"]
    })
}

fn cart_json(id: &str, lines: &[Value]) -> Value {
    let count = i64::try_from(lines.len()).unwrap_or(i64::MAX);
    json!({
        "id": id,
        "cost": { "total": { "displayValue": format!("${}.00", count * 10), "value": count * 1000 } },
        "stores": [{ "cartLines": lines }]
    })
}

// =============================================================================
// Proxy Under Test
// =============================================================================

/// The real proxy router, served locally against a [`MockRye`].
pub struct TestProxy {
    base_url: String,
    client: reqwest::Client,
}

impl TestProxy {
    /// Build the proxy from configuration pointing at `rye` and serve it.
    pub async fn start(rye: &MockRye) -> Self {
        Self::start_with_token(rye, Some(TEST_PAYMENT_TOKEN)).await
    }

    /// Like [`TestProxy::start`], choosing whether a payment token is set.
    pub async fn start_with_token(rye: &MockRye, payment_token: Option<&str>) -> Self {
        let config = ProxyConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            rye: RyeConfig {
                endpoint: rye.endpoint().clone(),
                auth_header: SecretString::from(TEST_AUTH_HEADER),
                shopper_ip: TEST_SHOPPER_IP.to_string(),
            },
            payment_token: payment_token.map(SecretString::from),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::from_config(&config).unwrap();

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    /// POST a JSON body to `path`.
    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// POST a raw body to `path`.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }
}
