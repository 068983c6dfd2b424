//! Request and error bodies of the proxy HTTP API.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use super::cart::BusinessError;

/// Body of `POST /api/create-cart` and `POST /api/add-cart-items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "falsy_as_none"
    )]
    pub quantity: Option<i64>,
}

/// Deserialize an optional integer, reading falsy JSON (`null`, `false`,
/// `""`, `0`) as absent.
///
/// # Errors
///
/// Fails for any other non-integer value.
pub fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(None),
            Some(q) => Ok(Some(q)),
            None => Err(D::Error::custom(format!("quantity must be an integer, got {n}"))),
        },
        other => Err(D::Error::custom(format!("invalid quantity: {other}"))),
    }
}

/// `{"error": "..."}` - precondition, validation and upstream failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{"errors": [...]}` - business errors relayed from Rye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessErrorResponse {
    pub errors: Vec<BusinessError>,
}
