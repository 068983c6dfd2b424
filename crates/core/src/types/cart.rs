//! Cart representations exchanged with Rye and returned by the proxy API.
//!
//! Field names are camelCase on the wire, matching both the Rye GraphQL
//! selection sets and the JSON the proxy hands back to its callers.

use serde::{Deserialize, Serialize};

use super::id::CartId;

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount as reported by Rye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Human-readable amount (e.g., "$12.99").
    pub display_value: String,
    /// Amount in the currency's minor unit. Only selected for cart totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// Cost block of a cart after create or add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    pub total: Money,
}

/// Cost breakdown of a cart after the buyer identity is set.
///
/// Rye leaves `shipping` null until it can quote the address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub subtotal: Option<Money>,
    pub shipping: Option<Money>,
    pub total: Option<Money>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product referenced by a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProduct {
    pub id: String,
    pub title: String,
}

/// A single line item in a store's section of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: LineProduct,
    pub quantity: i64,
}

/// A store grouping within a cart.
///
/// Only Amazon stores select their lines; other store kinds come back as an
/// empty object and keep `cart_lines` unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_lines: Option<Vec<CartLine>>,
}

/// Cart returned by the create and add operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub cost: CartCost,
    #[serde(default)]
    pub stores: Vec<Store>,
}

impl Cart {
    /// Iterate over every line across all stores.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.stores
            .iter()
            .filter_map(|s| s.cart_lines.as_deref())
            .flatten()
    }
}

/// Cart returned by the buyer identity update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCostSummary {
    pub id: CartId,
    pub cost: CostBreakdown,
}

// =============================================================================
// Errors & Submission
// =============================================================================

/// Application-level error reported inside a successful Rye response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessError {
    pub code: String,
    pub message: String,
}

/// Per-store outcome of a submission. Passed through uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<BusinessError>>,
}

/// Cart as returned by the submit mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedCart {
    pub id: CartId,
    #[serde(default)]
    pub stores: Vec<SubmittedStore>,
}

/// Raw result of the submit mutation: top-level errors plus the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCartResult {
    pub cart: Option<SubmittedCart>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<BusinessError>,
}

/// Deserialize a nullable list, mapping `null` to an empty `Vec`.
///
/// # Errors
///
/// Propagates the deserializer's error for anything other than a list or null.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
