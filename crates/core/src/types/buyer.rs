//! Buyer identity attached to a cart before checkout.

use serde::{Deserialize, Serialize};

/// Country every buyer identity is sent with.
pub const DEFAULT_COUNTRY_CODE: &str = "US";

/// Caller-supplied buyer details. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerIdentityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Fully-populated buyer identity, serialized as Rye's `BuyerIdentityInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    pub province_code: String,
    pub country_code: String,
    pub postal_code: String,
}

impl BuyerIdentity {
    /// Build a buyer identity, filling absent or empty fields with the demo
    /// buyer (Jane Doe, 1460 Broadway, New York City).
    ///
    /// The country is always [`DEFAULT_COUNTRY_CODE`].
    #[must_use]
    pub fn from_patch(patch: BuyerIdentityPatch) -> Self {
        Self {
            first_name: or_default(patch.first_name, "Jane"),
            last_name: or_default(patch.last_name, "Doe"),
            email: or_default(patch.email, "jane@example.com"),
            address1: or_default(patch.address1, "1460 Broadway"),
            city: or_default(patch.city, "New York City"),
            province_code: or_default(patch.province_code, "NY"),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            postal_code: or_default(patch.postal_code, "10036"),
        }
    }
}

impl Default for BuyerIdentity {
    fn default() -> Self {
        Self::from_patch(BuyerIdentityPatch::default())
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
