//! Newtype IDs for type-safe references to remote entities.
//!
//! Rye identifies carts and products with opaque strings. Use the
//! `define_id!` macro to create wrappers that prevent accidentally passing a
//! product ID where a cart ID is expected.

use thiserror::Error;

/// Error returned when parsing an identifier from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} cannot be empty")]
pub struct EmptyIdError {
    /// Name of the identifier type that failed to parse.
    pub kind: &'static str,
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` that rejects empty input, `as_str()`, `into_inner()`
/// - `Display` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use rye_cart_core::define_id;
/// define_id!(OrderId);
/// define_id!(StoreId);
///
/// let order_id = OrderId::parse("order_1").unwrap();
/// assert_eq!(order_id.as_str(), "order_1");
/// assert!(StoreId::parse("").is_err());
///
/// // These are different types, so this won't compile:
/// // let _: StoreId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, rejecting the empty string.
            ///
            /// # Errors
            ///
            /// Returns [`EmptyIdError`](crate::EmptyIdError) if `id` is empty.
            pub fn parse(id: impl Into<String>) -> Result<Self, $crate::EmptyIdError> {
                let id = id.into();
                if id.is_empty() {
                    return Err($crate::EmptyIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(id))
            }

            /// Get the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(CartId);
define_id!(ProductId);

/// Resolve a caller-supplied quantity.
///
/// Absent and zero quantities fall back to 1. Every other value, including
/// negative ones, is forwarded unchanged for the remote API to judge.
#[must_use]
pub fn resolve_quantity(quantity: Option<i64>) -> i64 {
    match quantity {
        None | Some(0) => 1,
        Some(n) => n,
    }
}
