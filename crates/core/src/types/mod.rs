//! Core types for the Rye cart proxy.
//!
//! This module provides type-safe wrappers for the concepts the proxy
//! forwards to the remote commerce API, plus the bodies of the proxy's own
//! HTTP API.

pub mod api;
pub mod buyer;
pub mod cart;
pub mod id;

pub use api::{BusinessErrorResponse, CartItemRequest, ErrorResponse};
pub use buyer::{BuyerIdentity, BuyerIdentityPatch, DEFAULT_COUNTRY_CODE};
pub use cart::*;
pub use id::*;
