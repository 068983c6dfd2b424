//! Rye Cart Core - Shared types library.
//!
//! This crate provides the types shared by every Rye cart proxy component:
//! - `proxy` - HTTP backend that forwards cart operations to Rye
//! - `cli` - Command-line caller of the proxy API
//! - `integration-tests` - End-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The JSON
//! shapes defined here are the wire format of the proxy API, so both the
//! server and its callers deserialize into the same structs.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, buyer identity, and cart representations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
