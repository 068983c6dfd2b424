//! Rye cart proxy library.
//!
//! This crate provides the proxy as a library so the router can be driven
//! in-process by tests and embedded by the integration test harness.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod routes;
pub mod rye;
pub mod session;
pub mod state;

pub use routes::router;
pub use state::AppState;
