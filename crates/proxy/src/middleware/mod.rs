//! HTTP middleware for the proxy.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (any origin, for the separately hosted demo frontend)
//! 3. `TraceLayer` (`http_request` span per request)
//! 4. Request ID (recorded into that span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
