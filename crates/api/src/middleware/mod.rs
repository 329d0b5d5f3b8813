//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting (governor), when enabled
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer, so
//! public and protected handlers can share a router.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAuth;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter, json_rate_limit_response};
pub use request_id::request_id_middleware;
