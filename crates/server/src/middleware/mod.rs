//! HTTP middleware for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, HTTP transactions)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting (governor), per route group
//!
//! Authentication is not a layer: handlers take [`RequireUser`],
//! [`RequireBaker`] or [`RequireAdmin`] as extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CurrentUser, RequireAdmin, RequireBaker, RequireUser};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
