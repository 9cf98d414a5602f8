//! API middleware.

mod observability;
mod rate_limit;
mod security_headers;

pub use observability::track_requests;
pub use rate_limit::{rate_limit_middleware, RateLimitDecision, RateLimiter};
pub use security_headers::security_headers;
