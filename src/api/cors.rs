//! CORS configuration.

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{Config, CORS_MAX_AGE_SECONDS};

/// Build the CORS layer from the configured origins.
///
/// `*` allows any origin; credentials are then disabled, since browsers
/// reject credentialed wildcard responses.
pub fn create_cors_layer(config: &Config) -> CorsLayer {
    let wildcard = config.cors_origins.iter().any(|o| o == "*");

    let (origin, credentials) = if wildcard {
        if config.cors_credentials {
            tracing::warn!("CORS_CREDENTIALS ignored for wildcard origin");
        }
        (AllowOrigin::any(), false)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Skipping invalid CORS origin");
                    None
                }
            })
            .collect();
        (AllowOrigin::list(origins), config.cors_credentials)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-api-version"),
        ])
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECONDS))
}
