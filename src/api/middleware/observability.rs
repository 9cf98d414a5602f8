//! Request logging and HTTP metrics.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};

/// Logs each request on completion and records `http_requests_total` and
/// `http_request_duration_seconds`, labelled by matched route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let uri = request.uri().clone();
    let request_id = header_str(&request, "x-request-id");
    let user_agent = header_str(&request, header::USER_AGENT.as_str());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    let labels = [
        ("method", method.to_string()),
        ("route", route.clone()),
        ("status_code", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        tracing::error!(
            method = %method,
            uri = %uri,
            route = %route,
            status,
            duration_ms = duration.as_millis() as u64,
            request_id = %request_id,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            uri = %uri,
            route = %route,
            status,
            duration_ms = duration.as_millis() as u64,
            request_id = %request_id,
            user_agent = %user_agent,
            "Request completed"
        );
    }

    response
}

fn header_str(request: &Request<Body>, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
