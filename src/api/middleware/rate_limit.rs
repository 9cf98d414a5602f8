//! Per-client sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use crate::api::AppState;
use crate::config::{Config, RATE_LIMIT_CLEANUP_INTERVAL_SECONDS};
use crate::errors::AppError;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Seconds until the oldest request in the window expires
    pub reset_in_seconds: u64,
}

#[derive(Debug)]
struct Windows {
    requests: HashMap<String, VecDeque<Instant>>,
    last_cleanup: Instant,
}

/// Sliding-window limiter keyed by client identifier.
///
/// Each client keeps the timestamps of its accepted requests inside the
/// window; a request is accepted while fewer than `limit` remain.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<Windows>>,
    limit: u64,
    window: Duration,
    cleanup_interval: Duration,
}

impl RateLimiter {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(Windows {
                requests: HashMap::new(),
                last_cleanup: Instant::now(),
            })),
            limit,
            window,
            cleanup_interval: Duration::from_secs(RATE_LIMIT_CLEANUP_INTERVAL_SECONDS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_seconds),
        )
    }

    /// Check the client's window and record the request if accepted.
    pub async fn check_and_record(&self, client: &str) -> RateLimitDecision {
        self.check_and_record_at(client, Instant::now()).await
    }

    async fn check_and_record_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().await;

        if now.duration_since(windows.last_cleanup) >= self.cleanup_interval {
            let window = self.window;
            windows
                .requests
                .retain(|_, times| times.back().is_some_and(|t| now.duration_since(*t) < window));
            windows.last_cleanup = now;
        }

        let times = windows.requests.entry(client.to_string()).or_default();
        while times
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            times.pop_front();
        }

        let allowed = (times.len() as u64) < self.limit;
        if allowed {
            times.push_back(now);
        }

        let reset_in_seconds = times
            .front()
            .map(|oldest| {
                self.window
                    .saturating_sub(now.duration_since(*oldest))
                    .as_secs()
            })
            .unwrap_or(self.window.as_secs());

        RateLimitDecision {
            allowed,
            limit: self.limit,
            remaining: self.limit.saturating_sub(times.len() as u64),
            reset_in_seconds,
        }
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.requests.len()
    }
}

/// Rate limit middleware for user endpoints.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = get_client_ip(&request, connect_info);
    let decision = state.rate_limiter.check_and_record(&client).await;

    if !decision.allowed {
        let endpoint = request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        metrics::counter!("rate_limit_hits_total", "endpoint" => endpoint).increment(1);
        tracing::warn!(client = %client, "Rate limit exceeded");

        let mut response = AppError::TooManyRequests.into_response();
        let headers = response.headers_mut();
        insert_limit_headers(headers, &decision);
        headers.insert("Retry-After", HeaderValue::from(decision.reset_in_seconds));
        return response;
    }

    let mut response = next.run(request).await;
    insert_limit_headers(response.headers_mut(), &decision);
    response
}

fn insert_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(decision.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));

    let reset_at = Utc::now() + chrono::Duration::seconds(decision.reset_in_seconds as i64);
    if let Ok(value) = HeaderValue::from_str(&reset_at.to_rfc3339_opts(SecondsFormat::Secs, true))
    {
        headers.insert("X-RateLimit-Reset", value);
    }
}

fn get_client_ip(request: &Request<Body>, connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    // Try X-Forwarded-For header first
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
