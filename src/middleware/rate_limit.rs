//! Fixed-window rate limiting for the login and signup paths.
//!
//! The limiters are plain services owned by [`AppState`](crate::state::AppState)
//! and constructed at startup, keyed by originating identity. Going over the
//! threshold yields a fixed 429 message; it is an operational protection, not
//! a correctness gate.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

pub const LOGIN_LIMIT_MESSAGE: &str =
    "Maximum login attempts exceeded, please try again later.";
pub const SIGNUP_LIMIT_MESSAGE: &str =
    "Maximum accounts created, please try again later.";

struct Window {
    started_at: Instant,
    count: u32,
}

/// Counts requests per key within a fixed window; the window resets once
/// its duration has elapsed.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `key`. Returns false once the threshold is
    /// exceeded within the current window.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");

        if windows.len() > 4096 {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started_at) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max
    }
}

/// Originating identity for the limiter key. `X-Forwarded-For` is
/// client-controlled, so it is only honored when a trusted proxy in front
/// rewrites it; otherwise the peer address is used.
fn client_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware gating the two auth paths. Sits outermost so an over-limit
/// request is rejected before the session layer runs.
pub async fn limit_auth_paths(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let (limiter, message) = match req.uri().path() {
        "/auth/login" => (&state.login_limiter, LOGIN_LIMIT_MESSAGE),
        "/auth/signup" => (&state.signup_limiter, SIGNUP_LIMIT_MESSAGE),
        _ => return next.run(req).await,
    };

    let key = client_key(&req, state.config.trust_proxy);
    if !limiter.try_acquire(&key) {
        tracing::warn!(path = %req.uri().path(), %key, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, message).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_threshold() {
        let limiter = RateLimiter::new(3, Duration::from_secs(300));
        let now = Instant::now();
        assert!(limiter.try_acquire_at("1.2.3.4", now));
        assert!(limiter.try_acquire_at("1.2.3.4", now));
        assert!(limiter.try_acquire_at("1.2.3.4", now));
        assert!(!limiter.try_acquire_at("1.2.3.4", now));
        assert!(!limiter.try_acquire_at("1.2.3.4", now));
    }

    #[test]
    fn window_rollover_resets_the_count() {
        let limiter = RateLimiter::new(1, Duration::from_secs(300));
        let start = Instant::now();
        assert!(limiter.try_acquire_at("1.2.3.4", start));
        assert!(!limiter.try_acquire_at("1.2.3.4", start + Duration::from_secs(299)));
        assert!(limiter.try_acquire_at("1.2.3.4", start + Duration::from_secs(300)));
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(300));
        let now = Instant::now();
        assert!(limiter.try_acquire_at("1.2.3.4", now));
        assert!(!limiter.try_acquire_at("1.2.3.4", now));
        assert!(limiter.try_acquire_at("5.6.7.8", now));
    }

    fn forwarded_request() -> Request {
        axum::http::Request::builder()
            .uri("/auth/login")
            .header("x-forwarded-for", "1.2.3.4")
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn forwarded_header_is_ignored_without_a_trusted_proxy() {
        let req = forwarded_request();
        assert_eq!(client_key(&req, false), "unknown");
    }

    #[test]
    fn forwarded_header_is_used_behind_a_trusted_proxy() {
        let req = forwarded_request();
        assert_eq!(client_key(&req, true), "1.2.3.4");
    }

    #[test]
    fn peer_address_wins_without_a_trusted_proxy() {
        let mut req = forwarded_request();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("9.9.9.9:1234".parse().unwrap()));
        assert_eq!(client_key(&req, false), "9.9.9.9");
    }
}
