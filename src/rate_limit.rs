//! Process-wide fixed-window rate limiting keyed by client IP.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::{auth::dto::ErrorResponse, config::RateLimitConfig};

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_in: Duration,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Inner {
    windows: HashMap<String, Window>,
    last_cleanup: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    inner: Mutex<Inner>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            inner: Mutex::new(Inner {
                windows: HashMap::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.max_requests, cfg.window())
    }

    /// Counts one request for `key` and reports whether it fits in the current window.
    pub async fn check(&self, key: &str) -> Decision {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        if now.duration_since(inner.last_cleanup) >= self.window {
            let window = self.window;
            inner
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            inner.last_cleanup = now;
        }

        let entry = inner
            .windows
            .entry(key.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        let reset_in = self.window.saturating_sub(now.duration_since(entry.started));
        if entry.count >= self.max_requests {
            return Decision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_in,
            };
        }

        entry.count += 1;
        Decision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_in,
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.inner.lock().await.windows.len()
    }
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    let decision = limiter.check(&key).await;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        warn!(client = %key, "rate limit exceeded");
        let mut res = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(
                "Too many requests, please try again later.",
            )),
        )
            .into_response();
        let retry_after = decision.reset_in.as_secs_f64().ceil() as u64;
        res.headers_mut()
            .insert(axum::http::header::RETRY_AFTER, HeaderValue::from(retry_after));
        res
    };

    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for expected_remaining in [2, 1, 0] {
            let d = limiter.check("10.0.0.1").await;
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }
        let blocked = limiter.check("10.0.0.1").await;
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert!(blocked.reset_in <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn keys_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("10.0.0.1").await.allowed);
        assert!(!limiter.check("10.0.0.1").await.allowed);
        assert!(limiter.check("10.0.0.2").await.allowed);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.check("10.0.0.1").await.allowed);
        assert!(!limiter.check("10.0.0.1").await.allowed);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("10.0.0.1").await.allowed);
    }

    #[tokio::test]
    async fn expired_windows_are_purged() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));
        limiter.check("10.0.0.1").await;
        limiter.check("10.0.0.2").await;
        assert_eq!(limiter.tracked_keys().await, 2);
        tokio::time::sleep(Duration::from_millis(80)).await;
        limiter.check("10.0.0.3").await;
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
