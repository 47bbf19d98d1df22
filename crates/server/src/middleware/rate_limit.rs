//! Fixed-window, in-memory rate limiting.
//!
//! Each (client, preset) pair gets a counter that resets when its window
//! elapses. Counters live in a shared map and a background sweeper evicts
//! expired entries so the map does not grow without bound. Limits apply
//! per process; a multi-instance deployment rate-limits per instance.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// How often the background sweeper evicts expired windows.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// A named request budget over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPreset {
    /// Key prefix, so each preset counts independently.
    pub name: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

/// Login, registration, and other credential endpoints.
pub const AUTH: RateLimitPreset = RateLimitPreset {
    name: "auth",
    max_requests: 5,
    window: Duration::from_secs(60),
};

/// Mutating endpoints with expensive side effects (checkout, payments).
pub const STRICT: RateLimitPreset = RateLimitPreset {
    name: "strict",
    max_requests: 10,
    window: Duration::from_secs(60),
};

/// Ordinary authenticated API traffic.
pub const STANDARD: RateLimitPreset = RateLimitPreset {
    name: "standard",
    max_requests: 30,
    window: Duration::from_secs(60),
};

/// Public read-only endpoints.
pub const GENEROUS: RateLimitPreset = RateLimitPreset {
    name: "generous",
    max_requests: 100,
    window: Duration::from_secs(60),
};

#[derive(Debug)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// The outcome of a rate-limit check, used to build response headers.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window resets.
    pub reset_after_secs: u64,
}

/// Shared fixed-window counters.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a request against the client's window for this preset.
    #[must_use]
    pub fn check(&self, preset: RateLimitPreset, client_id: &str) -> RateLimitDecision {
        self.check_at(preset, client_id, Instant::now())
    }

    fn check_at(
        &self,
        preset: RateLimitPreset,
        client_id: &str,
        now: Instant,
    ) -> RateLimitDecision {
        let key = format!("{}:{client_id}", preset.name);

        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic mid-update; the counters are
            // still structurally sound, so keep serving.
            Err(poisoned) => poisoned.into_inner(),
        };

        let window = windows.entry(key).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if now.duration_since(window.started_at) >= preset.window {
            window.count = 0;
            window.started_at = now;
        }

        let elapsed = now.duration_since(window.started_at);
        let reset_after_secs = preset.window.saturating_sub(elapsed).as_secs().max(1);

        if window.count >= preset.max_requests {
            return RateLimitDecision {
                allowed: false,
                limit: preset.max_requests,
                remaining: 0,
                reset_after_secs,
            };
        }

        window.count += 1;

        RateLimitDecision {
            allowed: true,
            limit: preset.max_requests,
            remaining: preset.max_requests - window.count,
            reset_after_secs,
        }
    }

    /// Drop windows that have been idle past their preset's duration.
    ///
    /// Windows are keyed by preset name, so the longest preset window bounds
    /// staleness; sweeping anything older than the sweep interval is safe
    /// because every preset window is far shorter than it.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        windows.retain(|_, w| now.duration_since(w.started_at) < SWEEP_INTERVAL);
    }

    /// Spawn the background eviction task.
    pub fn spawn_sweeper(&self) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            // First tick fires immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.sweep();
            }
        });
    }
}

/// Client IP advertised by a reverse proxy, if any.
#[must_use]
pub fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(ip.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Identify the client: proxy headers first, then the peer address.
///
/// The peer fallback keeps unproxied clients in separate buckets; it
/// requires serving with `into_make_service_with_connect_info`.
#[must_use]
pub fn client_id(request: &Request) -> String {
    if let Some(ip) = forwarded_ip(request.headers()) {
        return ip;
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Axum middleware enforcing a preset against the shared limiter.
///
/// Adds `X-RateLimit-Limit`, `X-RateLimit-Remaining`, and `X-RateLimit-Reset`
/// to every response, plus `Retry-After` on rejection.
pub async fn enforce(
    State((state, preset)): State<(AppState, RateLimitPreset)>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_id(&request);
    let decision = state.rate_limiter().check(preset, &client);

    if !decision.allowed {
        tracing::warn!(preset = preset.name, client = %client, "Rate limit exceeded");
        let mut response = AppError::RateLimited.into_response();
        apply_headers(response.headers_mut(), &decision);
        if let Ok(value) = HeaderValue::from_str(&decision.reset_after_secs.to_string()) {
            response.headers_mut().insert("retry-after", value);
        }
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let pairs = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_after_secs.to_string()),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TEST_PRESET: RateLimitPreset = RateLimitPreset {
        name: "test",
        max_requests: 3,
        window: Duration::from_secs(60),
    };

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for remaining in (0..3).rev() {
            let decision = limiter.check(TEST_PRESET, "1.2.3.4");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, remaining);
        }

        let decision = limiter.check(TEST_PRESET, "1.2.3.4");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at(TEST_PRESET, "1.2.3.4", start);
        }
        assert!(!limiter.check_at(TEST_PRESET, "1.2.3.4", start).allowed);

        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at(TEST_PRESET, "1.2.3.4", later).allowed);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            limiter.check(TEST_PRESET, "1.2.3.4");
        }
        assert!(!limiter.check(TEST_PRESET, "1.2.3.4").allowed);
        assert!(limiter.check(TEST_PRESET, "5.6.7.8").allowed);
    }

    #[test]
    fn test_presets_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            limiter.check(AUTH, "1.2.3.4");
        }
        assert!(!limiter.check(AUTH, "1.2.3.4").allowed);
        assert!(limiter.check(STANDARD, "1.2.3.4").allowed);
    }

    #[test]
    fn test_sweep_evicts_stale_windows() {
        let limiter = RateLimiter::new();
        limiter.check(TEST_PRESET, "1.2.3.4");
        limiter.sweep();
        // Fresh window survives the sweep.
        let decision = limiter.check(TEST_PRESET, "1.2.3.4");
        assert_eq!(decision.remaining, 1);
    }

    fn request_from(peer: Option<SocketAddr>, headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut request = builder.body(axum::body::Body::empty()).unwrap();
        if let Some(addr) = peer {
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn test_client_id_prefers_forwarded_for() {
        let request = request_from(
            None,
            &[
                ("x-forwarded-for", "9.9.9.9, 10.0.0.1"),
                ("x-real-ip", "8.8.8.8"),
            ],
        );
        assert_eq!(client_id(&request), "9.9.9.9");
    }

    #[test]
    fn test_client_id_falls_back_to_real_ip() {
        let request = request_from(None, &[("x-real-ip", "8.8.8.8")]);
        assert_eq!(client_id(&request), "8.8.8.8");
    }

    #[test]
    fn test_client_id_uses_peer_address() {
        let peer = SocketAddr::from(([10, 1, 2, 3], 55_000));
        assert_eq!(client_id(&request_from(Some(peer), &[])), "10.1.2.3");

        assert_eq!(client_id(&request_from(None, &[])), "unknown");
    }

    #[test]
    fn test_unproxied_peers_get_separate_windows() {
        // Without proxy headers, two direct connections must not share one
        // budget; exhausting one peer's window leaves the other untouched.
        let limiter = RateLimiter::new();
        let first = client_id(&request_from(
            Some(SocketAddr::from(([192, 0, 2, 1], 40_001))),
            &[],
        ));
        let second = client_id(&request_from(
            Some(SocketAddr::from(([192, 0, 2, 2], 40_002))),
            &[],
        ));
        assert_ne!(first, second);

        for _ in 0..AUTH.max_requests {
            limiter.check(AUTH, &first);
        }
        assert!(!limiter.check(AUTH, &first).allowed);
        assert!(limiter.check(AUTH, &second).allowed);
    }
}
