use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use api_relay_types::{RateLimitConfig, RelayError};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::relay::response::RelayFailure;

/// Above this many tracked callers, each hit also sweeps expired windows.
const CLEANUP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started: Instant,
    count: u32,
}

/// Outcome of charging one request against a caller's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request budget per caller address.
#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<IpAddr, WindowState>,
    max_requests: u32,
    window: Duration,
    trust_forwarded_headers: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self { entries: DashMap::new(), max_requests, window, trust_forwarded_headers: false }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            trust_forwarded_headers: config.trust_forwarded_headers,
            ..Self::new(config.max_requests, Duration::from_secs(config.window_secs))
        }
    }

    /// Caller key: the socket peer, or the forwarded address when trusted.
    pub fn caller_ip(&self, request: &Request) -> Option<IpAddr> {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        if self.trust_forwarded_headers {
            client_ip_from_headers(request.headers()).or(peer)
        } else {
            peer
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateDecision {
        self.check_at(ip, Instant::now())
    }

    /// Charge one request for `ip` at `now`. An elapsed window resets lazily.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> RateDecision {
        if self.entries.len() > CLEANUP_THRESHOLD {
            self.sweep_at(now);
        }

        let mut entry = self.entries.entry(ip).or_insert(WindowState { started: now, count: 0 });
        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(entry.started);
            return RateDecision::Limited { retry_after: self.window.saturating_sub(elapsed) };
        }

        entry.count = entry.count.saturating_add(1);
        RateDecision::Allowed { remaining: self.max_requests - entry.count }
    }

    /// Drop callers whose window has elapsed.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let window = self.window;
        self.entries.retain(|_, state| now.saturating_duration_since(state.started) < window);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sweep once per window until the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.window;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(limiter) = weak.upgrade() else {
                    break;
                };
                let before = limiter.len();
                limiter.sweep();
                tracing::debug!(
                    "Rate limiter sweep: {} -> {} tracked callers",
                    before,
                    limiter.len()
                );
            }
        })
    }
}

/// Caller address: first `X-Forwarded-For` entry, then `X-Real-IP`.
pub fn client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
        })
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let Some(ip) = limiter.caller_ip(&request) else {
        tracing::trace!("No caller address for {}, skipping rate limit", request.uri().path());
        return next.run(request).await;
    };

    match limiter.check(ip) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!("Rate limit exceeded for {} on {}", ip, request.uri().path());
            // Round up so clients never retry inside the window.
            let retry_after_secs =
                retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            RelayFailure { error: RelayError::RateLimited { retry_after_secs }, detailed: false }
                .into_response()
        },
    }
}
