use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::types::ErrorResponse;
use crate::AppState;

/// Applied when the configured requests-per-minute value is zero.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every in-flight request. Burst capacity equals
/// the per-minute limit; tokens refill continuously at limit/60 per second.
/// The bucket is global, so this caps total gateway throughput rather than
/// any per-client rate.
pub struct RateLimiter {
    capacity: f64,
    refill_per_second: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = if requests_per_minute == 0 {
            DEFAULT_REQUESTS_PER_MINUTE
        } else {
            requests_per_minute
        };
        Self {
            capacity: rpm as f64,
            refill_per_second: rpm as f64 / 60.0,
            bucket: Mutex::new(Bucket {
                tokens: rpm as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Attempts to consume one token. `false` means reject the request now;
    /// it is not a transient condition to retry.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().expect("rate limiter lock poisoned");
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens =
            (bucket.tokens + elapsed.as_secs_f64() * self.refill_per_second).min(self.capacity);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.rate_limiter.allow() {
        warn!("Request rejected: rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded. Please try again later.".to_string(),
            }),
        )
            .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new(10);
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at(now));
        }
        assert!(!limiter.allow_at(now));
    }

    #[test]
    fn refills_at_configured_rate() {
        // 60 rpm = exactly one token per second
        let limiter = RateLimiter::new(60);
        let start = Instant::now();
        for _ in 0..60 {
            assert!(limiter.allow_at(start));
        }
        assert!(!limiter.allow_at(start));

        // Half a second accrues half a token, not enough to pass
        assert!(!limiter.allow_at(start + Duration::from_millis(500)));
        // Another full second pushes the balance over one token
        assert!(limiter.allow_at(start + Duration::from_millis(1500)));
        assert!(!limiter.allow_at(start + Duration::from_millis(1500)));
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();
        // Idle for far longer than a refill cycle
        let later = start + Duration::from_secs(3600);
        for _ in 0..5 {
            assert!(limiter.allow_at(later));
        }
        assert!(!limiter.allow_at(later));
    }

    #[test]
    fn zero_config_falls_back_to_default() {
        let limiter = RateLimiter::new(0);
        let now = Instant::now();
        for _ in 0..DEFAULT_REQUESTS_PER_MINUTE {
            assert!(limiter.allow_at(now));
        }
        assert!(!limiter.allow_at(now));
    }
}
