// ABOUTME: Token bucket limiting how many model calls an agent makes per minute.
// ABOUTME: Allows bursts up to the budget while holding the average rate.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Shortest sleep between refill checks.
const MIN_WAIT: Duration = Duration::from_millis(10);

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, capacity: f64, per_second: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed * per_second).min(capacity);
    }
}

/// Token bucket rate limiter.
///
/// The bucket starts full with `capacity` tokens and refills continuously at
/// `per_second` tokens per second. Each model call consumes one token.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: f64,
    per_second: f64,
}

impl RateLimiter {
    /// Create a limiter with an explicit burst size and refill rate.
    ///
    /// Non-positive values are clamped to a tiny positive rate so the
    /// limiter never divides by zero.
    pub fn new(capacity: f64, per_second: f64) -> Self {
        let capacity = capacity.max(f64::EPSILON);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            per_second: per_second.max(f64::EPSILON),
        }
    }

    /// A limiter admitting `requests` calls per minute, bursting up to the same count.
    pub fn per_minute(requests: u32) -> Self {
        let requests = f64::from(requests.max(1));
        Self::new(requests, requests / 60.0)
    }

    /// Take one token, waiting for a refill if the bucket is empty.
    ///
    /// Returns `false` if `cancel` fires before a token becomes available.
    pub async fn acquire(&self, cancel: &CancellationToken) -> bool {
        loop {
            let wait = self.try_take(1.0).await;
            if wait.is_zero() {
                return true;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(wait.max(MIN_WAIT)) => {}
            }
        }
    }

    /// Take `tokens` if available; otherwise report how long until they would be.
    async fn try_take(&self, tokens: f64) -> Duration {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.capacity, self.per_second);

        if bucket.tokens >= tokens {
            bucket.tokens -= tokens;
            return Duration::ZERO;
        }

        Duration::from_secs_f64((tokens - bucket.tokens) / self.per_second)
    }

    /// Tokens currently in the bucket, after refilling.
    pub async fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.capacity, self.per_second);
        bucket.tokens
    }
}
