//! Rate Limiter (Token Bucket)
//!
//! Caps request throughput per process. The critical section is a handful
//! of arithmetic operations, so a plain mutex is held only momentarily and
//! never across an await point.

use std::sync::Mutex;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size
    /// * `refill_rate` - Tokens added per second
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: f64::from(max_tokens),
                last_refill: Instant::now(),
            }),
            max_tokens,
            refill_rate,
        }
    }

    /// Check if a request is allowed (consumes 1 token)
    pub fn check(&self) -> bool {
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            // A poisoned bucket only means a panic mid-arithmetic; the
            // state is still a pair of plain numbers
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens =
            (bucket.tokens + elapsed * f64::from(self.refill_rate)).min(f64::from(self.max_tokens));
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
