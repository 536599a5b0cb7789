//! Request throttle for the generative-language backend
//!
//! Constructed once per process and handed to callers explicitly, so tests
//! can swap in a permissive limiter and nothing reaches for ambient state.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(calls_per_minute: u32) -> Self {
        let calls_per_minute = calls_per_minute.max(1);
        Self {
            min_interval: Duration::from_secs_f64(60.0 / calls_per_minute as f64),
            last_call: Mutex::new(None),
        }
    }

    /// Blocks until a call slot is available and returns the time waited.
    pub async fn acquire_slot(&self) -> Duration {
        let mut last_call = self.last_call.lock().await;
        let now = Instant::now();

        let wait = match *last_call {
            Some(last) => {
                let elapsed = now.duration_since(last);
                self.min_interval.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        };

        if !wait.is_zero() {
            debug!("Rate limiter: waiting {:?} before next LLM call", wait);
            tokio::time::sleep(wait).await;
        }

        *last_call = Some(Instant::now());
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_slot_is_immediate() {
        let limiter = RateLimiter::new(60);
        let waited = limiter.acquire_slot().await;
        assert_eq!(waited, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_slot_waits_min_interval() {
        let limiter = RateLimiter::new(60); // one call per second
        limiter.acquire_slot().await;
        let waited = limiter.acquire_slot().await;
        assert!(waited >= Duration::from_millis(900));
    }
}
