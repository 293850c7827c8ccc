use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between consecutive outgoing queries.
/// Shared by every worker of one client; callers queue on the lock.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_query: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            last_query: Mutex::new(None),
        }
    }

    /// Wait until a query may be sent, then record it as sent.
    pub async fn acquire(&self) {
        let mut last = self.last_query.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!("Rate limiter sleeping {}ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let started = std::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(40));
        let started = std::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let a = RateLimiter::new(Duration::from_secs(30));
        let b = RateLimiter::new(Duration::from_secs(30));
        a.acquire().await;
        let started = std::time::Instant::now();
        b.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
