//! Pacing between page fetches.
//!
//! Sequential requests with a randomized pause are much less likely to trip
//! anti-scraping defenses than a burst. The pause is a capability injected
//! into the site scraper so tests run without sleeping.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before the next fetch.
    async fn pause(&self);
}

/// Sleeps a uniformly random duration between the configured bounds.
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        let min = Duration::from_secs(min_secs);
        let max = Duration::from_secs(max_secs.max(min_secs));
        Self { min, max }
    }
}

#[async_trait]
impl Pacer for RandomDelay {
    async fn pause(&self) {
        let delay = {
            let mut rng = rand::thread_rng();
            Duration::from_millis(rng.gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64))
        };
        debug!("Pausing {:.1}s before next fetch", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// No pause at all, for tests.
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_is_clamped_to_min() {
        let pacer = RandomDelay::new(5, 2);
        assert_eq!(pacer.min, Duration::from_secs(5));
        assert_eq!(pacer.max, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn zero_bounds_return_immediately() {
        RandomDelay::new(0, 0).pause().await;
        NoDelay.pause().await;
    }
}
