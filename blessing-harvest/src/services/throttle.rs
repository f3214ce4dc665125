//! Politeness delays, request ceiling and backoff
//!
//! Two layers guard every outbound request:
//! - a randomized pause between successive fetches / result pages
//!   (`DelayRange`, lower bound clamped to 1 ms so the pause never vanishes)
//! - a `governor` token bucket capping requests per minute
//!
//! When a source signals anti-automation the caller backs off for
//! `uniform(backoff) * attempt` before retrying.

use crate::config::ThrottleConfig;
use governor::{Quota, RateLimiter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Inclusive millisecond range for a randomized delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw a delay; never shorter than 1 ms
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_ms.max(1);
        let max = self.max_ms.max(min);
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

pub struct Throttle {
    config: ThrottleConfig,
    rng: Mutex<StdRng>,
    limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic delays for tests
    pub fn with_seed(config: ThrottleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ThrottleConfig, rng: StdRng) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            config,
            rng: Mutex::new(rng),
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    fn sample(&self, range: &DelayRange) -> Duration {
        // A poisoned lock still holds a usable RNG
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        range.sample(&mut *rng)
    }

    pub fn fetch_delay(&self) -> Duration {
        self.sample(&self.config.fetch_delay)
    }

    pub fn search_delay(&self) -> Duration {
        self.sample(&self.config.search_delay)
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.sample(&self.config.backoff) * attempt.max(1)
    }

    /// Wait for a request permit from the per-minute ceiling
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Sleep for `duration` unless cancelled first
    ///
    /// Returns `false` when the sleep was cut short by cancellation.
    pub async fn wait(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
