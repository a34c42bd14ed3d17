//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;

/// Configuration for one sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Spacing between scheduled refresh ticks.
    pub refresh_interval: Duration,
    /// Whether scheduled ticks fire at all.
    pub enable_auto_refresh: bool,
    /// Whether fallback data is substituted when live data is unavailable.
    pub enable_offline_mode: bool,
    /// Deadline for a single fetch attempt.
    pub fetch_timeout: Duration,
    /// Retry behavior for failed fetches.
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Creates a configuration with the default settings: 30 second refresh
    /// interval, auto-refresh and offline mode enabled, 10 second fetch
    /// timeout, three retries.
    pub fn new() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            enable_auto_refresh: true,
            enable_offline_mode: true,
            fetch_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the scheduled refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Enables or disables scheduled ticks.
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.enable_auto_refresh = enabled;
        self
    }

    /// Enables or disables fallback substitution when live data is unavailable.
    pub fn with_offline_mode(mut self, enabled: bool) -> Self {
        self.enable_offline_mode = enabled;
        self
    }

    /// Sets the per-attempt fetch deadline.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the retry ceiling.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks the configuration for caller errors.
    ///
    /// Invalid configuration is fatal and never retried.
    pub fn validate(&self) -> SyncResult<()> {
        if self.refresh_interval.is_zero() {
            return Err(SyncError::Validation(
                "refresh_interval must be non-zero".into(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(SyncError::Validation("fetch_timeout must be non-zero".into()));
        }
        self.retry.validate()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded retry schedule with linearly growing, capped delays.
///
/// The delay before the n-th retry is `base_delay * n`, capped at
/// `max_delay`. Linear growth matches the product's observed behavior and is
/// the documented contract here; see DESIGN.md for the decision record.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry ceiling: once this many consecutive failures have occurred,
    /// no further retry is scheduled.
    pub max_retries: u32,
    /// Delay unit, multiplied by the failure count.
    pub base_delay: Duration,
    /// Hard cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry ceiling and default delays.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Creates a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the delay unit.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before the next retry after `failures` consecutive failures,
    /// or `None` once the ceiling is exhausted.
    ///
    /// `failures` is 1-based: the first failed attempt passes 1.
    pub fn next_delay(&self, failures: u32) -> Option<Duration> {
        if failures == 0 || failures > self.max_retries {
            return None;
        }
        Some((self.base_delay * failures).min(self.max_delay))
    }

    /// Checks the policy for caller errors.
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_retries > 0 && self.base_delay.is_zero() {
            return Err(SyncError::Validation(
                "base_delay must be non-zero when retries are enabled".into(),
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(SyncError::Validation(
                "max_delay must not be smaller than base_delay".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
