//! Multi-window rate limiter
//!
//! Enforces simultaneous per-second, per-minute, and per-hour request
//! ceilings using sliding windows of request timestamps. Admission is only
//! granted when all three windows are under their ceilings, and the
//! check-and-record is a single critical section so concurrent callers can
//! never race past a ceiling together.

use crate::config::RateLimitConfig;
use crate::ConfigError;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Small buffer added to computed waits so the oldest entry has definitely
/// expired when we re-check.
const WAKE_BUFFER: Duration = Duration::from_millis(10);

/// One sliding window: timestamps within `horizon`, at most `ceiling` of them
#[derive(Debug)]
struct RateWindow {
    entries: VecDeque<Instant>,
    horizon: Duration,
    ceiling: usize,
}

impl RateWindow {
    fn new(horizon: Duration, ceiling: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            horizon,
            ceiling: ceiling as usize,
        }
    }

    /// Evicts entries older than the horizon. Must run before every
    /// admission check and before reporting counts.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.entries.front() {
            // saturating_duration_since keeps this sane even if the clock
            // source misbehaves; a "future" entry just reads as age zero.
            if now.saturating_duration_since(oldest) >= self.horizon {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    fn has_capacity(&self) -> bool {
        self.entries.len() < self.ceiling
    }

    /// Time until the oldest entry leaves the window, if the window is full
    fn time_until_capacity(&self, now: Instant) -> Option<Duration> {
        if self.has_capacity() {
            return None;
        }
        self.entries.front().map(|&oldest| {
            self.horizon
                .saturating_sub(now.saturating_duration_since(oldest))
        })
    }
}

/// Live per-window counts and limits, for observability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterStats {
    pub requests_last_second: usize,
    pub requests_last_minute: usize,
    pub requests_last_hour: usize,
    pub limit_per_second: usize,
    pub limit_per_minute: usize,
    pub limit_per_hour: usize,
}

/// Sliding-window rate limiter shared by every outbound request
///
/// Safe for concurrent callers: all three windows live behind one mutex, and
/// pruning, the admission check, and recording happen inside a single lock
/// hold.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<[RateWindow; 3]>,
}

impl RateLimiter {
    /// Creates a rate limiter from the configured ceilings
    ///
    /// Zero ceilings are rejected: a zero window could never grant admission
    /// and every blocking `acquire` would hang.
    pub fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("requests_per_second", config.requests_per_second),
            ("requests_per_minute", config.requests_per_minute),
            ("requests_per_hour", config.requests_per_hour),
        ] {
            if value < 1 {
                return Err(ConfigError::Validation(format!(
                    "{} must be >= 1, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            windows: Mutex::new([
                RateWindow::new(Duration::from_secs(1), config.requests_per_second),
                RateWindow::new(Duration::from_secs(60), config.requests_per_minute),
                RateWindow::new(Duration::from_secs(3600), config.requests_per_hour),
            ]),
        })
    }

    /// Acquires permission to make a request
    ///
    /// When `blocking` is true, the call sleeps until admission is granted
    /// and always returns `true`. When false, it returns immediately with
    /// `true` (admission granted and recorded) or `false` (refused).
    ///
    /// While blocked, the wait is the maximum of the per-window times until
    /// the oldest entry expires, recomputed after every sleep; admission is
    /// re-attempted on wake rather than assumed.
    pub async fn acquire(&self, blocking: bool) -> bool {
        loop {
            let wait = {
                let mut windows = self.windows.lock().unwrap();
                let now = Instant::now();

                for window in windows.iter_mut() {
                    window.prune(now);
                }

                if windows.iter().all(|w| w.has_capacity()) {
                    for window in windows.iter_mut() {
                        window.entries.push_back(now);
                    }
                    return true;
                }

                if !blocking {
                    return false;
                }

                windows
                    .iter()
                    .filter_map(|w| w.time_until_capacity(now))
                    .max()
                    .unwrap_or(Duration::ZERO)
            };

            tracing::trace!("Rate limiter full, waiting {:?}", wait);
            tokio::time::sleep(wait + WAKE_BUFFER).await;
        }
    }

    /// Returns live counts per window, pruning expired entries first
    pub fn stats(&self) -> RateLimiterStats {
        let mut windows = self.windows.lock().unwrap();
        let now = Instant::now();
        for window in windows.iter_mut() {
            window.prune(now);
        }

        RateLimiterStats {
            requests_last_second: windows[0].entries.len(),
            requests_last_minute: windows[1].entries.len(),
            requests_last_hour: windows[2].entries.len(),
            limit_per_second: windows[0].ceiling,
            limit_per_minute: windows[1].ceiling,
            limit_per_hour: windows[2].ceiling,
        }
    }

    /// Clears all windows (used between independent crawl sessions)
    pub fn reset(&self) {
        let mut windows = self.windows.lock().unwrap();
        for window in windows.iter_mut() {
            window.entries.clear();
        }
    }
}
