//! Circuit breaker shared by the HTTP adapters.
//!
//! HTTP 403 trips the breaker at once; `failure_threshold` consecutive
//! failures (429, 5xx, timeouts) trip it too. While open, every request is
//! refused until the cooldown elapses. Discovery and history fetches share
//! one breaker so a ban seen by either stops both.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Why the breaker opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCause {
    /// The provider refused us outright (HTTP 403).
    Refused,
    /// `failure_threshold` requests failed in a row.
    RepeatedFailures,
}

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { since: Instant, cause: TripCause },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: 3,
        }
    }

    /// 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    pub fn with_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = failure_threshold.max(1);
        self
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // A plain enum cannot be left half-written by a panicking holder.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current position.
    pub fn state(&self) -> BreakerState {
        *self.lock()
    }

    /// True if requests may be sent. Closes the breaker once the cooldown has passed.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { since, cause } if since.elapsed() >= self.cooldown => {
                tracing::info!(?cause, "circuit breaker cooldown expired, accepting requests again");
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        if let BreakerState::Closed { .. } = *state {
            *state = BreakerState::Closed {
                consecutive_failures: 0,
            };
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        if let BreakerState::Closed {
            consecutive_failures,
        } = *state
        {
            let failures = consecutive_failures + 1;
            *state = if failures >= self.failure_threshold {
                tracing::warn!(
                    failures,
                    cooldown_secs = self.cooldown.as_secs(),
                    "circuit breaker tripped"
                );
                BreakerState::Open {
                    since: Instant::now(),
                    cause: TripCause::RepeatedFailures,
                }
            } else {
                BreakerState::Closed {
                    consecutive_failures: failures,
                }
            };
        }
    }

    /// Open the breaker immediately (HTTP 403).
    pub fn trip(&self) {
        tracing::warn!(
            cooldown_secs = self.cooldown.as_secs(),
            "circuit breaker tripped by provider refusal"
        );
        *self.lock() = BreakerState::Open {
            since: Instant::now(),
            cause: TripCause::Refused,
        };
    }

    /// Time left before requests are accepted again; zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        match self.state() {
            BreakerState::Closed { .. } => Duration::ZERO,
            BreakerState::Open { since, .. } => self.cooldown.saturating_sub(since.elapsed()),
        }
    }
}
