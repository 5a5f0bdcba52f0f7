//! # Circuit Breaker Module
//!
//! Guards the HTTP oracle. After `circuit_breaker_threshold` consecutive
//! failed calls the breaker opens and every question fails fast with
//! [`OracleError::CircuitOpen`](crate::errors::OracleError::CircuitOpen),
//! which the escalation router treats the same as an absent oracle. Once the
//! reset window has passed a single trial call is admitted: if it succeeds
//! the breaker closes, if it fails the breaker opens for another window.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::RecoveryConfig;

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass through; counts consecutive failures
    Closed { failures: u32 },
    /// Calls fail fast until the reset window has passed
    Open { since: Instant },
    /// One trial call is in flight
    HalfOpen,
}

/// Circuit breaker guarding the oracle endpoint
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// ```rust
    /// use recipe_normalizer::circuit_breaker::CircuitBreaker;
    /// use recipe_normalizer::config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(breaker.try_acquire());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
            config,
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reset_window(&self) -> Duration {
        Duration::from_secs(self.config.circuit_breaker_reset_secs)
    }

    /// Whether an oracle call may go out now
    ///
    /// An open breaker whose window has passed moves to half-open and admits
    /// exactly this caller; everyone else keeps failing fast until the trial
    /// call reports back.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state_guard();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { since } if since.elapsed() >= self.reset_window() => {
                debug!("Oracle circuit half-open, admitting trial call");
                *state = BreakerState::HalfOpen;
                true
            }
            BreakerState::Open { .. } | BreakerState::HalfOpen => false,
        }
    }

    /// Record a failed oracle call
    pub fn record_failure(&self) {
        let mut state = self.state_guard();
        *state = match *state {
            BreakerState::Closed { failures }
                if failures + 1 < self.config.circuit_breaker_threshold =>
            {
                BreakerState::Closed {
                    failures: failures + 1,
                }
            }
            BreakerState::Closed { .. } | BreakerState::HalfOpen => {
                info!(
                    reset_secs = self.config.circuit_breaker_reset_secs,
                    "Oracle circuit opened"
                );
                BreakerState::Open {
                    since: Instant::now(),
                }
            }
            open @ BreakerState::Open { .. } => open,
        };
    }

    /// Record a successful oracle call, closing the circuit
    pub fn record_success(&self) {
        let mut state = self.state_guard();
        if *state == BreakerState::HalfOpen {
            info!("Oracle circuit closed after successful trial call");
        }
        *state = BreakerState::Closed { failures: 0 };
    }

    pub fn state(&self) -> BreakerState {
        *self.state_guard()
    }

    /// Consecutive failures while closed; zero once the circuit has opened
    pub fn failure_count(&self) -> u32 {
        match self.state() {
            BreakerState::Closed { failures } => failures,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, reset_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(RecoveryConfig {
            circuit_breaker_threshold: threshold,
            circuit_breaker_reset_secs: reset_secs,
        })
    }

    #[test]
    fn test_opens_after_consecutive_failures() {
        let breaker = breaker(2, 60);
        breaker.record_failure();
        assert_eq!(breaker.failure_count(), 1);
        assert!(breaker.try_acquire());

        breaker.record_failure();
        assert!(matches!(breaker.state(), BreakerState::Open { .. }));
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let breaker = breaker(2, 60);
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed { failures: 1 });
    }

    #[test]
    fn test_half_open_admits_one_trial() {
        let breaker = breaker(1, 0);
        breaker.record_failure();

        assert!(breaker.try_acquire());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert!(!breaker.try_acquire());

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed { failures: 0 });
        assert!(breaker.try_acquire());
    }

    #[test]
    fn test_failed_trial_reopens() {
        let breaker = breaker(3, 0);
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(breaker.try_acquire());

        breaker.record_failure();
        assert!(matches!(breaker.state(), BreakerState::Open { .. }));
    }
}
