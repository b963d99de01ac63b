//! Per-provider circuit breaker
//!
//! | State | `can_execute` | success | failure |
//! |-------|---------------|---------|---------|
//! | Closed | yes | clear failures | count; open at threshold |
//! | Open | after recovery timeout, as a half-open trial call | ignored | restart timeout |
//! | HalfOpen | while a trial slot is free | count; close at threshold | reopen |
//!
//! All state sits behind one mutex per breaker so a read-modify-write never
//! interleaves with another task's. Breakers are process-local and start
//! closed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tollgate_domain::ports::{Clock, UsageRecorder};
use tollgate_domain::value_objects::{CircuitBreakerSettings, CircuitState, CircuitStateInfo};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure: Option<Instant>,
    trials_in_flight: u32,
    last_trial_at: Option<Instant>,
}

/// Circuit breaker guarding one provider
#[derive(Debug)]
pub struct CircuitBreaker {
    provider: String,
    settings: CircuitBreakerSettings,
    clock: Arc<dyn Clock>,
    recorder: Arc<dyn UsageRecorder>,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker
    pub fn new(
        provider: impl Into<String>,
        settings: CircuitBreakerSettings,
        clock: Arc<dyn Clock>,
        recorder: Arc<dyn UsageRecorder>,
    ) -> Self {
        let provider = provider.into();
        recorder.record_circuit_state(&provider, CircuitState::Closed);
        Self {
            provider,
            settings,
            clock,
            recorder,
            inner: Mutex::new(BreakerState::default()),
        }
    }

    /// Provider this breaker guards
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Thresholds in effect
    pub fn settings(&self) -> &CircuitBreakerSettings {
        &self.settings
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether a call may execute now
    ///
    /// An open breaker whose recovery timeout has elapsed moves to half-open
    /// and admits the caller as its trial call.
    pub fn can_execute(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.recovery_elapsed(&inner, now) {
                    self.transition_to(&mut inner, CircuitState::HalfOpen);
                    Self::take_trial(&mut inner, now);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.trials_in_flight < self.settings.half_open_max_calls {
                    Self::take_trial(&mut inner, now);
                    true
                } else if self.trial_stale(&inner, now) {
                    // A trial call that never reported back must not wedge the breaker
                    debug!(provider = %self.provider, "Reclaiming stale half-open trial call");
                    inner.trials_in_flight = 0;
                    Self::take_trial(&mut inner, now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
                inner.success_count += 1;
                if inner.success_count >= self.settings.success_threshold {
                    self.transition_to(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Open => {
                debug!(provider = %self.provider, "Ignoring success reported while open");
            }
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.last_failure = Some(now);
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.settings.failure_threshold {
                    self.transition_to(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => self.transition_to(&mut inner, CircuitState::Open),
            CircuitState::Open => {}
        }
    }

    /// Read-only view; never changes state
    pub fn state_info(&self) -> CircuitStateInfo {
        let now = self.clock.now();
        let inner = self.lock();
        let can_execute = match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => self.recovery_elapsed(&inner, now),
            CircuitState::HalfOpen => {
                inner.trials_in_flight < self.settings.half_open_max_calls
                    || self.trial_stale(&inner, now)
            }
        };
        CircuitStateInfo {
            provider: self.provider.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            can_execute,
            retry_after: self.remaining(&inner, now),
        }
    }

    /// Time until a call could be admitted, if one would be denied now
    pub fn retry_after(&self) -> Option<Duration> {
        let now = self.clock.now();
        let inner = self.lock();
        self.remaining(&inner, now)
    }

    /// Force the breaker open as if it had just failed (test/ops use)
    pub fn force_open(&self) {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.last_failure = Some(now);
        self.transition_to(&mut inner, CircuitState::Open);
    }

    /// Force the breaker half-open (test/ops use)
    pub fn force_half_open(&self) {
        let mut inner = self.lock();
        self.transition_to(&mut inner, CircuitState::HalfOpen);
    }

    /// Return to closed with cleared counters
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.transition_to(&mut inner, CircuitState::Closed);
        inner.last_failure = None;
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_trial(inner: &mut BreakerState, now: Instant) {
        inner.trials_in_flight += 1;
        inner.last_trial_at = Some(now);
    }

    fn recovery_elapsed(&self, inner: &BreakerState, now: Instant) -> bool {
        inner
            .last_failure
            .is_none_or(|at| now.saturating_duration_since(at) >= self.settings.recovery_timeout)
    }

    fn trial_stale(&self, inner: &BreakerState, now: Instant) -> bool {
        inner
            .last_trial_at
            .is_none_or(|at| now.saturating_duration_since(at) >= self.settings.recovery_timeout)
    }

    fn remaining(&self, inner: &BreakerState, now: Instant) -> Option<Duration> {
        let since = match inner.state {
            CircuitState::Closed => return None,
            CircuitState::Open => inner.last_failure?,
            CircuitState::HalfOpen => {
                if inner.trials_in_flight < self.settings.half_open_max_calls {
                    return None;
                }
                inner.last_trial_at?
            }
        };
        let remaining = self
            .settings
            .recovery_timeout
            .saturating_sub(now.saturating_duration_since(since));
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Move to a new state, clearing both counters and any trial slots
    fn transition_to(&self, inner: &mut BreakerState, new_state: CircuitState) {
        let old_state = inner.state;
        inner.state = new_state;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.trials_in_flight = 0;
        inner.last_trial_at = None;

        if old_state != new_state {
            info!(
                provider = %self.provider,
                from = %old_state,
                to = %new_state,
                "Circuit breaker state transition"
            );
            self.recorder.record_circuit_state(&self.provider, new_state);
        }
    }
}
