#![forbid(unsafe_code)]

//! Trailing-edge debouncing with a bounded maximum wait.
//!
//! Scroll offsets arrive far more often than a layout pass is worth running.
//! [`Debouncer`] keeps only the latest sample and releases it once input has
//! been quiet for `wait`, or once `max_wait` has elapsed since the first
//! sample of the current burst, whichever comes first.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use waterfall_core::debounce::{DebounceAction, DebounceConfig, Debouncer};
//!
//! let mut debouncer = Debouncer::new(DebounceConfig::default());
//! let start = Instant::now();
//!
//! // Samples inside the quiet window are coalesced (latest wins).
//! assert_eq!(debouncer.call_at(100.0, start), DebounceAction::Pending);
//! assert_eq!(
//!     debouncer.call_at(180.0, start + Duration::from_millis(4)),
//!     DebounceAction::Pending
//! );
//!
//! // Once input goes quiet the latest sample fires.
//! let action = debouncer.poll_at(start + Duration::from_millis(40));
//! assert_eq!(action.value(), Some(180.0));
//! ```
//!
//! # Invariants
//!
//! - **Latest wins**: the last sample of a burst is never dropped.
//! - **Bounded latency**: a pending sample fires within `max_wait` of the
//!   first sample in its burst.
//! - **Deterministic**: identical `(value, instant)` sequences yield identical
//!   actions.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `wait == 0` | Every sample fires immediately |
//! | `max_wait < wait` | `max_wait` is the effective bound |
//! | Clock goes backwards | Elapsed time saturates to zero |

use std::time::{Duration, Instant};

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
}

/// Configuration for a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebounceConfig {
    /// Quiet period after the last sample before it fires (trailing edge).
    pub wait: Duration,
    /// Upper bound on how long a burst may keep a sample pending.
    /// `None` means a continuous burst never fires until it goes quiet.
    pub max_wait: Option<Duration>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(16),
            max_wait: Some(Duration::from_millis(48)),
        }
    }
}

impl DebounceConfig {
    /// Set the quiet period.
    #[must_use]
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Set the maximum wait. `None` disables the bound.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Result of feeding or polling a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceAction<T> {
    /// Nothing is pending.
    Idle,
    /// A sample is being held back.
    Pending,
    /// The pending sample is released.
    Fire {
        /// The latest sample of the burst.
        value: T,
        /// Time between the first sample of the burst and release.
        waited: Duration,
        /// Whether release was forced by `max_wait` rather than quiet input.
        forced: bool,
    },
}

impl<T: Copy> DebounceAction<T> {
    /// The fired value, if any.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Fire { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Trailing-edge debouncer with a maximum wait.
///
/// Not thread-safe; owned by whatever drives the frame loop.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    config: DebounceConfig,
    /// Latest sample (latest wins).
    pending: Option<T>,
    /// Timestamp of the first sample in the current burst.
    window_start: Option<Instant>,
    /// Timestamp of the most recent sample.
    last_call: Option<Instant>,
    /// Number of samples that have fired.
    fired: u64,
}

impl<T: Copy> Debouncer<T> {
    /// Create an idle debouncer.
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
            window_start: None,
            last_call: None,
            fired: 0,
        }
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Feed a sample at a specific time.
    pub fn call_at(&mut self, value: T, now: Instant) -> DebounceAction<T> {
        self.pending = Some(value);
        self.last_call = Some(now);
        let start = *self.window_start.get_or_insert(now);

        if self.config.wait.is_zero() || self.max_wait_reached(start, now) {
            let forced = !self.config.wait.is_zero();
            return self.release(now, forced);
        }
        DebounceAction::Pending
    }

    /// Check the deadlines at a specific time.
    pub fn poll_at(&mut self, now: Instant) -> DebounceAction<T> {
        let (Some(_), Some(start), Some(last)) = (self.pending, self.window_start, self.last_call)
        else {
            return DebounceAction::Idle;
        };

        if duration_since_or_zero(now, last) >= self.config.wait {
            return self.release(now, false);
        }
        if self.max_wait_reached(start, now) {
            return self.release(now, true);
        }
        DebounceAction::Pending
    }

    /// Time until the pending sample would fire, `None` when idle.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending?;
        let last = self.last_call?;
        let start = self.window_start?;

        let quiet = self
            .config
            .wait
            .saturating_sub(duration_since_or_zero(now, last));
        let bounded = self
            .config
            .max_wait
            .map(|max| max.saturating_sub(duration_since_or_zero(now, start)));
        Some(bounded.map_or(quiet, |b| b.min(quiet)))
    }

    /// Release the pending sample regardless of deadlines.
    pub fn flush(&mut self) -> Option<T> {
        let value = self.pending.take();
        if value.is_some() {
            self.fired += 1;
        }
        self.window_start = None;
        self.last_call = None;
        value
    }

    /// Drop the pending sample without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.window_start = None;
        self.last_call = None;
    }

    /// Whether a sample is being held back.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of samples released so far.
    #[inline]
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    fn max_wait_reached(&self, start: Instant, now: Instant) -> bool {
        self.config
            .max_wait
            .is_some_and(|max| duration_since_or_zero(now, start) >= max)
    }

    fn release(&mut self, now: Instant, forced: bool) -> DebounceAction<T> {
        let waited = self
            .window_start
            .map(|start| duration_since_or_zero(now, start))
            .unwrap_or(Duration::ZERO);
        match self.flush() {
            Some(value) => DebounceAction::Fire {
                value,
                waited,
                forced,
            },
            None => DebounceAction::Idle,
        }
    }
}
