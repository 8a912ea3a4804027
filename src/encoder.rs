//! Rate estimation from the edge timings of a digital input.
//!
//! A motor shaft carrying a slotted disc or magnetic encoder toggles a
//! digital input as it turns. Timing how long a fixed number of transitions
//! takes yields the rotational speed: [`RateEstimator::measure_rate`] sums
//! the per-transition durations and converts the total period to revolutions
//! per minute.
//!
//! Waiting for a transition is inherently blocking: the rate can only be
//! known after real edges are observed. By default the wait is unbounded,
//! matching that contract; a disconnected or stalled sensor then freezes the
//! caller. Configure a timeout to surface that condition as
//! [`SenseError::Timeout`] instead.

#[cfg(not(feature = "std"))]
use core::fmt;
use core::time::Duration;

use crate::hal::{Clock, DigitalInput};
use crate::time::InstantLike;

/// Errors raised while timing signal transitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum SenseError {
    /// No transition was observed within the configured bound.
    #[cfg_attr(feature = "std", error("timed out waiting for an input transition"))]
    Timeout,

    /// The observed transitions spanned zero elapsed time, so no rate can be
    /// derived from them.
    #[cfg_attr(
        feature = "std",
        error("elapsed time across transitions was zero; rate is undefined")
    )]
    UndefinedRate,
}

#[cfg(not(feature = "std"))]
impl fmt::Display for SenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SenseError::Timeout => "timed out waiting for an input transition",
            SenseError::UndefinedRate => {
                "elapsed time across transitions was zero; rate is undefined"
            }
        };
        f.write_str(msg)
    }
}

/// Waits for the next state change on `input` and returns the elapsed time.
///
/// Captures the input's current level, then polls until a sample differs from
/// it. With `timeout` of `None` the poll loop never gives up, which is the
/// honest semantics of rate sensing but leaves a stuck sensor
/// indistinguishable from a slow one. With a bound, the wait returns
/// [`SenseError::Timeout`] once the bound elapses with no transition.
pub fn measure_phase<In, C>(
    input: &mut In,
    clock: &mut C,
    timeout: Option<Duration>,
) -> Result<Duration, SenseError>
where
    In: DigitalInput,
    C: Clock,
{
    let initial = input.is_high();
    let start = clock.now();
    loop {
        let level = input.is_high();
        let now = clock.now();
        if level != initial {
            return Ok(now.duration_since(start));
        }
        if let Some(limit) = timeout {
            if now.duration_since(start) >= limit {
                return Err(SenseError::Timeout);
            }
        }
    }
}

/// Estimates rotational speed from consecutive transition timings.
///
/// `transitions_per_rev` is the number of signal transitions the sensor
/// produces per shaft revolution; it comes from the encoder's datasheet and
/// must be supplied by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RateEstimator {
    transitions_per_rev: u32,
    timeout: Option<Duration>,
}

const SECS_PER_MINUTE: f64 = 60.0;

impl RateEstimator {
    /// An estimator for a sensor producing `transitions_per_rev` transitions
    /// per shaft revolution, blocking indefinitely on each transition.
    pub fn new(transitions_per_rev: u32) -> Self {
        RateEstimator {
            transitions_per_rev,
            timeout: None,
        }
    }

    /// Bounds each transition wait; a sensor silent for longer than `timeout`
    /// makes [`RateEstimator::measure_rate`] return [`SenseError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured transitions per revolution.
    pub fn transitions_per_rev(&self) -> u32 {
        self.transitions_per_rev
    }

    /// Returns the configured per-transition wait bound, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Measures the current rotational speed in revolutions per minute.
    ///
    /// Accumulates elapsed time across `transitions_per_rev` consecutive
    /// transitions, one full revolution, and returns `60 / total_seconds`.
    ///
    /// # Errors
    /// - [`SenseError::Timeout`] if any single transition wait exceeds the
    ///   configured bound.
    /// - [`SenseError::UndefinedRate`] if the total elapsed time is zero.
    ///   Real transition waits always take time, but a synthetic source can
    ///   produce zero-duration samples; failing explicitly beats returning
    ///   an infinite rate.
    pub fn measure_rate<In, C>(&self, input: &mut In, clock: &mut C) -> Result<f64, SenseError>
    where
        In: DigitalInput,
        C: Clock,
    {
        let mut total = Duration::ZERO;
        for _ in 0..self.transitions_per_rev {
            total += measure_phase(input, clock, self.timeout)?;
        }
        let secs = total.as_secs_f64();
        if secs <= 0.0 {
            return Err(SenseError::UndefinedRate);
        }
        Ok(SECS_PER_MINUTE / secs)
    }
}

/// A state change observed by an [`EdgeMonitor`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Time elapsed since the previous event, or since the monitor was
    /// created for the first event.
    pub elapsed: Duration,
    /// Which of the two watched inputs changed; both can change in the same
    /// polling interval.
    pub channels: [bool; 2],
}

/// Watches a pair of digital inputs and timestamps every state change.
///
/// Useful for characterizing an unknown encoder: feeding the event stream to
/// a logger reveals the pulse pattern and its timing without any assumption
/// about transitions per revolution.
pub struct EdgeMonitor<A, B, C: Clock> {
    first: A,
    second: B,
    clock: C,
    timeout: Option<Duration>,
    levels: (bool, bool),
    origin: C::Instant,
}

impl<A, B, C> EdgeMonitor<A, B, C>
where
    A: DigitalInput,
    B: DigitalInput,
    C: Clock,
{
    /// Starts watching both inputs, capturing their current levels as the
    /// reference for the first event.
    pub fn new(mut first: A, mut second: B, mut clock: C) -> Self {
        let levels = (first.is_high(), second.is_high());
        let origin = clock.now();
        EdgeMonitor {
            first,
            second,
            clock,
            timeout: None,
            levels,
            origin,
        }
    }

    /// Bounds each wait; see [`RateEstimator::with_timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Blocks until either input changes state and reports the change.
    ///
    /// # Errors
    /// [`SenseError::Timeout`] if neither input changes within the configured
    /// bound.
    pub fn next_event(&mut self) -> Result<EdgeEvent, SenseError> {
        let (prev_a, prev_b) = self.levels;
        loop {
            let a = self.first.is_high();
            let b = self.second.is_high();
            let now = self.clock.now();
            if a != prev_a || b != prev_b {
                let elapsed = now.duration_since(self.origin);
                self.levels = (a, b);
                self.origin = now;
                return Ok(EdgeEvent {
                    elapsed,
                    channels: [a != prev_a, b != prev_b],
                });
            }
            if let Some(limit) = self.timeout {
                if now.duration_since(self.origin) >= limit {
                    return Err(SenseError::Timeout);
                }
            }
        }
    }
}
