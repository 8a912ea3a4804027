//! The closed-loop speed control session.
//!
//! Each iteration strictly sequences: compute the control output from the
//! last measured rate, clamp it to the actuator's valid range, apply it, then
//! block on the encoder for the next measurement. The recurrence state
//! ([`crate::pid::PidContext`]) is committed only once the measurement
//! succeeds, so a failed iteration mutates nothing and can simply be retried.
//!
//! The loop runs until an external stop flag is raised or the sensor faults;
//! there is no internal exit condition, mirroring the always-on nature of a
//! speed governor.

#[cfg(not(feature = "std"))]
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use crate::encoder::{RateEstimator, SenseError};
use crate::hal::{Clock, DigitalInput, PwmOutput};
use crate::pid::{FuncPidController, PidContext};

/// Errors raised when a speed loop configuration fails validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum LoopConfigError {
    /// The setpoint was negative or not finite.
    #[cfg_attr(feature = "std", error("setpoint must be finite and non-negative"))]
    InvalidSetpoint,

    /// The command limits were not finite or not ordered.
    #[cfg_attr(
        feature = "std",
        error("command limits must be finite with min strictly below max")
    )]
    InvalidCommandLimits,

    /// The transitions-per-revolution count was zero.
    #[cfg_attr(feature = "std", error("transitions per revolution must be at least 1"))]
    InvalidTransitionsPerRev,

    /// The sensing timeout was zero.
    #[cfg_attr(feature = "std", error("sensing timeout must be positive"))]
    InvalidTimeout,
}

#[cfg(not(feature = "std"))]
impl fmt::Display for LoopConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LoopConfigError::InvalidSetpoint => "setpoint must be finite and non-negative",
            LoopConfigError::InvalidCommandLimits => {
                "command limits must be finite with min strictly below max"
            }
            LoopConfigError::InvalidTransitionsPerRev => {
                "transitions per revolution must be at least 1"
            }
            LoopConfigError::InvalidTimeout => "sensing timeout must be positive",
        };
        f.write_str(msg)
    }
}

/// The valid range of an actuator command, in percent duty cycle.
///
/// Clamping is a hard floor and ceiling with no smoothing or rate limiting:
/// the applied command is exactly `max(min, min(max, raw))`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CommandLimits {
    min: f64,
    max: f64,
}

impl Default for CommandLimits {
    /// The full duty cycle range, 0 to 100 percent.
    fn default() -> Self {
        CommandLimits {
            min: 0.0,
            max: 100.0,
        }
    }
}

impl CommandLimits {
    /// Builds limits from a lower and upper bound.
    ///
    /// # Errors
    /// [`LoopConfigError::InvalidCommandLimits`] unless both bounds are
    /// finite and `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, LoopConfigError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(LoopConfigError::InvalidCommandLimits);
        }
        Ok(CommandLimits { min, max })
    }

    /// Returns the lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns the upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamps a raw controller output into the valid command range.
    #[must_use]
    pub fn clamp(&self, raw: f64) -> f64 {
        raw.clamp(self.min, self.max)
    }
}

/// Validated configuration of a speed control session.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedLoopConfig {
    setpoint_rpm: f64,
    limits: CommandLimits,
    transitions_per_rev: u32,
    sense_timeout: Option<Duration>,
}

impl SpeedLoopConfig {
    /// Returns the target speed in revolutions per minute.
    pub fn setpoint_rpm(&self) -> f64 {
        self.setpoint_rpm
    }

    /// Returns the actuator command range.
    pub fn limits(&self) -> CommandLimits {
        self.limits
    }

    /// Returns the sensor's transitions per shaft revolution.
    pub fn transitions_per_rev(&self) -> u32 {
        self.transitions_per_rev
    }

    /// Returns the per-transition sensing bound, if one is configured.
    pub fn sense_timeout(&self) -> Option<Duration> {
        self.sense_timeout
    }
}

/// Fluent builder for [`SpeedLoopConfig`], validating at `build`.
///
/// Defaults: zero setpoint, full 0–100 command range, one transition per
/// revolution, and unbounded (blocking) sensing.
#[derive(Copy, Clone, Debug)]
pub struct SpeedLoopConfigBuilder {
    setpoint_rpm: f64,
    limits: CommandLimits,
    transitions_per_rev: u32,
    sense_timeout: Option<Duration>,
}

impl Default for SpeedLoopConfigBuilder {
    fn default() -> Self {
        SpeedLoopConfigBuilder {
            setpoint_rpm: 0.0,
            limits: CommandLimits::default(),
            transitions_per_rev: 1,
            sense_timeout: None,
        }
    }
}

impl SpeedLoopConfigBuilder {
    /// Sets the target speed in revolutions per minute.
    pub fn setpoint_rpm(mut self, setpoint_rpm: f64) -> Self {
        self.setpoint_rpm = setpoint_rpm;
        self
    }

    /// Sets the actuator command range.
    pub fn limits(mut self, limits: CommandLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the sensor's transitions per shaft revolution. The value comes
    /// from the encoder hardware; a slotted disc with 7 vanes produces 14
    /// transitions per revolution.
    pub fn transitions_per_rev(mut self, transitions_per_rev: u32) -> Self {
        self.transitions_per_rev = transitions_per_rev;
        self
    }

    /// Bounds each transition wait. Without this the loop blocks for as long
    /// as the sensor stays silent.
    pub fn sense_timeout(mut self, timeout: Duration) -> Self {
        self.sense_timeout = Some(timeout);
        self
    }

    /// Validates the accumulated settings and produces the config.
    pub fn build(self) -> Result<SpeedLoopConfig, LoopConfigError> {
        if !self.setpoint_rpm.is_finite() || self.setpoint_rpm < 0.0 {
            return Err(LoopConfigError::InvalidSetpoint);
        }
        if self.transitions_per_rev == 0 {
            return Err(LoopConfigError::InvalidTransitionsPerRev);
        }
        if self.sense_timeout == Some(Duration::ZERO) {
            return Err(LoopConfigError::InvalidTimeout);
        }
        Ok(SpeedLoopConfig {
            setpoint_rpm: self.setpoint_rpm,
            limits: self.limits,
            transitions_per_rev: self.transitions_per_rev,
            sense_timeout: self.sense_timeout,
        })
    }
}

/// Lifecycle of a [`SpeedLoop`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// `run` is iterating.
    Running,
    /// The stop flag was observed; the loop exits before the next iteration.
    Stopping,
    /// The loop is not executing, either before `run` or after it returned.
    Stopped,
}

/// One completed iteration, as reported to a [`Telemetry`] sink.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoopSample {
    /// Zero-based index of the completed iteration.
    pub iteration: u64,
    /// The rate measured at the end of the iteration, in RPM.
    pub rate_rpm: f64,
    /// The clamped command applied during the iteration, in percent.
    pub command: f64,
}

/// Observational sink for per-iteration samples.
///
/// Purely one-way: nothing a sink does feeds back into control. The unit type
/// is the null sink, and any `FnMut(LoopSample)` closure qualifies.
pub trait Telemetry {
    /// Receives one completed iteration.
    fn record(&mut self, sample: LoopSample);
}

impl Telemetry for () {
    fn record(&mut self, _sample: LoopSample) {}
}

impl<F: FnMut(LoopSample)> Telemetry for F {
    fn record(&mut self, sample: LoopSample) {
        self(sample)
    }
}

/// A closed-loop speed control session over one input pin and one PWM output.
///
/// Owns the controller, the recurrence state, and the hardware endpoints for
/// the lifetime of the session. The measured rate starts at zero: the first
/// iteration therefore sees the full setpoint as its loss and drives the
/// actuator hard, which is what spins the motor up enough to produce the
/// transitions the first measurement blocks on.
pub struct SpeedLoop<In, Pwm, C: Clock> {
    controller: FuncPidController<f64>,
    config: SpeedLoopConfig,
    estimator: RateEstimator,
    input: In,
    pwm: Pwm,
    clock: C,
    ctx: PidContext<f64>,
    measured_rpm: f64,
    last_command: f64,
    iteration: u64,
    state: LoopState,
}

impl<In, Pwm, C> SpeedLoop<In, Pwm, C>
where
    In: DigitalInput,
    Pwm: PwmOutput,
    C: Clock,
{
    /// Builds a session from a controller, a validated config, and the
    /// hardware endpoints.
    pub fn new(
        controller: FuncPidController<f64>,
        config: SpeedLoopConfig,
        input: In,
        pwm: Pwm,
        clock: C,
    ) -> Self {
        let mut estimator = RateEstimator::new(config.transitions_per_rev);
        if let Some(timeout) = config.sense_timeout {
            estimator = estimator.with_timeout(timeout);
        }
        SpeedLoop {
            controller,
            config,
            estimator,
            input,
            pwm,
            clock,
            ctx: PidContext::new(),
            measured_rpm: 0.0,
            last_command: 0.0,
            iteration: 0,
            state: LoopState::Stopped,
        }
    }

    /// Seeds the session with a known current rate, for resuming control of
    /// a motor that is already turning. Also seeds the previous loss so the
    /// first iteration sees no derivative kick.
    pub fn with_initial_rate(mut self, rate_rpm: f64) -> Self {
        self.measured_rpm = rate_rpm;
        self.ctx = PidContext::with_initial_loss(self.config.setpoint_rpm - rate_rpm);
        self
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SpeedLoopConfig {
        &self.config
    }

    /// Returns the session lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns the most recently applied actuator command, in percent.
    pub fn last_command(&self) -> f64 {
        self.last_command
    }

    /// Returns the most recent successful rate measurement, in RPM.
    pub fn measured_rpm(&self) -> f64 {
        self.measured_rpm
    }

    /// Returns the recurrence state as of the last successful iteration.
    pub fn context(&self) -> &PidContext<f64> {
        &self.ctx
    }

    /// Executes one iteration: compute, clamp, apply, measure.
    ///
    /// On success, commits the advanced recurrence state and the fresh
    /// measurement, and returns the iteration's sample. On a sensing error
    /// the recurrence state and measurement are left exactly as they were:
    /// the command computed from the last good measurement stays applied, and
    /// calling `iterate` again replays the same command and retries the
    /// measurement.
    pub fn iterate(&mut self) -> Result<LoopSample, SenseError> {
        let (raw, next_ctx) =
            self.controller
                .step(self.ctx, self.config.setpoint_rpm, self.measured_rpm);
        let command = self.config.limits.clamp(raw);
        self.pwm.set_duty_cycle(command);
        self.last_command = command;

        let rate_rpm = self
            .estimator
            .measure_rate(&mut self.input, &mut self.clock)?;

        self.ctx = next_ctx;
        self.measured_rpm = rate_rpm;
        let sample = LoopSample {
            iteration: self.iteration,
            rate_rpm,
            command,
        };
        self.iteration += 1;
        Ok(sample)
    }

    /// Iterates until `stop` is raised or the sensor faults.
    ///
    /// The stop flag is checked between iterations, never mid-iteration; a
    /// raised flag moves the session through `Stopping` to `Stopped` without
    /// running another iteration. Each successful iteration is reported to
    /// `telemetry`.
    ///
    /// # Errors
    /// Forwards the first [`SenseError`] from an iteration; the session is
    /// left `Stopped` and can be resumed by calling `run` again.
    pub fn run(
        &mut self,
        stop: &AtomicBool,
        telemetry: &mut impl Telemetry,
    ) -> Result<(), SenseError> {
        self.state = LoopState::Running;
        loop {
            if stop.load(Ordering::Relaxed) {
                self.state = LoopState::Stopping;
            }
            if self.state == LoopState::Stopping {
                break;
            }
            match self.iterate() {
                Ok(sample) => telemetry.record(sample),
                Err(err) => {
                    self.state = LoopState::Stopped;
                    return Err(err);
                }
            }
        }
        self.state = LoopState::Stopped;
        Ok(())
    }
}
