#[cfg(not(feature = "std"))]
use core::fmt;

use num_traits::float::FloatCore;

/// Errors raised when a PID gain fails validation.
///
/// Gains are checked once, at configuration time. The control law itself
/// performs no validation and stays a pure arithmetic function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The proportional gain was zero, negative, or not finite.
    #[cfg_attr(feature = "std", error("proportional gain must be finite and positive"))]
    InvalidProportionalGain,

    /// The integral gain was negative or not finite.
    #[cfg_attr(feature = "std", error("integral gain must be finite and non-negative"))]
    InvalidIntegralGain,

    /// The derivative gain was negative or not finite.
    #[cfg_attr(feature = "std", error("derivative gain must be finite and non-negative"))]
    InvalidDerivativeGain,
}

#[cfg(not(feature = "std"))]
impl fmt::Display for PidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PidConfigError::InvalidProportionalGain => {
                "proportional gain must be finite and positive"
            }
            PidConfigError::InvalidIntegralGain => "integral gain must be finite and non-negative",
            PidConfigError::InvalidDerivativeGain => {
                "derivative gain must be finite and non-negative"
            }
        };
        f.write_str(msg)
    }
}

/// The validated gain triple of a PID controller.
///
/// All three gains are validated at construction; the setters re-validate, so
/// a `PidConfig` never holds a non-finite gain. The proportional gain must be
/// strictly positive; a controller that should do nothing is better expressed
/// by not calling it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<T> {
    kp: T,
    ki: T,
    kd: T,
}

impl<T: FloatCore> Default for PidConfig<T> {
    /// Unity proportional gain, no integral or derivative action.
    fn default() -> Self {
        PidConfig {
            kp: T::one(),
            ki: T::zero(),
            kd: T::zero(),
        }
    }
}

impl<T: FloatCore> PidConfig<T> {
    /// Builds a config from the three gains, validating each.
    pub fn new(kp: T, ki: T, kd: T) -> Result<Self, PidConfigError> {
        let mut config = PidConfig::default();
        config.set_gains(kp, ki, kd)?;
        Ok(config)
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> T {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> T {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> T {
        self.kd
    }

    /// Convenience method that returns all three gains together as a tuple.
    pub fn gains(&self) -> (T, T, T) {
        (self.kp, self.ki, self.kd)
    }

    /// Sets the proportional gain.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidProportionalGain`] if `kp` is zero, negative
    /// or not finite; the stored gain is left unchanged.
    pub fn set_kp(&mut self, kp: T) -> Result<(), PidConfigError> {
        if kp <= T::zero() || !kp.is_finite() {
            return Err(PidConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain. Zero is valid and disables integral action.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidIntegralGain`] if `ki` is negative or not
    /// finite; the stored gain is left unchanged.
    pub fn set_ki(&mut self, ki: T) -> Result<(), PidConfigError> {
        if ki < T::zero() || !ki.is_finite() {
            return Err(PidConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain. Zero is valid and disables derivative action.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidDerivativeGain`] if `kd` is negative or not
    /// finite; the stored gain is left unchanged.
    pub fn set_kd(&mut self, kd: T) -> Result<(), PidConfigError> {
        if kd < T::zero() || !kd.is_finite() {
            return Err(PidConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set all three gains together.
    pub fn set_gains(&mut self, kp: T, ki: T, kd: T) -> Result<(), PidConfigError> {
        self.set_kp(kp)?;
        self.set_ki(ki)?;
        self.set_kd(kd)
    }
}

/// Fluent builder for [`PidConfig`], validating at `build`.
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<T> {
    kp: T,
    ki: T,
    kd: T,
}

impl<T: FloatCore> Default for PidConfigBuilder<T> {
    fn default() -> Self {
        let config = PidConfig::default();
        PidConfigBuilder {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
        }
    }
}

impl<T: FloatCore> PidConfigBuilder<T> {
    /// Sets the proportional gain to apply at `build`.
    pub fn kp(mut self, kp: T) -> Self {
        self.kp = kp;
        self
    }

    /// Sets the integral gain to apply at `build`.
    pub fn ki(mut self, ki: T) -> Self {
        self.ki = ki;
        self
    }

    /// Sets the derivative gain to apply at `build`.
    pub fn kd(mut self, kd: T) -> Self {
        self.kd = kd;
        self
    }

    /// Validates the accumulated gains and produces the config.
    pub fn build(self) -> Result<PidConfig<T>, PidConfigError> {
        PidConfig::new(self.kp, self.ki, self.kd)
    }
}

/// Caller-owned state of the discrete-time recurrence.
///
/// The functional controller holds no mutable state; everything that varies
/// between iterations (the running sum of the loss and the loss of the
/// previous iteration) lives here and is threaded through
/// [`FuncPidController::step`] explicitly. The accumulated loss grows without
/// bound while the loss keeps its sign; see the crate docs for the windup
/// discussion.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<T> {
    aloss: T,
    prev_loss: T,
}

impl<T: FloatCore> PidContext<T> {
    /// A fresh context: zero accumulated loss, zero previous loss.
    ///
    /// With a zero previous loss the first `step` sees the full loss as its
    /// derivative. Use [`PidContext::with_initial_loss`] to suppress that
    /// first-iteration kick.
    pub fn new() -> Self {
        PidContext {
            aloss: T::zero(),
            prev_loss: T::zero(),
        }
    }

    /// A context seeded with the loss known before the first iteration, so
    /// the first derivative term is zero.
    pub fn with_initial_loss(loss: T) -> Self {
        PidContext {
            aloss: T::zero(),
            prev_loss: loss,
        }
    }

    /// Returns the running sum of the loss across all completed iterations.
    pub fn accumulated_loss(&self) -> T {
        self.aloss
    }

    /// Returns the loss recorded by the most recent iteration.
    pub fn previous_loss(&self) -> T {
        self.prev_loss
    }

    /// Clears the accumulated and previous loss.
    pub fn reset(&mut self) {
        *self = PidContext::new();
    }
}

impl<T: FloatCore> Default for PidContext<T> {
    fn default() -> Self {
        PidContext::new()
    }
}

/// A functional PID controller.
///
/// [`FuncPidController::control`] is a pure function of its three loss terms;
/// [`FuncPidController::step`] advances a caller-owned [`PidContext`] and is
/// pure in the functional-update sense: equal inputs produce equal outputs
/// and equal successor contexts. If the gains are final, the controller
/// itself can be non-`mut`.
pub struct FuncPidController<T> {
    config: PidConfig<T>,
}

impl<T: FloatCore> FuncPidController<T> {
    /// Wraps a validated config in a controller.
    pub fn new(config: PidConfig<T>) -> Self {
        FuncPidController { config }
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &PidConfig<T> {
        &self.config
    }

    /// Returns the controller's configuration for on-the-fly retuning.
    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        &mut self.config
    }

    /// The control law: `kp * loss + ki * aloss + kd * dloss`.
    ///
    /// The output is unclamped; bounding the command to the actuator's valid
    /// range is the caller's concern (see [`crate::control::CommandLimits`]).
    /// The argument order is the loss, then the accumulated loss, then the
    /// loss delta.
    #[must_use]
    pub fn control(&self, loss: T, aloss: T, dloss: T) -> T {
        self.config.kp * loss + self.config.ki * aloss + self.config.kd * dloss
    }

    /// One iteration of the discrete-time recurrence.
    ///
    /// Computes `loss = setpoint - measured`, folds it into the accumulated
    /// loss, differences it against the previous loss, and evaluates
    /// [`FuncPidController::control`] on the three terms. Returns the
    /// unclamped output together with the advanced context.
    #[must_use]
    pub fn step(&self, mut ctx: PidContext<T>, setpoint: T, measured: T) -> (T, PidContext<T>) {
        let loss = setpoint - measured;
        let aloss = ctx.aloss + loss;
        let dloss = loss - ctx.prev_loss;
        let output = self.control(loss, aloss, dloss);
        ctx.aloss = aloss;
        ctx.prev_loss = loss;
        (output, ctx)
    }
}

/// A stateful PID controller.
///
/// Embeds the [`PidContext`] inside the controller, saving the boilerplate of
/// threading it through every call at the cost of making `step` non-pure.
/// The controller **must** be `mut`.
pub struct PidController<T> {
    ctx: PidContext<T>,
    controller: FuncPidController<T>,
}

impl<T: FloatCore> PidController<T> {
    /// Builds a stateful controller with a fresh context.
    pub fn new(config: PidConfig<T>) -> Self {
        PidController {
            ctx: PidContext::new(),
            controller: FuncPidController::new(config),
        }
    }

    /// Builds a stateful controller whose first derivative term is zero; see
    /// [`PidContext::with_initial_loss`].
    pub fn with_initial_loss(config: PidConfig<T>, loss: T) -> Self {
        PidController {
            ctx: PidContext::with_initial_loss(loss),
            controller: FuncPidController::new(config),
        }
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &PidConfig<T> {
        self.controller.config()
    }

    /// Returns the controller's configuration for on-the-fly retuning.
    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        self.controller.config_mut()
    }

    /// Returns the embedded recurrence state.
    pub fn context(&self) -> &PidContext<T> {
        &self.ctx
    }

    /// One iteration of the discrete-time recurrence against the embedded
    /// context. Returns the unclamped output.
    pub fn step(&mut self, setpoint: T, measured: T) -> T {
        let (output, ctx) = self.controller.step(self.ctx, setpoint, measured);
        self.ctx = ctx;
        output
    }

    /// Clears the accumulated and previous loss.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }
}
