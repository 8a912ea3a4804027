#![warn(missing_docs)]

//! # Closed-Loop DC Motor Speed Control
//!
//! This library closes a speed control loop around a DC motor: it times the
//! edges of an encoder signal to estimate rotational speed, runs a discrete
//! PID (Proportional-Integral-Derivative) controller on the speed loss, and
//! commands a PWM actuator with the clamped result.
//!
//! ## Features
//!
//! - A discrete PID controller over caller-owned state:
//!   - Configurable and fully validated PID gains.
//!   - A functionally pure control law, plus a one-call recurrence step that
//!     threads the accumulated and previous loss explicitly.
//!   - A stateful variant for callers that prefer embedded state.
//!
//! - Feedback-derived process variable estimation:
//!   - Rotational speed from elapsed time across a configurable number of
//!     input transitions per shaft revolution.
//!   - Blocking-by-default sensing with an opt-in timeout bound, so a stuck
//!     sensor surfaces as an error instead of a silent hang.
//!
//! - A session driver that sequences compute → clamp → apply → measure each
//!   iteration, checks an external stop flag between iterations, and reports
//!   per-iteration samples to a pluggable telemetry sink.
//!
//! Hardware access stays behind the [`hal`] traits; any platform GPIO/PWM
//! crate (or a test double) can provide the endpoints.
//!
//! ## Usage
//!
//! ### Functional PID controller
//!
//! The functional controller lets you explicitly manage the recurrence state.
//! In exchange it holds no mutable state, and both `control` and `step` are
//! functionally pure, making them exceptionally easy to test. If the PID
//! configuration is final, the controller itself can be non-`mut`.
//!
//! ```rust
//! use tacho_pid::pid::{FuncPidController, PidConfigBuilder, PidContext};
//!
//! let config = PidConfigBuilder::default()
//!     .kp(0.005)
//!     .ki(0.007)
//!     .kd(0.001)
//!     .build()
//!     .expect("Invalid PID config");
//! let pid = FuncPidController::new(config);
//!
//! let setpoint: f64 = 6000.0; // RPM
//! let measured = 0.0;
//!
//! let ctx = PidContext::new();
//! let (output, ctx) = pid.step(ctx, setpoint, measured);
//!
//! // The output is unclamped; bound it to the actuator's range yourself
//! let command = output.clamp(0.0, 100.0);
//! ```
//!
//! ### Measuring a rate from edge timings
//!
//! ```rust
//! use core::time::Duration;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use tacho_pid::encoder::RateEstimator;
//! use tacho_pid::hal::{Clock, DigitalInput};
//! use tacho_pid::time::Micros;
//!
//! // A simulated shaft turning once every 10 ms, seen through an encoder
//! // that toggles its output twice per revolution. Polling the input costs
//! // 10 us of virtual time.
//! #[derive(Clone)]
//! struct VirtualTime(Rc<Cell<u64>>);
//!
//! struct Encoder(VirtualTime);
//! impl DigitalInput for Encoder {
//!     fn is_high(&mut self) -> bool {
//!         let t = self.0 .0.get() + 10;
//!         self.0 .0.set(t);
//!         (t / 5_000) % 2 == 0
//!     }
//! }
//!
//! struct VirtualClock(VirtualTime);
//! impl Clock for VirtualClock {
//!     type Instant = Micros;
//!     fn now(&mut self) -> Micros {
//!         Micros(self.0 .0.get())
//!     }
//! }
//!
//! let time = VirtualTime(Rc::new(Cell::new(0)));
//! let mut encoder = Encoder(time.clone());
//! let mut clock = VirtualClock(time);
//!
//! let estimator = RateEstimator::new(2).with_timeout(Duration::from_secs(2));
//! let rpm = estimator
//!     .measure_rate(&mut encoder, &mut clock)
//!     .expect("encoder produced no transitions");
//! assert!((rpm - 6000.0).abs() < 50.0);
//! ```
//!
//! ### Driving a full session
//!
//! [`control::SpeedLoop`] wires a controller, an estimator, and the hardware
//! endpoints together and iterates until a stop flag is raised:
//!
//! ```rust,ignore
//! let mut speed_loop = SpeedLoop::new(pid, config, input_pin, pwm, SystemClock);
//! let stop = AtomicBool::new(false);
//! speed_loop.run(&stop, &mut |sample: LoopSample| {
//!     println!("{} {:.0} {:.1}", sample.iteration, sample.rate_rpm, sample.command);
//! })?;
//! ```
//!
//! ## Windup
//!
//! The accumulated loss is deliberately unbounded: while the actuator
//! saturates, the integral term keeps growing, exactly as the plain
//! recurrence prescribes. Tie the loop gains to the actuator range with that
//! in mind, or keep the integral gain small.
#![no_std]

#[cfg(feature = "std")]
extern crate std;

/// The PID controller and the caller-owned discrete-time recurrence state.
pub mod pid;

/// Time-related utilities: instant types for edge timestamping.
pub mod time;

/// The interface boundary to platform GPIO, PWM, and clock facilities.
pub mod hal;

/// Rate estimation from the edge timings of a digital input.
pub mod encoder;

/// The closed-loop speed control session.
pub mod control;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
