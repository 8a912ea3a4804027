// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

#[cfg(feature = "simulation")]
mod test_plant_models {

    use approx::assert_relative_eq;
    use nalgebra as na;

    use tacho_pid::sim::{self, DcMotor};

    #[test]
    fn test_rk4_matches_analytic_exponential_decay() {
        let mut x = na::Vector1::new(1.0);
        for _ in 0..100 {
            x = sim::rk4_step(|x| -x, x, 0.01);
        }
        assert_relative_eq!(x[0], (-1.0f64).exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_motor_settles_at_its_dc_gain() {
        let motor = DcMotor {
            resistance: 1.0,
            inductance: 0.5,
            back_emf: 0.01,
            torque_constant: 0.01,
            inertia: 0.01,
            damping: 0.1,
        };

        let mut state = na::Vector2::zeros();
        for _ in 0..10_000 {
            state = sim::rk4_step(|x| motor.f(x, 1.0), state, 0.001);
        }

        assert_relative_eq!(
            motor.h(state),
            motor.steady_state_speed(1.0),
            max_relative = 1e-3
        );
    }
}

#[cfg(feature = "simulation")]
mod test_closed_loop {

    use nalgebra as na;

    use tacho_pid::control::CommandLimits;
    use tacho_pid::pid::{FuncPidController, PidConfig, PidContext};
    use tacho_pid::sim::{self, AccumulatorPlant, DcMotor};

    /// Drives the discrete recurrence against the motor model: compute,
    /// clamp, apply as a zero-order-held armature voltage, integrate the
    /// plant through one control period, then feed the speed back.
    #[test]
    fn test_recurrence_converges_on_the_motor_model() {
        const SETPOINT_RPM: f64 = 6.0;
        const SUPPLY_VOLTS: f64 = 12.0;
        const CONTROL_DT: f64 = 0.01;
        const PLANT_SUBSTEPS: usize = 10;

        let controller = FuncPidController::new(PidConfig::new(2.0, 0.05, 0.0).unwrap());
        let limits = CommandLimits::default();

        let motor = DcMotor {
            resistance: 1.0,
            inductance: 0.5,
            back_emf: 0.01,
            torque_constant: 0.01,
            inertia: 0.01,
            damping: 0.1,
        };

        let mut ctx = PidContext::new();
        let mut state = na::Vector2::zeros();
        let mut speed_rpm = 0.0;

        for _ in 0..4000usize {
            let (raw, next_ctx) = controller.step(ctx, SETPOINT_RPM, speed_rpm);
            ctx = next_ctx;
            let command = limits.clamp(raw);

            let volts = command / 100.0 * SUPPLY_VOLTS;
            let dt = CONTROL_DT / PLANT_SUBSTEPS as f64;
            for _ in 0..PLANT_SUBSTEPS {
                state = sim::rk4_step(|x| motor.f(x, volts), state, dt);
            }
            speed_rpm = motor.h(state) * sim::RADS_TO_RPM;
        }

        // Integral action leaves no steady-state loss worth speaking of
        assert!(
            (SETPOINT_RPM - speed_rpm).abs() < 0.2,
            "speed settled at {speed_rpm} RPM"
        );
    }

    #[test]
    fn test_recurrence_converges_on_the_accumulator_plant() {
        const TARGET: f64 = 1.0;

        let controller = FuncPidController::new(PidConfig::new(0.005, 0.007, 0.001).unwrap());

        let mut plant = AccumulatorPlant::default();
        let mut ctx = PidContext::with_initial_loss(TARGET - plant.value);
        let mut current = plant.value;

        for _ in 0..3000usize {
            let (u, next_ctx) = controller.step(ctx, TARGET, current);
            ctx = next_ctx;
            current = plant.apply(u);
        }

        assert!(
            (TARGET - current).abs() < 0.05,
            "plant settled at {current}"
        );
    }
}
