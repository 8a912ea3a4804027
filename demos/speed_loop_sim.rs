//! Closed-loop simulation of PID speed control of a brushed DC motor.
//! This example requires the `--features simulation` flag to be enabled.
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

use nalgebra as na;

use tacho_pid::control::CommandLimits;
use tacho_pid::pid::{PidConfigBuilder, PidController};
use tacho_pid::sim::{self, DcMotor};

const SETPOINT_RPM: f64 = 6.0;
const SUPPLY_VOLTS: f64 = 12.0;
const CONTROL_DT: f64 = 0.01;
const PLANT_SUBSTEPS: usize = 10;

fn main() {
    let config = PidConfigBuilder::default()
        .kp(2.0)
        .ki(0.05)
        .build()
        .expect("Invalid PID config");
    let mut pid = PidController::new(config);
    let limits = CommandLimits::default();

    // Classic bench-example motor parameters
    let motor = DcMotor {
        resistance: 1.0,
        inductance: 0.5,
        back_emf: 0.01,
        torque_constant: 0.01,
        inertia: 0.01,
        damping: 0.1,
    };

    let mut state = na::Vector2::<f64>::zeros();
    let mut speed_rpm = 0.0;

    println!("{:>5} {:>10} {:>10}", "iter", "rpm", "duty");
    for i in 0..4000usize {
        let command = limits.clamp(pid.step(SETPOINT_RPM, speed_rpm));

        // Zero-order hold: the duty cycle stays constant while the plant
        // integrates through the control period
        let volts = command / 100.0 * SUPPLY_VOLTS;
        let dt = CONTROL_DT / PLANT_SUBSTEPS as f64;
        for _ in 0..PLANT_SUBSTEPS {
            state = sim::rk4_step(|x| motor.f(x, volts), state, dt);
        }
        speed_rpm = motor.h(state) * sim::RADS_TO_RPM;

        if i % 200 == 0 {
            println!("{:>5} {:>10.3} {:>10.2}", i, speed_rpm, command);
        }
    }
}
