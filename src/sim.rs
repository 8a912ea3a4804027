use nalgebra as na;

/// Conversion factor from shaft speed in rad/s to revolutions per minute.
pub const RADS_TO_RPM: f64 = 60.0 / (2.0 * core::f64::consts::PI);

/// A brushed DC motor with armature dynamics.
pub struct DcMotor {
    /// Armature resistance, in ohms.
    pub resistance: f64,
    /// Armature inductance, in henries.
    pub inductance: f64,
    /// Back-EMF constant, in volt-seconds per radian.
    pub back_emf: f64,
    /// Torque constant, in newton-meters per ampere.
    pub torque_constant: f64,
    /// Rotor inertia, in kilogram-square-meters.
    pub inertia: f64,
    /// Viscous friction coefficient, in newton-meter-seconds per radian.
    pub damping: f64,
}

impl DcMotor {
    /// Implements the state-space realization of the motor's coupled
    /// electrical and mechanical dynamics, with armature voltage as input:
    /// ┌    ┐   ┌               ┐┌   ┐   ┌     ┐
    /// │ ω' │ = │ -b/J    Kt/J  ││ ω │ + │ 0   │ u
    /// │ i' │   │ -Ke/L   -R/L  ││ i │   │ 1/L │
    /// └    ┘   └               ┘└   ┘   └     ┘
    ///     ┌      ┐┌   ┐
    /// ω = │ 1  0 ││ ω │
    ///     └      ┘│ i │
    ///             └   ┘
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let mat_a = na::Matrix2::new(
            -self.damping / self.inertia,
            self.torque_constant / self.inertia,
            -self.back_emf / self.inductance,
            -self.resistance / self.inductance,
        );
        let mat_b = na::Vector2::new(0.0, 1.0 / self.inductance);

        mat_a * x + mat_b * u
    }

    /// Output map: shaft speed in rad/s.
    pub fn h(&self, x: na::Vector2<f64>) -> f64 {
        x[0]
    }

    /// Shaft speed the motor settles at under a constant armature voltage,
    /// from the DC gain of the state-space model.
    pub fn steady_state_speed(&self, u: f64) -> f64 {
        self.torque_constant * u
            / (self.resistance * self.damping + self.torque_constant * self.back_emf)
    }
}

/// A plant whose value moves by the full control output each step.
///
/// The crudest process a discrete controller can govern, handy for checking
/// the recurrence qualitatively before wiring up motor dynamics.
#[derive(Copy, Clone, Debug, Default)]
pub struct AccumulatorPlant {
    /// Current process value.
    pub value: f64,
}

impl AccumulatorPlant {
    /// Applies one control output and returns the updated process value.
    pub fn apply(&mut self, u: f64) -> f64 {
        self.value += u;
        self.value
    }
}

/// Advances `x` by one fixed step of the classic fourth-order Runge-Kutta
/// scheme under the vector field `f`.
pub fn rk4_step<const N: usize, F>(f: F, x: na::SVector<f64, N>, dt: f64) -> na::SVector<f64, N>
where
    F: Fn(na::SVector<f64, N>) -> na::SVector<f64, N>,
{
    let k1 = f(x);
    let k2 = f(x + k1 * (dt / 2.0));
    let k3 = f(x + k2 * (dt / 2.0));
    let k4 = f(x + k3 * dt);
    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}
