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

#[cfg(test)]
#[allow(dead_code)]
pub mod test_pid {

    use tacho_pid::pid::*;

    pub fn make_controller() -> (FuncPidController<f64>, PidContext<f64>) {
        let config = PidConfig::default();
        let controller = FuncPidController::new(config);
        let ctx = PidContext::new();
        (controller, ctx)
    }

    pub fn make_stateful_controller() -> PidController<f64> {
        let config = PidConfig::default();
        PidController::new(config)
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub mod test_io {

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use tacho_pid::hal::{Clock, DigitalInput, PwmOutput};
    use tacho_pid::time::Micros;

    /// Virtual time in microseconds, shared between a scripted input and the
    /// clock observing it.
    #[derive(Clone, Default)]
    pub struct VirtualTime(Rc<Cell<u64>>);

    impl VirtualTime {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get(&self) -> u64 {
            self.0.get()
        }

        pub fn advance(&self, micros: u64) {
            self.0.set(self.0.get() + micros);
        }
    }

    /// Observes the shared virtual time without advancing it; time only moves
    /// when an input is polled.
    pub struct VirtualClock {
        time: VirtualTime,
    }

    impl VirtualClock {
        pub fn new(time: VirtualTime) -> Self {
            VirtualClock { time }
        }
    }

    impl Clock for VirtualClock {
        type Instant = Micros;

        fn now(&mut self) -> Micros {
            Micros(self.time.get())
        }
    }

    /// A square wave with the given half period; each poll costs `step_us` of
    /// virtual time.
    pub struct PulseInput {
        time: VirtualTime,
        half_period_us: u64,
        step_us: u64,
    }

    impl PulseInput {
        pub fn new(time: VirtualTime, half_period_us: u64, step_us: u64) -> Self {
            PulseInput {
                time,
                half_period_us,
                step_us,
            }
        }
    }

    impl DigitalInput for PulseInput {
        fn is_high(&mut self) -> bool {
            self.time.advance(self.step_us);
            (self.time.get() / self.half_period_us) % 2 == 0
        }
    }

    /// A square wave that freezes at whatever level it held once virtual time
    /// passes `dies_at_us`, imitating a sensor that falls off the shaft.
    pub struct DyingPulseInput {
        time: VirtualTime,
        half_period_us: u64,
        step_us: u64,
        dies_at_us: u64,
    }

    impl DyingPulseInput {
        pub fn new(time: VirtualTime, half_period_us: u64, step_us: u64, dies_at_us: u64) -> Self {
            DyingPulseInput {
                time,
                half_period_us,
                step_us,
                dies_at_us,
            }
        }
    }

    impl DigitalInput for DyingPulseInput {
        fn is_high(&mut self) -> bool {
            self.time.advance(self.step_us);
            let t = self.time.get().min(self.dies_at_us);
            (t / self.half_period_us) % 2 == 0
        }
    }

    /// An input stuck at a fixed level; polls still cost virtual time, so a
    /// bounded wait can expire.
    pub struct StuckInput {
        time: VirtualTime,
        level: bool,
        step_us: u64,
    }

    impl StuckInput {
        pub fn new(time: VirtualTime, level: bool, step_us: u64) -> Self {
            StuckInput {
                time,
                level,
                step_us,
            }
        }
    }

    impl DigitalInput for StuckInput {
        fn is_high(&mut self) -> bool {
            self.time.advance(self.step_us);
            self.level
        }
    }

    /// An input that toggles on every poll while no virtual time passes,
    /// producing transitions of exactly zero duration.
    #[derive(Default)]
    pub struct ChatterInput {
        level: bool,
    }

    impl DigitalInput for ChatterInput {
        fn is_high(&mut self) -> bool {
            self.level = !self.level;
            self.level
        }
    }

    /// Records every duty cycle applied to it. Clones share the recording,
    /// so a test can keep a handle while the session owns the endpoint.
    #[derive(Clone, Default)]
    pub struct RecordingPwm {
        commands: Rc<RefCell<Vec<f64>>>,
    }

    impl RecordingPwm {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn commands(&self) -> Vec<f64> {
            self.commands.borrow().clone()
        }

        pub fn len(&self) -> usize {
            self.commands.borrow().len()
        }

        pub fn is_empty(&self) -> bool {
            self.commands.borrow().is_empty()
        }

        pub fn last(&self) -> Option<f64> {
            self.commands.borrow().last().copied()
        }
    }

    impl PwmOutput for RecordingPwm {
        fn set_duty_cycle(&mut self, percent: f64) {
            self.commands.borrow_mut().push(percent);
        }
    }
}
