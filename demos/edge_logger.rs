//! Logs edge timestamps from a pair of free-running square-wave inputs.
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

use std::time::{Duration, Instant};

use tacho_pid::encoder::EdgeMonitor;
use tacho_pid::hal::{DigitalInput, SystemClock};

/// A free-running square wave standing in for a hardware input pin.
struct SquareWave {
    epoch: Instant,
    half_period: Duration,
}

impl DigitalInput for SquareWave {
    fn is_high(&mut self) -> bool {
        let phase = self.epoch.elapsed().as_micros() / self.half_period.as_micros();
        phase % 2 == 0
    }
}

fn main() {
    let epoch = Instant::now();
    let first = SquareWave {
        epoch,
        half_period: Duration::from_millis(3),
    };
    let second = SquareWave {
        epoch,
        half_period: Duration::from_millis(5),
    };

    let mut monitor =
        EdgeMonitor::new(first, second, SystemClock).with_timeout(Duration::from_secs(2));

    for _ in 0..20 {
        match monitor.next_event() {
            Ok(event) => println!(
                "{:>12.6} s  channels {:?}",
                event.elapsed.as_secs_f64(),
                event.channels
            ),
            Err(err) => {
                eprintln!("sensing fault: {err}");
                break;
            }
        }
    }
}
