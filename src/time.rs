// Defines a trait for time-like objects and provides several implementations
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

use core::fmt::Debug;
use core::time::Duration;

/// A trait for time-like objects that can measure elapsed time.
///
/// The rate estimator timestamps signal edges with instants of this type and
/// subtracts consecutive timestamps to obtain phase durations; the same
/// subtraction drives the optional timeout bound on a blocking wait. Any
/// monotonic tick counter qualifies; wrap it and implement `duration_since`.
pub trait InstantLike: Sized + Clone + Copy + Debug + PartialEq<Self> + Send + Sync + Unpin {
    /// Returns the amount of time elapsed from another instant to this one.
    #[must_use]
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// An instant counted in whole microseconds since an arbitrary epoch.
///
/// Millisecond resolution is too coarse to time the edges of a fast encoder;
/// a motor turning at 6000 RPM with 14 transitions per revolution produces an
/// edge roughly every 700 microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Micros(pub u64);

impl InstantLike for Micros {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0 - earlier.0)
    }
}

/// A convenient wrapper around `std::time::Instant` satisfying the
/// [`InstantLike`] trait.
#[cfg(feature = "std")]
mod std_instant {

    use super::{Duration, InstantLike};

    /// Wrapper around `std::time::Instant`.
    #[derive(Debug, Clone, Copy)]
    pub struct StdInstant(pub std::time::Instant);

    impl StdInstant {
        /// The current instant of the monotonic system clock.
        pub fn now() -> Self {
            StdInstant(std::time::Instant::now())
        }
    }

    impl InstantLike for StdInstant {
        fn duration_since(&self, other: Self) -> Duration {
            self.0.duration_since(other.0)
        }
    }

    impl PartialEq for StdInstant {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    /// Tests that StdInstant is just one constructor call away from
    /// std::time::Instant and that duration_since forwards to the same method
    /// on the underlying Instant.
    #[cfg(test)]
    #[test]
    fn test_std_instant_wrapper() {
        let start = StdInstant::now();
        let end = StdInstant(std::time::Instant::now());
        let result = end.duration_since(start);
        let expected = end.0.duration_since(start.0);
        assert_eq!(result, expected);
    }
}

#[cfg(feature = "std")]
pub use std_instant::StdInstant;
