use ordered_float::OrderedFloat;

use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};

/// The simulation clock, measured in simulated minutes.
///
/// Floating-point builtin types do not implement [`Ord`], which the event queue needs to sequence events, so the
/// clock value is wrapped in an [`OrderedFloat`]. The queue only ever produces values reachable from zero by adding
/// non-negative, finite delays, so a [`VirtualTime`] observed through the kernel is non-negative and monotonically
/// non-decreasing across a run.
///
/// [`OrderedFloat`]: https://docs.rs/ordered-float/4/ordered_float/struct.OrderedFloat.html
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualTime(OrderedFloat<f64>);

impl VirtualTime {
    /// The start of every run.
    pub const ZERO: Self = Self(OrderedFloat(0.0));

    /// Wrap a number of minutes. Returns `None` for negative or non-finite values.
    pub fn from_minutes(minutes: f64) -> Option<Self> {
        if minutes.is_finite() && minutes >= 0.0 {
            Some(Self(OrderedFloat(minutes)))
        } else {
            None
        }
    }

    /// The clock value as a plain number of minutes.
    pub fn as_minutes(self) -> f64 {
        self.0.into_inner()
    }
}

impl Add<f64> for VirtualTime {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Self(OrderedFloat(self.as_minutes() + rhs))
    }
}

/// Elapsed minutes between two instants.
impl Sub for VirtualTime {
    type Output = f64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.as_minutes() - rhs.as_minutes()
    }
}

impl From<u32> for VirtualTime {
    fn from(minutes: u32) -> Self {
        Self(OrderedFloat(f64::from(minutes)))
    }
}

impl Display for VirtualTime {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:.3}", self.as_minutes())
    }
}
