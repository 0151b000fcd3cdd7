use core::{
    fmt::Display,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use super::Duration;

/// A point in virtual time, in nanoseconds.
///
/// Used both for the global simulator time and for the local time of an
/// individual (drifting) clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Time {
    nanos: i64,
}

impl Time {
    /// The start of virtual time
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create an instant that is `nanos` nanoseconds after the start of
    /// virtual time
    ///
    /// # Example
    /// ```
    /// # use ptpnet::time::Time;
    /// assert_eq!(Time::from_nanos(1_500).nanos(), 1_500);
    /// ```
    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub const fn from_micros(micros: i64) -> Self {
        Self::from_nanos(micros * 1_000)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self::from_nanos(millis * 1_000_000)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self::from_nanos(secs * 1_000_000_000)
    }

    /// Nanoseconds since the start of virtual time
    pub const fn nanos(self) -> i64 {
        self.nanos
    }

    /// Absolute distance between two instants
    pub fn abs_diff(self, other: Time) -> Duration {
        (self - other).abs()
    }

    /// `self + rhs`, or `None` if the result does not fit
    pub fn checked_add(self, rhs: Duration) -> Option<Time> {
        self.nanos.checked_add(rhs.nanos()).map(Time::from_nanos)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        Time::from_nanos(self.nanos + rhs.nanos())
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    fn sub(self, rhs: Duration) -> Self::Output {
        Time::from_nanos(self.nanos - rhs.nanos())
    }
}

impl SubAssign<Duration> for Time {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Time) -> Self::Output {
        Duration::from_nanos(self.nanos - rhs.nanos)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.nanos < 0 { "-" } else { "" };
        let abs = self.nanos.unsigned_abs();
        write!(f, "{sign}{}.{:09}s", abs / 1_000_000_000, abs % 1_000_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_arithmetic() {
        let a = Time::from_micros(3);
        let b = Time::from_nanos(1_250);
        assert_eq!(a - b, Duration::from_nanos(1_750));
        assert_eq!(b - a, Duration::from_nanos(-1_750));
        assert_eq!(b + Duration::from_nanos(1_750), a);
        assert_eq!(a - Duration::from_nanos(1_750), b);
        assert_eq!(a.abs_diff(b), b.abs_diff(a));
    }

    #[test]
    fn display() {
        assert_eq!(Time::from_millis(1_500).to_string(), "1.500000000s");
        assert_eq!(Time::from_nanos(-5).to_string(), "-0.000000005s");
    }
}
