use core::{
    fmt::Display,
    ops::{Add, AddAssign, Div, Mul, Sub, SubAssign},
};

use super::Interval;

/// A signed span of virtual time, in whole nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    /// A duration of zero seconds
    pub const ZERO: Duration = Duration { nanos: 0 };

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

    /// Converts a log interval (as defined by IEEE 1588) to a duration
    pub fn from_interval(interval: Interval) -> Self {
        let seconds = interval.seconds();
        Self::from_nanos((seconds * 1e9) as i64)
    }

    pub const fn nanos(self) -> i64 {
        self.nanos
    }

    pub const fn abs(self) -> Self {
        Self::from_nanos(self.nanos.abs())
    }

    /// Scale by a real factor, truncating the fractional nanosecond towards
    /// zero.
    ///
    /// # Example
    /// ```
    /// # use ptpnet::time::Duration;
    /// assert_eq!(Duration::from_nanos(10_000).scale(1.0001), Duration::from_nanos(10_001));
    /// assert_eq!(Duration::from_nanos(1).scale(0.9999), Duration::ZERO);
    /// ```
    pub fn scale(self, factor: f64) -> Self {
        Self::from_nanos((self.nanos as f64 * factor) as i64)
    }

    /// `self + rhs`, or `None` if the result does not fit
    pub fn checked_add(self, rhs: Duration) -> Option<Self> {
        self.nanos.checked_add(rhs.nanos).map(Self::from_nanos)
    }

    /// `self * rhs`, or `None` if the result does not fit
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.nanos.checked_mul(rhs).map(Self::from_nanos)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        Duration::from_nanos(self.nanos + rhs.nanos)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Self::Output {
        Duration::from_nanos(self.nanos - rhs.nanos)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Self::Output {
        Duration::from_nanos(self.nanos * rhs)
    }
}

/// Integer division, truncating towards zero
impl Div<i64> for Duration {
    type Output = Duration;

    fn div(self, rhs: i64) -> Self::Output {
        Duration::from_nanos(self.nanos / rhs)
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ns", self.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_truncates_towards_zero() {
        assert_eq!(Duration::from_nanos(151) / 2, Duration::from_nanos(75));
        assert_eq!(Duration::from_nanos(-151) / 2, Duration::from_nanos(-75));
    }

    #[test]
    fn scale_boundaries() {
        assert_eq!(Duration::from_nanos(1).scale(1.0001), Duration::from_nanos(1));
        assert_eq!(
            Duration::from_nanos(10_000).scale(1.0001),
            Duration::from_nanos(10_001)
        );
        assert_eq!(Duration::from_nanos(1).scale(0.9999), Duration::ZERO);
        assert_eq!(
            Duration::from_secs(1).scale(1.0001),
            Duration::from_nanos(1_000_100_000)
        );
        assert_eq!(Duration::from_nanos(-3).scale(0.5), Duration::from_nanos(-1));
    }

    #[test]
    fn interval_conversion() {
        assert_eq!(
            Duration::from_interval(Interval::ONE_SECOND),
            Duration::from_secs(1)
        );
        assert_eq!(
            Duration::from_interval(Interval::from_log_2(-3)),
            Duration::from_millis(125)
        );
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(
            Duration::from_secs(2).checked_mul(3),
            Some(Duration::from_secs(6))
        );
        assert_eq!(Duration::from_secs(5).checked_mul(i64::MAX), None);
        assert_eq!(
            Duration::from_nanos(i64::MAX).checked_add(Duration::from_nanos(1)),
            None
        );
        assert_eq!(
            Duration::from_nanos(-1).checked_add(Duration::from_nanos(1)),
            Some(Duration::ZERO)
        );
    }
}
