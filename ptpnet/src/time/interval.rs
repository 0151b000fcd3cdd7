/// A log2 representation of seconds, used for the pacing of synchronization
/// rounds
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Interval(i8);

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval")
            .field("seconds", &self.seconds())
            .field("log_base_2", &self.0)
            .finish()
    }
}

impl Interval {
    /// An Interval of one second
    pub const ONE_SECOND: Self = Self(0);

    /// Construct an [`Interval`] from log2 seconds.
    ///
    /// # Example
    /// ```
    /// # use ptpnet::time::{Duration, Interval};
    /// assert_eq!(Interval::from_log_2(2).as_duration(), Duration::from_secs(4));
    /// assert_eq!(Interval::from_log_2(-2).as_duration(), Duration::from_millis(250));
    /// ```
    pub const fn from_log_2(log_2: i8) -> Self {
        Self(log_2)
    }

    /// Turn `self` into a number of seconds as [`f64`]
    pub fn seconds(self) -> f64 {
        2.0f64.powi(self.0 as i32)
    }

    /// Turn this into a [`ptpnet::time::Duration`](`crate::time::Duration`)
    pub fn as_duration(self) -> super::Duration {
        super::Duration::from_interval(self)
    }

    /// Get the log2 of the numbers of seconds of this [`Interval`]
    pub fn as_log_2(self) -> i8 {
        self.0
    }
}

impl From<i8> for Interval {
    fn from(value: i8) -> Self {
        Self::from_log_2(value)
    }
}
