//! Types that describe points in virtual time ([`Time`]), and durations
//! between two instants ([`Duration`], [`Interval`])
//!
//! All of these are plain signed nanosecond counts. The simulated network has
//! no notion of an epoch, a clock starts at zero and drifts from there.

mod duration;
mod instant;
mod interval;

pub use duration::Duration;
pub use instant::Time;
pub use interval::Interval;
