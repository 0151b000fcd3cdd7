//! Configuration of the synchronization engine and of individual clocks

mod clock;
mod network;

pub use clock::{ClockConfig, DriftRange};
pub use network::NetworkConfig;

/// Invalid configuration values
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid drift range [{min}, {max}]: bounds must be positive, finite and ordered")]
    InvalidDriftRange { min: f64, max: f64 },
}
