pub mod config;
pub mod observer;
pub mod scheduler;
pub mod simulation;
pub mod topology;
pub mod transport;

use tracing_log::AsTrace;

/// Route both `tracing` events and `log` records from the protocol core to a
/// formatted stdout subscriber
pub fn setup_logger(level: log::LevelFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_log::LogTracer::builder()
        .with_max_level(level)
        .init()?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.as_trace())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
