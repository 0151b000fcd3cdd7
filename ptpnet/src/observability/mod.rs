//! Reporting hooks and serializable views of the network state

mod snapshot;

pub use snapshot::{NetworkSnapshot, NodeSnapshot};

use crate::{clock::OffsetCorrection, network::ProtocolError, time::Time};

/// Receiver of per-round results and recoverable errors.
///
/// Implementations must not influence the protocol; the network behaves
/// identically with [`NoObservation`].
pub trait ObservationSink {
    /// A clock finished an exchange and corrected its local time
    fn offset_corrected(&mut self, now: Time, correction: &OffsetCorrection) {
        let _ = (now, correction);
    }

    /// A message or scheduled step was dropped
    fn protocol_error(&mut self, now: Time, error: &ProtocolError) {
        let _ = (now, error);
    }
}

/// Simple implementation when no observation is needed
#[derive(Debug, Copy, Clone, Default)]
pub struct NoObservation;

impl ObservationSink for NoObservation {}

impl<T: ObservationSink + ?Sized> ObservationSink for &mut T {
    fn offset_corrected(&mut self, now: Time, correction: &OffsetCorrection) {
        (**self).offset_corrected(now, correction)
    }

    fn protocol_error(&mut self, now: Time, error: &ProtocolError) {
        (**self).protocol_error(now, error)
    }
}
