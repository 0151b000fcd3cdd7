use crate::{clock::NodeId, datastructures::WireFormatError, network::LinkId};

/// A recoverable problem with a single inbound message or scheduled step.
///
/// These are reported to the
/// [`ObservationSink`](`crate::observability::ObservationSink`) and logged;
/// the offending message is dropped and the network keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("clock {node} could not parse message: {error}")]
    Malformed {
        node: NodeId,
        #[source]
        error: WireFormatError,
    },
    #[error("clock {node} has no neighbor {neighbor}")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },
    #[error("clock {node} has no recorded timestamp for neighbor {neighbor}")]
    MissingTimestamp { node: NodeId, neighbor: NodeId },
    #[error("unknown link {0}")]
    UnknownLink(LinkId),
    #[error("unknown clock {0}")]
    UnknownClock(NodeId),
}

/// Invalid network construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("clock {0} was already added")]
    DuplicateClock(NodeId),
    #[error("clock {0} does not exist")]
    UnknownClock(NodeId),
    #[error("clock {0} cannot be linked to itself")]
    SelfLink(NodeId),
    #[error("clock {node} already has a link to {neighbor}")]
    DuplicateNeighbor { node: NodeId, neighbor: NodeId },
    #[error("master clock {0} was not added")]
    MissingMaster(NodeId),
}
