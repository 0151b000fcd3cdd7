use core::fmt::Display;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::clock::NodeId;

/// Index of a [`Link`] in the link registry of a
/// [`PtpNetwork`](`super::PtpNetwork`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LinkId(pub usize);

impl Display for LinkId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// One direction of an addressed connection between two neighboring clocks.
///
/// A physical connection between `a` and `b` is registered as two links, one
/// owned by each end. Messages sent on a link arrive at the remote node on its
/// link back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    local_id: NodeId,
    remote_id: NodeId,
    local_address: SocketAddrV4,
    remote_address: SocketAddrV4,
}

/// Parameters for [`PtpNetwork::add_link`](`super::PtpNetwork::add_link`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub local_id: NodeId,
    pub remote_id: NodeId,
    pub local_address: SocketAddrV4,
    pub remote_address: SocketAddrV4,
}

impl Link {
    pub(super) fn new(id: LinkId, config: LinkConfig) -> Self {
        Self {
            id,
            local_id: config.local_id,
            remote_id: config.remote_id,
            local_address: config.local_address,
            remote_address: config.remote_address,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn local_id(&self) -> NodeId {
        self.local_id
    }

    pub fn remote_id(&self) -> NodeId {
        self.remote_id
    }

    pub fn local_address(&self) -> Ipv4Addr {
        *self.local_address.ip()
    }

    pub fn local_port(&self) -> u16 {
        self.local_address.port()
    }

    pub fn remote_address(&self) -> Ipv4Addr {
        *self.remote_address.ip()
    }

    pub fn remote_port(&self) -> u16 {
        self.remote_address.port()
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {}({}) -> {}({})",
            self.id, self.local_id, self.local_address, self.remote_id, self.remote_address
        )
    }
}
