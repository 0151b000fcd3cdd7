use crate::{datastructures::messages::WIRE_SIZE, network::LinkId, time::Duration};

/// A deferred protocol step.
///
/// The caller receives these from [`NetworkAction::Schedule`] and must hand
/// them back through [`PtpNetwork::handle_event`](`super::PtpNetwork::handle_event`)
/// once the requested delay has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduledEvent {
    /// The master starts a new synchronization round
    StartRound,
    /// Send SYNC followed by FOLLOW_UP over `link`
    SendSyncFollowUp { link: LinkId, correlation_id: u32 },
    /// Send DELAY_REQ over `link`
    SendDelayReq { link: LinkId, correlation_id: u32 },
    /// Answer a DELAY_REQ received on `link`
    SendDelayResp { link: LinkId, correlation_id: u32 },
}

/// An action the [`PtpNetwork`](`super::PtpNetwork`) needs the user to perform
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum NetworkAction {
    /// Deliver `data` to the node at the other end of `link`, which will
    /// receive it on its own link back to the sender
    Send { link: LinkId, data: [u8; WIRE_SIZE] },
    /// Call [`PtpNetwork::handle_event`](`super::PtpNetwork::handle_event`)
    /// with `event` once `delay` has passed. Zero delays still go through the
    /// scheduler, after everything already queued for the same instant.
    Schedule {
        delay: Duration,
        event: ScheduledEvent,
    },
}

/// An Iterator over [`NetworkAction`]s
///
/// These are returned by [`PtpNetwork`](`super::PtpNetwork`) whenever the
/// library needs the user to perform actions. Actions must be performed in
/// the order they are yielded.
#[derive(Debug)]
#[must_use]
pub struct NetworkActionIterator {
    internal: core::iter::Fuse<std::vec::IntoIter<NetworkAction>>,
}

impl NetworkActionIterator {
    pub(super) fn from(list: Vec<NetworkAction>) -> Self {
        Self {
            internal: list.into_iter().fuse(),
        }
    }
}

impl Iterator for NetworkActionIterator {
    type Item = NetworkAction;

    fn next(&mut self) -> Option<Self::Item> {
        self.internal.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.internal.size_hint()
    }
}
