//! The simulated per-node clock and its synchronization state

use std::collections::HashMap;

use core::fmt::Display;

use crate::{
    config::ClockConfig,
    datastructures::messages::MessageKind,
    network::{LinkId, ProtocolError, SetupError},
    time::{Duration, Time},
};

/// Identity of a clock in the network, as carried on the wire
pub type NodeId = u16;

/// Synchronization state of a single clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ClockState {
    /// No SYNC has been seen yet
    #[default]
    Inactive,
    /// A SYNC was received, waiting for the matching FOLLOW_UP
    Active,
    /// A DELAY_REQ was sent, waiting for the DELAY_RESP
    Waiting,
    /// The offset correction has been applied at least once
    Synced,
}

impl Display for ClockState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ClockState::Inactive => "INACTIVE",
            ClockState::Active => "ACTIVE",
            ClockState::Waiting => "WAITING",
            ClockState::Synced => "SYNCED",
        };
        f.write_str(name)
    }
}

/// Number of messages sent and received, per message kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageCounters {
    sent: [u64; 4],
    received: [u64; 4],
}

impl MessageCounters {
    pub fn sent(&self, kind: MessageKind) -> u64 {
        self.sent[kind.index()]
    }

    pub fn received(&self, kind: MessageKind) -> u64 {
        self.received[kind.index()]
    }

    pub fn total_sent(&self) -> u64 {
        self.sent.iter().sum()
    }

    pub fn total_received(&self) -> u64 {
        self.received.iter().sum()
    }

    pub(crate) fn record_sent(&mut self, kind: MessageKind) {
        self.sent[kind.index()] += 1;
    }

    pub(crate) fn record_received(&mut self, kind: MessageKind) {
        self.received[kind.index()] += 1;
    }
}

/// Result of a single offset correction at one clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetCorrection {
    pub node: NodeId,
    /// Amount subtracted from the local time
    pub offset: Duration,
    /// Distance to the reference time before the correction
    pub offset_before: Duration,
    /// Distance to the reference time after the correction
    pub offset_after: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
struct NeighborTimestamps {
    sync_send: Option<Time>,
    delay_req_receive: Option<Time>,
}

/// A drifting clock participating in the network
///
/// Local time is integrated incrementally from the global simulator time:
/// every call to [`advance`](`PtpClock::advance`) adds the elapsed global time
/// scaled by the drift factor, truncated to whole nanoseconds. The master's
/// local time is the global time by definition.
#[derive(Debug, Clone)]
pub struct PtpClock {
    id: NodeId,
    hop: u16,
    is_master: bool,
    drift: f64,
    state: ClockState,

    local_time: Time,
    last_update: Time,

    links: Vec<LinkId>,
    neighbors: HashMap<NodeId, NeighborTimestamps>,

    // only used while acting as a slave
    sync_time_at_master: Time,
    delay_req_time_at_master: Time,
    sync_receive_time: Time,
    delay_req_send_time: Time,

    last_sync_id: Option<u32>,
    last_follow_up_id: Option<u32>,
    last_delay_req_id: Option<u32>,

    counters: MessageCounters,
    offset_before: Duration,
    offset_after: Duration,
}

impl PtpClock {
    /// A slave clock, starting INACTIVE at local time zero
    pub fn new(config: ClockConfig) -> Self {
        Self {
            id: config.id,
            hop: config.hop,
            is_master: false,
            drift: config.drift,
            state: ClockState::Inactive,
            local_time: Time::ZERO,
            last_update: Time::ZERO,
            links: Vec::new(),
            neighbors: HashMap::new(),
            sync_time_at_master: Time::ZERO,
            delay_req_time_at_master: Time::ZERO,
            sync_receive_time: Time::ZERO,
            delay_req_send_time: Time::ZERO,
            last_sync_id: None,
            last_follow_up_id: None,
            last_delay_req_id: None,
            counters: MessageCounters::default(),
            offset_before: Duration::ZERO,
            offset_after: Duration::ZERO,
        }
    }

    /// The reference clock. Its drift is exactly one and it starts SYNCED.
    pub fn master(id: NodeId) -> Self {
        Self {
            is_master: true,
            state: ClockState::Synced,
            ..Self::new(ClockConfig {
                id,
                hop: 0,
                drift: 1.0,
            })
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn hop(&self) -> u16 {
        self.hop
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn local_time(&self) -> Time {
        self.local_time
    }

    pub fn counters(&self) -> &MessageCounters {
        &self.counters
    }

    pub fn offset_before(&self) -> Duration {
        self.offset_before
    }

    pub fn offset_after(&self) -> Duration {
        self.offset_after
    }

    pub fn last_sync_id(&self) -> Option<u32> {
        self.last_sync_id
    }

    pub fn last_follow_up_id(&self) -> Option<u32> {
        self.last_follow_up_id
    }

    /// Links to the neighbors of this clock, in registration order
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Bring local time up to date with the global time `now`
    pub fn advance(&mut self, now: Time) {
        if self.is_master {
            self.local_time = now;
        } else {
            self.local_time += (now - self.last_update).scale(self.drift);
        }
        self.last_update = now;
    }

    pub(crate) fn register_neighbor(
        &mut self,
        neighbor: NodeId,
        link: LinkId,
    ) -> Result<(), SetupError> {
        if self.neighbors.contains_key(&neighbor) {
            return Err(SetupError::DuplicateNeighbor {
                node: self.id,
                neighbor,
            });
        }
        self.neighbors.insert(neighbor, NeighborTimestamps::default());
        self.links.push(link);
        Ok(())
    }

    fn neighbor_mut(&mut self, neighbor: NodeId) -> Result<&mut NeighborTimestamps, ProtocolError> {
        let node = self.id;
        self.neighbors
            .get_mut(&neighbor)
            .ok_or(ProtocolError::UnknownNeighbor { node, neighbor })
    }

    pub(crate) fn record_sent(&mut self, kind: MessageKind) {
        self.counters.record_sent(kind);
    }

    pub(crate) fn record_received(&mut self, kind: MessageKind) {
        self.counters.record_received(kind);
    }

    pub(crate) fn record_sync_sent(&mut self, neighbor: NodeId) -> Result<(), ProtocolError> {
        let now = self.local_time;
        self.neighbor_mut(neighbor)?.sync_send = Some(now);
        Ok(())
    }

    /// Last SYNC transmit time towards `neighbor`
    pub(crate) fn sync_send_time(&self, neighbor: NodeId) -> Result<Time, ProtocolError> {
        let timestamps =
            self.neighbors
                .get(&neighbor)
                .ok_or(ProtocolError::UnknownNeighbor {
                    node: self.id,
                    neighbor,
                })?;
        timestamps.sync_send.ok_or(ProtocolError::MissingTimestamp {
            node: self.id,
            neighbor,
        })
    }

    pub(crate) fn record_delay_req_received(
        &mut self,
        neighbor: NodeId,
    ) -> Result<Time, ProtocolError> {
        let now = self.local_time;
        self.neighbor_mut(neighbor)?.delay_req_receive = Some(now);
        Ok(now)
    }

    pub(crate) fn delay_req_receive_time(&self, neighbor: NodeId) -> Result<Time, ProtocolError> {
        let timestamps =
            self.neighbors
                .get(&neighbor)
                .ok_or(ProtocolError::UnknownNeighbor {
                    node: self.id,
                    neighbor,
                })?;
        timestamps
            .delay_req_receive
            .ok_or(ProtocolError::MissingTimestamp {
                node: self.id,
                neighbor,
            })
    }

    pub(crate) fn handle_sync(&mut self, correlation_id: u32) {
        self.sync_receive_time = self.local_time;
        self.last_sync_id = Some(correlation_id);
        if self.state == ClockState::Inactive {
            log::info!("clock {}: {} -> {}", self.id, self.state, ClockState::Active);
            self.state = ClockState::Active;
        }
    }

    /// Returns whether the FOLLOW_UP belongs to the last received SYNC. A
    /// FOLLOW_UP from another round leaves the clock untouched.
    pub(crate) fn handle_follow_up(&mut self, correlation_id: u32, sync_send_time: Time) -> bool {
        if self.last_sync_id != Some(correlation_id) {
            return false;
        }
        self.sync_time_at_master = sync_send_time;
        self.last_follow_up_id = Some(correlation_id);
        true
    }

    pub(crate) fn delay_req_sent(&mut self, correlation_id: u32) {
        self.delay_req_send_time = self.local_time;
        self.last_delay_req_id = Some(correlation_id);
        if self.state != ClockState::Waiting {
            log::info!("clock {}: {} -> {}", self.id, self.state, ClockState::Waiting);
            self.state = ClockState::Waiting;
        }
    }

    /// Returns whether the DELAY_RESP answers the outstanding DELAY_REQ
    pub(crate) fn handle_delay_resp(
        &mut self,
        correlation_id: u32,
        delay_req_receive_time: Time,
    ) -> bool {
        if self.state != ClockState::Waiting || self.last_delay_req_id != Some(correlation_id) {
            return false;
        }
        self.delay_req_time_at_master = delay_req_receive_time;
        true
    }

    /// Apply the four-timestamp offset correction and become SYNCED.
    ///
    /// `reference` is the master's local time at this instant, used for the
    /// before/after statistics only. The master itself is never corrected.
    pub fn apply_offset_correction(&mut self, reference: Time) -> OffsetCorrection {
        if self.is_master {
            return OffsetCorrection {
                node: self.id,
                offset: Duration::ZERO,
                offset_before: Duration::ZERO,
                offset_after: Duration::ZERO,
            };
        }

        let offset = ((self.sync_receive_time - self.sync_time_at_master)
            + (self.delay_req_send_time - self.delay_req_time_at_master))
            / 2;

        self.offset_before = self.local_time.abs_diff(reference);
        self.local_time -= offset;
        self.offset_after = self.local_time.abs_diff(reference);

        if self.state != ClockState::Synced {
            log::info!("clock {}: {} -> {}", self.id, self.state, ClockState::Synced);
        }
        self.state = ClockState::Synced;

        OffsetCorrection {
            node: self.id,
            offset,
            offset_before: self.offset_before,
            offset_after: self.offset_after,
        }
    }
}
