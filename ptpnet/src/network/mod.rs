//! The synchronization engine: clock and link registries plus the protocol
//! state machine that drives them.
//!
//! See [`PtpNetwork`] for a detailed description.

use std::collections::BTreeMap;

pub use actions::{NetworkAction, NetworkActionIterator, ScheduledEvent};
pub use error::{ProtocolError, SetupError};
pub use link::{Link, LinkConfig, LinkId};

use crate::{
    clock::{NodeId, PtpClock},
    config::{ClockConfig, NetworkConfig},
    datastructures::messages::{Message, MessageKind},
    observability::{NetworkSnapshot, NoObservation, ObservationSink},
    time::{Duration, Time},
};

// Needs to be here because of use rules
macro_rules! actions {
    [] => {
        {
            crate::network::NetworkActionIterator::from(::std::vec::Vec::new())
        }
    };
    [$($action:expr),+ $(,)?] => {
        {
            crate::network::NetworkActionIterator::from(::std::vec![$($action),+])
        }
    };
}

mod actions;
mod error;
mod link;
mod master;
mod slave;

/// A network of drifting clocks synchronized from a single master.
///
/// The network performs no I/O and owns no timers. Every entry point takes the
/// current global (simulator) time and returns a [`NetworkActionIterator`]
/// with the messages to transmit and the steps to schedule. The caller is
/// responsible for delivering messages to the link at the remote end and for
/// calling [`handle_event`](`PtpNetwork::handle_event`) once a scheduled delay
/// has passed, in global time order with ties broken by scheduling order.
///
/// # Example
/// ```
/// use std::net::{Ipv4Addr, SocketAddrV4};
///
/// use ptpnet::{
///     config::{ClockConfig, NetworkConfig},
///     network::{LinkConfig, NetworkAction},
///     time::Time,
///     PtpNetwork,
/// };
///
/// let mut network = PtpNetwork::new(NetworkConfig::default());
/// network.add_clock(ClockConfig { id: 0, hop: 0, drift: 1.0 }).unwrap();
/// network.add_clock(ClockConfig { id: 1, hop: 1, drift: 1.0001 }).unwrap();
///
/// let a = SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 1), 100);
/// let b = SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 2), 200);
/// network
///     .add_link(LinkConfig { local_id: 0, remote_id: 1, local_address: a, remote_address: b })
///     .unwrap();
/// network
///     .add_link(LinkConfig { local_id: 1, remote_id: 0, local_address: b, remote_address: a })
///     .unwrap();
///
/// for action in network.start(Time::ZERO).unwrap() {
///     match action {
///         NetworkAction::Send { .. } => { /* hand to the transport */ }
///         NetworkAction::Schedule { .. } => { /* hand to the scheduler */ }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct PtpNetwork<O = NoObservation> {
    config: NetworkConfig,
    clocks: BTreeMap<NodeId, PtpClock>,
    links: Vec<Link>,
    next_correlation_id: u32,
    remaining_iterations: u32,
    rounds_started: u32,
    global_time: Time,
    observer: O,
}

impl PtpNetwork<NoObservation> {
    /// Create an empty network without an observation sink
    pub fn new(config: NetworkConfig) -> Self {
        Self::with_observer(config, NoObservation)
    }
}

impl<O: ObservationSink> PtpNetwork<O> {
    /// Create an empty network reporting to `observer`
    pub fn with_observer(config: NetworkConfig, observer: O) -> Self {
        Self {
            config,
            clocks: BTreeMap::new(),
            links: Vec::new(),
            next_correlation_id: 0,
            remaining_iterations: config.iterations,
            rounds_started: 0,
            global_time: Time::ZERO,
            observer,
        }
    }

    /// Register a clock. The clock with the configured master id becomes the
    /// reference clock, ignoring the configured hop and drift.
    pub fn add_clock(&mut self, config: ClockConfig) -> Result<(), SetupError> {
        if self.clocks.contains_key(&config.id) {
            return Err(SetupError::DuplicateClock(config.id));
        }

        let clock = if config.id == self.config.master_id {
            if config.drift != 1.0 {
                log::debug!(
                    "ignoring drift {} of master clock {}",
                    config.drift,
                    config.id
                );
            }
            PtpClock::master(config.id)
        } else {
            PtpClock::new(config)
        };

        self.clocks.insert(config.id, clock);
        Ok(())
    }

    /// Register one direction of a connection. The link is owned by
    /// `config.local_id` and routes to `config.remote_id`.
    pub fn add_link(&mut self, config: LinkConfig) -> Result<LinkId, SetupError> {
        if config.local_id == config.remote_id {
            return Err(SetupError::SelfLink(config.local_id));
        }
        if !self.clocks.contains_key(&config.remote_id) {
            return Err(SetupError::UnknownClock(config.remote_id));
        }

        let id = LinkId(self.links.len());
        self.clocks
            .get_mut(&config.local_id)
            .ok_or(SetupError::UnknownClock(config.local_id))?
            .register_neighbor(config.remote_id, id)?;

        let link = Link::new(id, config);
        log::debug!("added {link}");
        self.links.push(link);
        Ok(id)
    }

    /// Start the protocol. The first round begins immediately (through the
    /// scheduler), following rounds every
    /// [`round_interval`](`NetworkConfig::round_interval`).
    pub fn start(&mut self, now: Time) -> Result<NetworkActionIterator, SetupError> {
        if !self.clocks.contains_key(&self.config.master_id) {
            return Err(SetupError::MissingMaster(self.config.master_id));
        }
        self.advance_clocks(now);

        if self.remaining_iterations == 0 {
            log::info!("no synchronization rounds configured");
            return Ok(actions![]);
        }

        Ok(actions![NetworkAction::Schedule {
            delay: Duration::ZERO,
            event: ScheduledEvent::StartRound,
        }])
    }

    /// Handle a step previously requested through [`NetworkAction::Schedule`]
    pub fn handle_event(&mut self, event: ScheduledEvent, now: Time) -> NetworkActionIterator {
        self.advance_clocks(now);

        let result = match event {
            ScheduledEvent::StartRound => self.start_round(),
            ScheduledEvent::SendSyncFollowUp {
                link,
                correlation_id,
            } => self.send_sync_follow_up(link, correlation_id),
            ScheduledEvent::SendDelayReq {
                link,
                correlation_id,
            } => self.send_delay_req(link, correlation_id),
            ScheduledEvent::SendDelayResp {
                link,
                correlation_id,
            } => self.send_delay_resp(link, correlation_id),
        };

        self.or_report(result)
    }

    /// Handle a message the transport delivered on `link`, the link owned by
    /// the receiving clock.
    pub fn handle_receive(&mut self, link: LinkId, data: &[u8], now: Time) -> NetworkActionIterator {
        self.advance_clocks(now);
        let result = self.handle_receive_internal(link, data);
        let actions = self.or_report(result);

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("clock table:\n{}", self.snapshot());
        }

        actions
    }

    fn handle_receive_internal(
        &mut self,
        link_id: LinkId,
        data: &[u8],
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link_id)?;

        let message = Message::deserialize(data).map_err(|error| ProtocolError::Malformed {
            node: link.local_id(),
            error,
        })?;

        if message.sender_id != link.remote_id() {
            return Err(ProtocolError::UnknownNeighbor {
                node: link.local_id(),
                neighbor: message.sender_id,
            });
        }

        clock.record_received(message.kind);
        log::debug!(
            "clock {} received {} #{} from {}",
            link.local_id(),
            message.kind,
            message.correlation_id,
            message.sender_id
        );

        match message.kind {
            MessageKind::Sync => self.handle_sync(link, message),
            MessageKind::FollowUp => self.handle_follow_up(link, message),
            MessageKind::DelayReq => self.handle_delay_req(link, message),
            MessageKind::DelayResp => self.handle_delay_resp(link, message),
        }
    }

    /// Bring every clock up to date with global time `now`. Called on every
    /// entry point, so offsets compared at any instant reflect each clock's
    /// own accumulated drift.
    pub fn advance_clocks(&mut self, now: Time) {
        if now < self.global_time {
            log::warn!("global time moved backwards from {} to {now}", self.global_time);
        }
        self.global_time = now;
        for clock in self.clocks.values_mut() {
            clock.advance(now);
        }
    }

    /// Current state of every clock, ordered by id
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::new(self.global_time, self.clocks.values())
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn master_id(&self) -> NodeId {
        self.config.master_id
    }

    pub fn global_time(&self) -> Time {
        self.global_time
    }

    /// Rounds that have not been started yet
    pub fn remaining_iterations(&self) -> u32 {
        self.remaining_iterations
    }

    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    pub fn clock(&self, id: NodeId) -> Option<&PtpClock> {
        self.clocks.get(&id)
    }

    /// All clocks, ordered by id
    pub fn clocks(&self) -> impl Iterator<Item = &PtpClock> {
        self.clocks.values()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    fn allocate_correlation_id(&mut self) -> u32 {
        let id = self.next_correlation_id;
        self.next_correlation_id = self.next_correlation_id.wrapping_add(1);
        id
    }

    fn link_owner(&mut self, link: LinkId) -> Result<(Link, &mut PtpClock), ProtocolError> {
        let link = *self
            .links
            .get(link.0)
            .ok_or(ProtocolError::UnknownLink(link))?;
        let clock = self
            .clocks
            .get_mut(&link.local_id())
            .ok_or(ProtocolError::UnknownClock(link.local_id()))?;
        Ok((link, clock))
    }

    fn or_report(
        &mut self,
        result: Result<NetworkActionIterator, ProtocolError>,
    ) -> NetworkActionIterator {
        match result {
            Ok(actions) => actions,
            Err(error) => {
                log::warn!("{error}");
                self.observer.protocol_error(self.global_time, &error);
                actions![]
            }
        }
    }
}
