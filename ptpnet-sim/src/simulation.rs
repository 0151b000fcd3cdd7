//! Discrete-event driver connecting a [`PtpNetwork`] to the simulated
//! scheduler and transport

use ptpnet::{
    network::{NetworkAction, NetworkActionIterator, SetupError},
    time::{Duration, Time},
    PtpNetwork,
};
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

use crate::{
    config::{Config, ConfigError},
    observer::{RecordingObserver, RunSummary},
    scheduler::{EventQueue, SimEvent},
    topology::{Topology, TopologyError},
    transport::SimTransport,
};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("could not set up network: {0}")]
    Setup(#[from] SetupError),
}

pub struct Simulation {
    network: PtpNetwork<RecordingObserver>,
    queue: EventQueue,
    transport: SimTransport,
    horizon: Time,
    events_processed: u64,
}

impl Simulation {
    pub fn new(network: PtpNetwork<RecordingObserver>, link_delay: Duration, horizon: Time) -> Self {
        let transport = SimTransport::new(network.links(), link_delay);
        Self {
            network,
            queue: EventQueue::new(),
            transport,
            horizon,
            events_processed: 0,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SimulationError> {
        config.check()?;

        let topology = Topology::from_config(&config.topology, config.master)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let network = topology.build(
            config.network_config(),
            &config.drift,
            &mut rng,
            RecordingObserver::default(),
        )?;

        tracing::info!(
            nodes = topology.len(),
            links = network.links().len(),
            iterations = config.iterations,
            "built {:?} topology",
            config.topology.kind
        );

        Ok(Self::new(network, config.link_delay(), config.horizon()?))
    }

    /// Run until no events remain or the next one lies beyond the horizon
    pub fn run(&mut self) -> Result<RunSummary, SetupError> {
        let actions = self.network.start(self.queue.now())?;
        self.apply(actions);

        while self.queue.peek_time().is_some_and(|time| time <= self.horizon) {
            self.step();
        }

        if !self.queue.is_empty() {
            tracing::info!(
                pending = self.queue.len(),
                "stopping at horizon {}",
                self.horizon
            );
        }

        Ok(self.summary())
    }

    /// Process the next event, returning its time
    pub fn step(&mut self) -> Option<Time> {
        let (now, event) = self.queue.pop()?;
        self.events_processed += 1;

        let actions = match event {
            SimEvent::Protocol(event) => self.network.handle_event(event, now),
            SimEvent::Deliver { link, data } => self.network.handle_receive(link, &data, now),
        };
        self.apply(actions);

        Some(now)
    }

    fn apply(&mut self, actions: NetworkActionIterator) {
        for action in actions {
            match action {
                NetworkAction::Send { link, data } => {
                    self.transport.send(&mut self.queue, link, data)
                }
                NetworkAction::Schedule { delay, event } => self
                    .queue
                    .schedule_after(delay, SimEvent::Protocol(event)),
            }
        }
    }

    pub fn network(&self) -> &PtpNetwork<RecordingObserver> {
        &self.network
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn horizon(&self) -> Time {
        self.horizon
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn summary(&self) -> RunSummary {
        let observer = self.network.observer();
        RunSummary {
            end_time: self.queue.now(),
            events_processed: self.events_processed,
            messages_delivered: self.transport.delivered(),
            messages_dropped: self.transport.dropped(),
            pending_events: self.queue.len(),
            snapshot: self.network.snapshot(),
            nodes: observer.summaries(),
            corrections: observer.corrections().to_vec(),
            errors: observer.errors().to_vec(),
        }
    }
}
