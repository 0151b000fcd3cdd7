//! Simulated point-to-point transport between neighboring clocks

use std::collections::HashMap;

use ptpnet::{
    datastructures::messages::WIRE_SIZE,
    network::{Link, LinkId},
    time::Duration,
};

use crate::scheduler::{EventQueue, SimEvent};

/// Carries messages from a link to the matching link at the remote node,
/// after a fixed one-way delay.
#[derive(Debug)]
pub struct SimTransport {
    delay: Duration,
    reverse: HashMap<LinkId, LinkId>,
    delivered: u64,
    dropped: u64,
}

impl SimTransport {
    pub fn new(links: &[Link], delay: Duration) -> Self {
        let by_endpoints: HashMap<_, _> = links
            .iter()
            .map(|link| ((link.local_id(), link.remote_id()), link.id()))
            .collect();

        let reverse = links
            .iter()
            .filter_map(|link| {
                by_endpoints
                    .get(&(link.remote_id(), link.local_id()))
                    .map(|&back| (link.id(), back))
            })
            .collect();

        Self {
            delay,
            reverse,
            delivered: 0,
            dropped: 0,
        }
    }

    /// The link the remote end receives on
    pub fn peer(&self, link: LinkId) -> Option<LinkId> {
        self.reverse.get(&link).copied()
    }

    /// Queue delivery of `data` sent on `link`. Messages on a link without a
    /// way back are dropped.
    pub fn send(&mut self, queue: &mut EventQueue, link: LinkId, data: [u8; WIRE_SIZE]) {
        match self.peer(link) {
            Some(target) => {
                self.delivered += 1;
                queue.schedule_after(self.delay, SimEvent::Deliver { link: target, data });
            }
            None => {
                self.dropped += 1;
                log::warn!("dropping message on {link}: remote end has no link back");
            }
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
