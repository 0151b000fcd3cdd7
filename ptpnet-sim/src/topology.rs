//! Construction of clock networks from a topology description

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    net::{Ipv4Addr, SocketAddrV4},
};

use ptpnet::{
    clock::NodeId,
    config::{ClockConfig, DriftRange, NetworkConfig},
    network::{LinkConfig, SetupError},
    observability::ObservationSink,
    PtpNetwork,
};
use rand::Rng;
use thiserror::Error;

use crate::config::{TopologyConfig, TopologyKind, MAX_NODES};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology has no nodes")]
    Empty,
    #[error("topology has {0} nodes, at most {MAX_NODES} are supported")]
    TooManyNodes(u16),
    #[error("node {0} is not part of the topology")]
    UnknownNode(NodeId),
    #[error("node {0} cannot be connected to itself")]
    SelfLoop(NodeId),
    #[error("node {0} is not reachable from the master")]
    Disconnected(NodeId),
}

/// An undirected graph of clocks with the distance of every node to the master
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    master: NodeId,
    /// Neighbors of every node, in the order the edges were declared
    neighbors: BTreeMap<NodeId, Vec<NodeId>>,
    hops: BTreeMap<NodeId, u16>,
}

impl Topology {
    /// The master connected directly to every other node
    pub fn star(nodes: u16, master: NodeId) -> Result<Self, TopologyError> {
        let edges: Vec<_> = (0..nodes)
            .filter(|&id| id != master)
            .map(|id| (master, id))
            .collect();
        Self::new(nodes, master, &edges)
    }

    /// Nodes connected in id order
    pub fn chain(nodes: u16, master: NodeId) -> Result<Self, TopologyError> {
        let edges: Vec<_> = (1..nodes).map(|id| (id - 1, id)).collect();
        Self::new(nodes, master, &edges)
    }

    pub fn from_config(config: &TopologyConfig, master: NodeId) -> Result<Self, TopologyError> {
        match config.kind {
            TopologyKind::Star => Self::star(config.nodes, master),
            TopologyKind::Chain => Self::chain(config.nodes, master),
            TopologyKind::Custom => Self::new(config.nodes, master, &config.edges),
        }
    }

    /// Nodes `0..nodes` connected by undirected `edges`. Duplicate edges are
    /// merged, every node must be reachable from `master`.
    pub fn new(
        nodes: u16,
        master: NodeId,
        edges: &[(NodeId, NodeId)],
    ) -> Result<Self, TopologyError> {
        if nodes == 0 {
            return Err(TopologyError::Empty);
        }
        if nodes > MAX_NODES {
            return Err(TopologyError::TooManyNodes(nodes));
        }
        if master >= nodes {
            return Err(TopologyError::UnknownNode(master));
        }

        let mut neighbors: BTreeMap<NodeId, Vec<NodeId>> =
            (0..nodes).map(|id| (id, Vec::new())).collect();
        let mut seen = BTreeSet::new();

        for &(a, b) in edges {
            if a == b {
                return Err(TopologyError::SelfLoop(a));
            }
            for id in [a, b] {
                if id >= nodes {
                    return Err(TopologyError::UnknownNode(id));
                }
            }
            if !seen.insert((a.min(b), a.max(b))) {
                log::debug!("ignoring duplicate edge {a} - {b}");
                continue;
            }
            neighbors.entry(a).or_default().push(b);
            neighbors.entry(b).or_default().push(a);
        }

        let hops = hop_counts(&neighbors, master);
        if let Some(&unreachable) = neighbors.keys().find(|id| !hops.contains_key(id)) {
            return Err(TopologyError::Disconnected(unreachable));
        }

        Ok(Self {
            master,
            neighbors,
            hops,
        })
    }

    pub fn master(&self) -> NodeId {
        self.master
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.neighbors.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of links between `id` and the master
    pub fn hop(&self, id: NodeId) -> Option<u16> {
        self.hops.get(&id).copied()
    }

    /// Build a network with this shape. Slave drifts are drawn from `drift`
    /// in id order, so a seeded `rng` gives a reproducible network.
    pub fn build<O: ObservationSink>(
        &self,
        config: NetworkConfig,
        drift: &DriftRange,
        rng: &mut impl Rng,
        observer: O,
    ) -> Result<PtpNetwork<O>, SetupError> {
        let config = NetworkConfig {
            master_id: self.master,
            ..config
        };
        let mut network = PtpNetwork::with_observer(config, observer);

        for (&id, &hop) in &self.hops {
            let drift = if id == self.master {
                1.0
            } else {
                drift.sample(rng)
            };
            network.add_clock(ClockConfig { id, hop, drift })?;
        }

        for (&local_id, remotes) in &self.neighbors {
            for (index, &remote_id) in remotes.iter().enumerate() {
                let remote_index = self
                    .neighbors(remote_id)
                    .iter()
                    .position(|&id| id == local_id)
                    .unwrap_or_default();
                network.add_link(LinkConfig {
                    local_id,
                    remote_id,
                    local_address: endpoint(local_id, index),
                    remote_address: endpoint(remote_id, remote_index),
                })?;
            }
        }

        Ok(network)
    }
}

/// Address `10.1.1.(id + 1)`
pub fn address(id: NodeId) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(Ipv4Addr::new(10, 1, 1, 0)) + id as u32 + 1)
}

/// The `index`th link of node `id` uses port `100 * (id + 1) + index`
pub fn endpoint(id: NodeId, index: usize) -> SocketAddrV4 {
    let port = 100 * (id as u32 + 1) + index as u32;
    SocketAddrV4::new(address(id), port.min(u16::MAX as u32) as u16)
}

fn hop_counts(neighbors: &BTreeMap<NodeId, Vec<NodeId>>, master: NodeId) -> BTreeMap<NodeId, u16> {
    let mut hops = BTreeMap::from([(master, 0u16)]);
    let mut queue = VecDeque::from([master]);

    while let Some(id) = queue.pop_front() {
        let next = hops[&id] + 1;
        for &neighbor in neighbors.get(&id).into_iter().flatten() {
            if !hops.contains_key(&neighbor) {
                hops.insert(neighbor, next);
                queue.push_back(neighbor);
            }
        }
    }

    hops
}
