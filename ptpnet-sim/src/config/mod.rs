use std::{path::Path, str::FromStr};

use log::warn;
use ptpnet::{
    clock::NodeId,
    config::{DriftRange, NetworkConfig},
    time::{Duration, Interval, Time},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::TopologyError;

/// Largest supported network; the port scheme gives each node a block of 100
/// ports below 65536.
pub const MAX_NODES: u16 = 600;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    /// Seed of the drift draw
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Log2 of the number of seconds between rounds
    #[serde(default)]
    pub log_round_interval: i8,
    #[serde(default = "default_start_delay_ns")]
    pub start_delay_ns: i64,
    /// One-way propagation delay of every link
    #[serde(default = "default_link_delay_ns")]
    pub link_delay_ns: i64,
    /// How long to keep running after the last round has started
    #[serde(default = "default_settle_time_ms")]
    pub settle_time_ms: i64,
    #[serde(default)]
    pub master: NodeId,
    #[serde(default)]
    pub drift: DriftRange,
    #[serde(default)]
    pub topology: TopologyConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyKind {
    /// Every node is a direct neighbor of the master, as on a shared bus
    Star,
    /// Nodes `0 - 1 - ... - n-1` in a line, as in a multi-hop wireless mesh
    Chain,
    /// Explicit list of edges
    Custom,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TopologyConfig {
    pub kind: TopologyKind,
    /// Number of nodes, with ids `0..nodes`
    pub nodes: u16,
    /// Undirected edges, only used by [`TopologyKind::Custom`]
    #[serde(default)]
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            kind: TopologyKind::Chain,
            nodes: 6,
            edges: Vec::new(),
        }
    }
}

fn default_loglevel() -> String {
    "info".into()
}

fn default_seed() -> u64 {
    1
}

fn default_iterations() -> u32 {
    10
}

fn default_start_delay_ns() -> i64 {
    5
}

fn default_link_delay_ns() -> i64 {
    10_000
}

fn default_settle_time_ms() -> i64 {
    1_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            seed: default_seed(),
            iterations: default_iterations(),
            log_round_interval: 0,
            start_delay_ns: default_start_delay_ns(),
            link_delay_ns: default_link_delay_ns(),
            settle_time_ms: default_settle_time_ms(),
            master: 0,
            drift: DriftRange::default(),
            topology: TopologyConfig::default(),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::de::from_str(s)?)
    }
}

impl Config {
    /// Parse config from file
    pub fn from_file(file: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file)?;
        contents.parse()
    }

    /// Check that the config is reasonable
    pub fn check(&self) -> Result<(), ConfigError> {
        self.loglevel()?;
        self.drift.check()?;

        if self.link_delay_ns < 0 || self.start_delay_ns < 0 || self.settle_time_ms < 0 {
            return Err(ConfigError::NegativeDelay);
        }

        // deliveries scheduled just before the horizon land one link delay later
        self.horizon()?
            .checked_add(self.link_delay())
            .ok_or(ConfigError::HorizonOverflow)?;

        if self.topology.nodes == 0 {
            return Err(TopologyError::Empty.into());
        }

        if self.topology.nodes > MAX_NODES {
            return Err(TopologyError::TooManyNodes(self.topology.nodes).into());
        }

        if self.master >= self.topology.nodes {
            return Err(TopologyError::UnknownNode(self.master).into());
        }

        if self.topology.kind != TopologyKind::Custom && !self.topology.edges.is_empty() {
            warn!("Edges are only used by the custom topology, ignoring them.");
        }

        if self.topology.kind == TopologyKind::Chain && self.master != 0 {
            warn!("Master is not at the end of the chain, sync spreads both ways.");
        }

        if self.iterations == 0 {
            warn!("No synchronization rounds configured.");
        }

        if self.link_delay_ns >= self.round_interval().nanos() {
            warn!("Link delay exceeds the round interval, rounds will overlap.");
        }

        Ok(())
    }

    pub fn loglevel(&self) -> Result<log::LevelFilter, ConfigError> {
        self.loglevel
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.loglevel.clone()))
    }

    pub fn round_interval(&self) -> Duration {
        Interval::from_log_2(self.log_round_interval).as_duration()
    }

    pub fn link_delay(&self) -> Duration {
        Duration::from_nanos(self.link_delay_ns)
    }

    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            master_id: self.master,
            iterations: self.iterations,
            round_interval: Interval::from_log_2(self.log_round_interval),
            start_delay: Duration::from_nanos(self.start_delay_ns),
        }
    }

    /// Virtual time after which the simulation stops processing events
    pub fn horizon(&self) -> Result<Time, ConfigError> {
        let settle = Duration::from_millis(1).checked_mul(self.settle_time_ms);
        self.network_config()
            .last_broadcast()
            .zip(settle)
            .and_then(|(last, settle)| last.checked_add(settle))
            .and_then(|end| Time::ZERO.checked_add(end))
            .ok_or(ConfigError::HorizonOverflow)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error while reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config toml parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid loglevel {0:?}")]
    InvalidLogLevel(String),
    #[error("delays must not be negative")]
    NegativeDelay,
    #[error("rounds and settle time exceed the representable simulation time")]
    HorizonOverflow,
    #[error(transparent)]
    Drift(#[from] ptpnet::config::ConfigError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config: Config = r#"
            loglevel = "debug"
            seed = 42
            iterations = 1000
            log-round-interval = -1
            start-delay-ns = 5
            link-delay-ns = 2000
            settle-time-ms = 10
            master = 0
            drift = { min = 0.999, max = 1.001 }

            [topology]
            kind = "star"
            nodes = 8
        "#
        .parse()
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.loglevel().unwrap(), log::LevelFilter::Debug);
        assert_eq!(config.topology.kind, TopologyKind::Star);
        assert_eq!(config.topology.nodes, 8);
        assert_eq!(config.drift, DriftRange { min: 0.999, max: 1.001 });
        assert_eq!(config.round_interval(), Duration::from_millis(500));
        assert_eq!(config.network_config().iterations, 1000);
        assert!(config.check().is_ok());
    }

    #[test]
    fn defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.topology.kind, TopologyKind::Chain);
        assert_eq!(
            config.horizon().unwrap(),
            Time::from_secs(9) + Duration::from_nanos(5) + Duration::from_secs(1)
        );
        assert!(config.check().is_ok());
    }

    #[test]
    fn custom_edges() {
        let config: Config = r#"
            [topology]
            kind = "custom"
            nodes = 4
            edges = [[0, 1], [0, 2], [2, 3]]
        "#
        .parse()
        .unwrap();

        assert_eq!(config.topology.edges, [(0, 1), (0, 2), (2, 3)]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            "sync-interval = 3".parse::<Config>(),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn invalid_values() {
        let config = Config {
            loglevel: "loud".into(),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::InvalidLogLevel(_))));

        let config = Config {
            master: 6,
            ..Default::default()
        };
        assert!(matches!(
            config.check(),
            Err(ConfigError::Topology(TopologyError::UnknownNode(6)))
        ));

        let config = Config {
            drift: DriftRange { min: 1.1, max: 1.0 },
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::Drift(_))));

        let config = Config {
            link_delay_ns: -1,
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::NegativeDelay)));
    }

    #[test]
    fn schedule_must_fit_in_virtual_time() {
        let config: Config = "iterations = 3\nlog-round-interval = 33".parse().unwrap();
        assert!(matches!(config.check(), Err(ConfigError::HorizonOverflow)));
        assert!(matches!(config.horizon(), Err(ConfigError::HorizonOverflow)));

        let config = Config {
            settle_time_ms: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::HorizonOverflow)));

        let config = Config {
            iterations: 2,
            log_round_interval: 32,
            settle_time_ms: 0,
            link_delay_ns: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::HorizonOverflow)));

        // one round never waits for the interval
        let config = Config {
            iterations: 1,
            log_round_interval: 100,
            ..Default::default()
        };
        assert!(config.check().is_ok());
    }
}
