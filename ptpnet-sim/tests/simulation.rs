use std::path::Path;

use ptpnet::{clock::ClockState, datastructures::messages::MessageKind, time::Duration};
use ptpnet_sim::{
    config::{Config, ConfigError, TopologyConfig, TopologyKind},
    simulation::{Simulation, SimulationError},
};

fn conf(name: &str) -> Config {
    Config::from_file(Path::new(env!("CARGO_MANIFEST_DIR")).join("conf").join(name)).unwrap()
}

#[test]
fn chain_converges() {
    let config = conf("chain.toml");
    let mut simulation = Simulation::from_config(&config).unwrap();
    let summary = simulation.run().unwrap();

    assert!(summary.snapshot.all_synced());
    assert!(summary.errors.is_empty());
    assert_eq!(summary.pending_events, 0);
    assert_eq!(summary.messages_dropped, 0);
    assert_eq!(summary.corrections.len(), 5 * 10);

    let network = simulation.network();
    for id in 1..6 {
        let clock = network.clock(id).unwrap();
        assert_eq!(clock.hop(), id);
        assert_eq!(clock.counters().received(MessageKind::Sync), 10);
        assert_eq!(clock.counters().sent(MessageKind::DelayReq), 10);
        // corrected every round, the error left is the drift accumulated
        // during a handful of link delays
        assert!(clock.offset_after() < Duration::from_micros(5));
    }
    assert_eq!(network.clock(5).unwrap().counters().sent(MessageKind::Sync), 0);
    assert_eq!(network.clock(0).unwrap().counters().received(MessageKind::DelayReq), 10);
}

#[test]
fn star_converges() {
    let mut config = conf("star.toml");
    config.iterations = 20;
    let mut simulation = Simulation::from_config(&config).unwrap();
    let summary = simulation.run().unwrap();

    assert!(summary.snapshot.all_synced());
    assert_eq!(summary.nodes.len(), 9);
    for node in &summary.nodes {
        assert_eq!(node.corrections, 20);
        assert!(node.max_offset_after < Duration::from_micros(1));
    }

    // nobody relays in a star
    for id in 1..10 {
        let clock = simulation.network().clock(id).unwrap();
        assert_eq!(clock.counters().sent(MessageKind::Sync), 0);
        assert_eq!(clock.state(), ClockState::Synced);
    }
}

#[test]
fn runs_are_deterministic() {
    let config = Config {
        iterations: 3,
        topology: TopologyConfig {
            kind: TopologyKind::Custom,
            nodes: 5,
            edges: vec![(0, 1), (0, 2), (1, 3), (2, 4)],
        },
        ..Default::default()
    };

    let run = || {
        let mut simulation = Simulation::from_config(&config).unwrap();
        simulation.run().unwrap().corrections
    };

    let first = run();
    assert_eq!(first.len(), 4 * 3);
    assert_eq!(first, run());
}

#[test]
fn triangle_relays_terminate() {
    // 1 and 2 relay to each other once, then only towards the master
    let config = Config {
        iterations: 1,
        settle_time_ms: 1,
        topology: TopologyConfig {
            kind: TopologyKind::Custom,
            nodes: 3,
            edges: vec![(0, 1), (0, 2), (1, 2)],
        },
        ..Default::default()
    };

    let mut simulation = Simulation::from_config(&config).unwrap();
    let summary = simulation.run().unwrap();

    assert!(summary.snapshot.all_synced());
    assert!(summary.end_time <= simulation.horizon());
    assert_eq!(summary.pending_events, 0);
    for id in [1, 2] {
        let counters = *simulation.network().clock(id).unwrap().counters();
        assert_eq!(counters.received(MessageKind::Sync), 2);
    }
}

#[test]
fn zero_iterations_leave_clocks_inactive() {
    let config = Config {
        iterations: 0,
        ..Default::default()
    };

    let mut simulation = Simulation::from_config(&config).unwrap();
    let summary = simulation.run().unwrap();

    assert_eq!(summary.events_processed, 0);
    assert!(summary
        .snapshot
        .nodes
        .iter()
        .filter(|node| !node.is_master)
        .all(|node| node.state == ClockState::Inactive));
}

#[test]
fn oversized_schedule_is_a_config_error() {
    let config: Config = "iterations = 3\nlog-round-interval = 33".parse().unwrap();

    assert!(matches!(
        Simulation::from_config(&config),
        Err(SimulationError::Config(ConfigError::HorizonOverflow))
    ));
}
