use core::fmt::Display;

use crate::{
    clock::{ClockState, MessageCounters, NodeId, PtpClock},
    datastructures::messages::MessageKind,
    time::{Duration, Time},
};

/// State of a single clock at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub hop: u16,
    pub is_master: bool,
    pub drift: f64,
    pub state: ClockState,
    pub local_time: Time,
    /// Distance between this clock and the master right now
    pub offset_from_master: Duration,
    /// Distance to the master before the last correction
    pub offset_before: Duration,
    /// Distance to the master right after the last correction
    pub offset_after: Duration,
    pub counters: MessageCounters,
}

impl NodeSnapshot {
    fn new(clock: &PtpClock, master_time: Time) -> Self {
        Self {
            id: clock.id(),
            hop: clock.hop(),
            is_master: clock.is_master(),
            drift: clock.drift(),
            state: clock.state(),
            local_time: clock.local_time(),
            offset_from_master: clock.local_time().abs_diff(master_time),
            offset_before: clock.offset_before(),
            offset_after: clock.offset_after(),
            counters: *clock.counters(),
        }
    }
}

/// State of every clock at global time `time`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkSnapshot {
    pub time: Time,
    pub nodes: Vec<NodeSnapshot>,
}

impl NetworkSnapshot {
    pub(crate) fn new<'a>(time: Time, clocks: impl Iterator<Item = &'a PtpClock>) -> Self {
        Self {
            time,
            nodes: clocks.map(|clock| NodeSnapshot::new(clock, time)).collect(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn all_synced(&self) -> bool {
        self.nodes.iter().all(|node| node.state == ClockState::Synced)
    }

    /// Largest current distance of any clock to the master
    pub fn max_offset(&self) -> Duration {
        self.nodes
            .iter()
            .map(|node| node.offset_from_master)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

impl Display for NetworkSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "time {}", self.time)?;
        write!(
            f,
            "{:>5} {:>3} {:<8} {:>10} {:>22} {:>14} {:>14} {:>14}",
            "id", "hop", "state", "drift", "local", "offset", "before", "after"
        )?;
        for kind in MessageKind::ALL {
            write!(f, " {:>10}", format!("{kind} tx/rx"))?;
        }
        writeln!(f)?;

        for node in &self.nodes {
            let marker = if node.is_master { "*" } else { "" };
            write!(
                f,
                "{:>5} {:>3} {:<8} {:>10.6} {:>22} {:>14} {:>14} {:>14}",
                format!("{marker}{}", node.id),
                node.hop,
                node.state.to_string(),
                node.drift,
                node.local_time.to_string(),
                node.offset_from_master.to_string(),
                node.offset_before.to_string(),
                node.offset_after.to_string()
            )?;
            for kind in MessageKind::ALL {
                write!(
                    f,
                    " {:>10}",
                    format!(
                        "{}/{}",
                        node.counters.sent(kind),
                        node.counters.received(kind)
                    )
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
