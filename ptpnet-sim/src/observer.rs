use std::{collections::BTreeMap, io::Write};

use ptpnet::{
    clock::{NodeId, OffsetCorrection},
    network::ProtocolError,
    observability::{NetworkSnapshot, ObservationSink},
    time::{Duration, Time},
};
use serde::Serialize;

/// One offset correction, as reported by the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetRecord {
    pub time: Time,
    #[serde(flatten)]
    pub correction: OffsetCorrection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub time: Time,
    pub message: String,
}

/// Keeps every report of the network for the run summary
#[derive(Debug, Default)]
pub struct RecordingObserver {
    corrections: Vec<OffsetRecord>,
    errors: Vec<ErrorRecord>,
}

impl ObservationSink for RecordingObserver {
    fn offset_corrected(&mut self, now: Time, correction: &OffsetCorrection) {
        self.corrections.push(OffsetRecord {
            time: now,
            correction: *correction,
        });
    }

    fn protocol_error(&mut self, now: Time, error: &ProtocolError) {
        self.errors.push(ErrorRecord {
            time: now,
            message: error.to_string(),
        });
    }
}

/// Aggregated corrections of a single clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub node: NodeId,
    pub corrections: usize,
    pub last_offset_after: Duration,
    pub max_offset_after: Duration,
    pub max_offset_before: Duration,
}

impl RecordingObserver {
    pub fn corrections(&self) -> &[OffsetRecord] {
        &self.corrections
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Corrections of `node`, oldest first
    pub fn history(&self, node: NodeId) -> impl Iterator<Item = &OffsetRecord> + '_ {
        self.corrections
            .iter()
            .filter(move |record| record.correction.node == node)
    }

    pub fn summaries(&self) -> Vec<NodeSummary> {
        let mut summaries: BTreeMap<NodeId, NodeSummary> = BTreeMap::new();

        for record in &self.corrections {
            let correction = &record.correction;
            let summary = summaries.entry(correction.node).or_insert(NodeSummary {
                node: correction.node,
                corrections: 0,
                last_offset_after: Duration::ZERO,
                max_offset_after: Duration::ZERO,
                max_offset_before: Duration::ZERO,
            });
            summary.corrections += 1;
            summary.last_offset_after = correction.offset_after;
            summary.max_offset_after = summary.max_offset_after.max(correction.offset_after);
            summary.max_offset_before = summary.max_offset_before.max(correction.offset_before);
        }

        summaries.into_values().collect()
    }
}

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub end_time: Time,
    pub events_processed: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
    pub pending_events: usize,
    pub snapshot: NetworkSnapshot,
    pub nodes: Vec<NodeSummary>,
    pub corrections: Vec<OffsetRecord>,
    pub errors: Vec<ErrorRecord>,
}

pub fn write_json<W, T>(writer: &mut W, value: &T) -> std::io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correction(node: NodeId, before: i64, after: i64) -> OffsetCorrection {
        OffsetCorrection {
            node,
            offset: Duration::from_nanos(before - after),
            offset_before: Duration::from_nanos(before),
            offset_after: Duration::from_nanos(after),
        }
    }

    #[test]
    fn summaries_per_node() {
        let mut observer = RecordingObserver::default();
        observer.offset_corrected(Time::from_nanos(1), &correction(2, 900, 30));
        observer.offset_corrected(Time::from_nanos(2), &correction(1, 400, 10));
        observer.offset_corrected(Time::from_nanos(3), &correction(2, 100, 50));
        observer.protocol_error(Time::from_nanos(4), &ProtocolError::UnknownClock(9));

        let summaries = observer.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].node, 1);
        assert_eq!(
            summaries[1],
            NodeSummary {
                node: 2,
                corrections: 2,
                last_offset_after: Duration::from_nanos(50),
                max_offset_after: Duration::from_nanos(50),
                max_offset_before: Duration::from_nanos(900),
            }
        );
        assert_eq!(observer.history(2).count(), 2);
        assert_eq!(observer.errors()[0].message, "unknown clock 9");
    }

    #[test]
    fn json_output() {
        let record = OffsetRecord {
            time: Time::from_nanos(7),
            correction: correction(3, 20, 5),
        };
        let mut buffer = Vec::new();
        write_json(&mut buffer, &record).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["time"], 7);
        assert_eq!(value["node"], 3);
        assert_eq!(value["offset_after"], 5);
    }
}
