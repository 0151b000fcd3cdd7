use crate::{
    clock::NodeId,
    time::{Duration, Interval},
};

/// Configuration of the protocol rounds driven by a
/// [`PtpNetwork`](`crate::PtpNetwork`)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NetworkConfig {
    /// Id of the reference clock every round starts from
    pub master_id: NodeId,

    /// Number of synchronization rounds. Zero disables the protocol.
    pub iterations: u32,

    /// Time between the start of two rounds
    pub round_interval: Interval,

    /// Delay between the start of a round and the master's first SYNC
    pub start_delay: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            master_id: 0,
            iterations: 1,
            round_interval: Interval::ONE_SECOND,
            start_delay: Duration::from_nanos(5),
        }
    }
}

impl NetworkConfig {
    /// Global time after which the master sends no further SYNC, or `None`
    /// if the rounds do not fit in a [`Duration`]
    pub fn last_broadcast(&self) -> Option<Duration> {
        match self.iterations {
            0 => Some(Duration::ZERO),
            n => self
                .round_interval
                .as_duration()
                .checked_mul(n as i64 - 1)?
                .checked_add(self.start_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_broadcast() {
        let config = NetworkConfig {
            iterations: 3,
            ..Default::default()
        };
        assert_eq!(
            config.last_broadcast(),
            Some(Duration::from_secs(2) + Duration::from_nanos(5))
        );

        let config = NetworkConfig {
            iterations: 0,
            ..Default::default()
        };
        assert_eq!(config.last_broadcast(), Some(Duration::ZERO));

        let config = NetworkConfig {
            iterations: 3,
            round_interval: Interval::from_log_2(33),
            ..Default::default()
        };
        assert_eq!(config.last_broadcast(), None);

        // a single round never waits for the interval
        let config = NetworkConfig {
            iterations: 1,
            round_interval: Interval::from_log_2(100),
            ..Default::default()
        };
        assert_eq!(config.last_broadcast(), Some(Duration::from_nanos(5)));
    }
}
