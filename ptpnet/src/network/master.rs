use super::{
    LinkId, NetworkAction, NetworkActionIterator, ProtocolError, PtpNetwork, ScheduledEvent,
};
use crate::{
    datastructures::messages::{Message, MessageKind},
    network::Link,
    observability::ObservationSink,
    time::Duration,
};

impl<O: ObservationSink> PtpNetwork<O> {
    pub(super) fn start_round(&mut self) -> Result<NetworkActionIterator, ProtocolError> {
        if self.remaining_iterations == 0 {
            return Ok(actions![]);
        }

        let master_id = self.config.master_id;
        let links = self
            .clocks
            .get(&master_id)
            .ok_or(ProtocolError::UnknownClock(master_id))?
            .links()
            .to_vec();

        self.remaining_iterations -= 1;
        self.rounds_started += 1;
        log::info!(
            "starting round {} at {}, {} remaining",
            self.rounds_started,
            self.global_time,
            self.remaining_iterations
        );

        let mut actions = Vec::with_capacity(links.len() + 1);
        for link in links {
            let correlation_id = self.allocate_correlation_id();
            actions.push(NetworkAction::Schedule {
                delay: self.config.start_delay,
                event: ScheduledEvent::SendSyncFollowUp {
                    link,
                    correlation_id,
                },
            });
        }

        if self.remaining_iterations > 0 {
            actions.push(NetworkAction::Schedule {
                delay: self.config.round_interval.as_duration(),
                event: ScheduledEvent::StartRound,
            });
        }

        Ok(NetworkActionIterator::from(actions))
    }

    /// Send SYNC and its FOLLOW_UP back to back. Both share the correlation
    /// id, the FOLLOW_UP carries the SYNC transmit time.
    pub(super) fn send_sync_follow_up(
        &mut self,
        link: LinkId,
        correlation_id: u32,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link)?;

        let sync = Message::sync(clock.id(), clock.hop(), correlation_id);
        clock.record_sync_sent(link.remote_id())?;
        let send_time = clock.sync_send_time(link.remote_id())?;
        let follow_up = Message::follow_up(clock.id(), clock.hop(), correlation_id, send_time);
        clock.record_sent(MessageKind::Sync);
        clock.record_sent(MessageKind::FollowUp);

        log::debug!(
            "clock {} sending SYNC #{correlation_id} to {} at local {send_time}",
            link.local_id(),
            link.remote_id()
        );

        Ok(actions![
            NetworkAction::Send {
                link: link.id(),
                data: sync.serialize(),
            },
            NetworkAction::Send {
                link: link.id(),
                data: follow_up.serialize(),
            }
        ])
    }

    /// Every clock answers DELAY_REQ, the master as well as relaying slaves
    pub(super) fn handle_delay_req(
        &mut self,
        link: Link,
        message: Message,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link.id())?;
        clock.record_delay_req_received(message.sender_id)?;

        Ok(actions![NetworkAction::Schedule {
            delay: Duration::ZERO,
            event: ScheduledEvent::SendDelayResp {
                link: link.id(),
                correlation_id: message.correlation_id,
            },
        }])
    }

    pub(super) fn send_delay_resp(
        &mut self,
        link: LinkId,
        correlation_id: u32,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link)?;

        let receive_time = clock.delay_req_receive_time(link.remote_id())?;
        let response = Message::delay_resp(clock.id(), clock.hop(), correlation_id, receive_time);
        clock.record_sent(MessageKind::DelayResp);

        log::debug!(
            "clock {} answering DELAY_REQ #{correlation_id} of {}",
            link.local_id(),
            link.remote_id()
        );

        Ok(actions![NetworkAction::Send {
            link: link.id(),
            data: response.serialize(),
        }])
    }
}
