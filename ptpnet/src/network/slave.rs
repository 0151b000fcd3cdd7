use super::{
    Link, LinkId, NetworkAction, NetworkActionIterator, ProtocolError, PtpNetwork, ScheduledEvent,
};
use crate::{
    datastructures::messages::{Message, MessageKind},
    observability::ObservationSink,
    time::Duration,
};

impl<O: ObservationSink> PtpNetwork<O> {
    pub(super) fn handle_sync(
        &mut self,
        link: Link,
        message: Message,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (_, clock) = self.link_owner(link.id())?;
        if clock.is_master() {
            log::debug!("master ignores SYNC from {}", message.sender_id);
            return Ok(actions![]);
        }

        clock.handle_sync(message.correlation_id);
        Ok(actions![])
    }

    pub(super) fn handle_follow_up(
        &mut self,
        link: Link,
        message: Message,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link.id())?;
        if clock.is_master() {
            log::debug!("master ignores FOLLOW_UP from {}", message.sender_id);
            return Ok(actions![]);
        }

        if !clock.handle_follow_up(message.correlation_id, message.timestamp) {
            log::debug!(
                "clock {} dropped FOLLOW_UP #{} from another round",
                link.local_id(),
                message.correlation_id
            );
            return Ok(actions![]);
        }

        let correlation_id = self.allocate_correlation_id();
        Ok(actions![NetworkAction::Schedule {
            delay: Duration::ZERO,
            event: ScheduledEvent::SendDelayReq {
                link: link.id(),
                correlation_id,
            },
        }])
    }

    pub(super) fn send_delay_req(
        &mut self,
        link: LinkId,
        correlation_id: u32,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        let (link, clock) = self.link_owner(link)?;

        let request = Message::delay_req(clock.id(), clock.hop(), correlation_id);
        clock.delay_req_sent(correlation_id);
        clock.record_sent(MessageKind::DelayReq);

        log::debug!(
            "clock {} sending DELAY_REQ #{correlation_id} to {}",
            link.local_id(),
            link.remote_id()
        );

        Ok(actions![NetworkAction::Send {
            link: link.id(),
            data: request.serialize(),
        }])
    }

    /// Completes the exchange: correct the clock, then relay SYNC/FOLLOW_UP
    /// to every neighbor except the one that answered.
    pub(super) fn handle_delay_resp(
        &mut self,
        link: Link,
        message: Message,
    ) -> Result<NetworkActionIterator, ProtocolError> {
        // the master's local time always equals global time
        let reference = self.global_time;
        let (link, clock) = self.link_owner(link.id())?;
        if clock.is_master() {
            log::debug!("master ignores DELAY_RESP from {}", message.sender_id);
            return Ok(actions![]);
        }

        if !clock.handle_delay_resp(message.correlation_id, message.timestamp) {
            log::debug!(
                "clock {} ignored DELAY_RESP #{} in state {}",
                link.local_id(),
                message.correlation_id,
                clock.state()
            );
            return Ok(actions![]);
        }

        let correction = clock.apply_offset_correction(reference);
        let downstream = clock.links().to_vec();
        log::info!(
            "clock {} corrected by {} (offset {} -> {})",
            correction.node,
            correction.offset,
            correction.offset_before,
            correction.offset_after
        );
        self.observer
            .offset_corrected(self.global_time, &correction);

        let mut actions = Vec::with_capacity(downstream.len());
        for link in downstream {
            let remote_id = self
                .links
                .get(link.0)
                .ok_or(ProtocolError::UnknownLink(link))?
                .remote_id();
            if remote_id == message.sender_id {
                continue;
            }

            let correlation_id = self.allocate_correlation_id();
            actions.push(NetworkAction::Schedule {
                delay: Duration::ZERO,
                event: ScheduledEvent::SendSyncFollowUp {
                    link,
                    correlation_id,
                },
            });
        }

        Ok(NetworkActionIterator::from(actions))
    }
}
