//! Ptp network messages
//!
//! All four message kinds share one fixed 17 byte layout, big-endian:
//!
//! | offset | size | field          |
//! |--------|------|----------------|
//! | 0      | 1    | kind           |
//! | 1      | 2    | sender id      |
//! | 3      | 2    | sender hop     |
//! | 5      | 4    | correlation id |
//! | 9      | 8    | timestamp (ns) |

use core::fmt::Display;

use super::WireFormatError;
use crate::{clock::NodeId, time::Time};

/// Size of every message on the wire
pub const WIRE_SIZE: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(u8)]
pub enum MessageKind {
    Sync = 0x0,
    FollowUp = 0x1,
    DelayReq = 0x2,
    DelayResp = 0x3,
}

impl MessageKind {
    /// All kinds, in wire order
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Sync,
        MessageKind::FollowUp,
        MessageKind::DelayReq,
        MessageKind::DelayResp,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            MessageKind::Sync => "SYNC",
            MessageKind::FollowUp => "FOLLOW_UP",
            MessageKind::DelayReq => "DELAY_REQ",
            MessageKind::DelayResp => "DELAY_RESP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConversionError(pub u8);

impl TryFrom<u8> for MessageKind {
    type Error = EnumConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use MessageKind::*;

        match value {
            0x0 => Ok(Sync),
            0x1 => Ok(FollowUp),
            0x2 => Ok(DelayReq),
            0x3 => Ok(DelayResp),
            _ => Err(EnumConversionError(value)),
        }
    }
}

#[cfg(feature = "fuzz")]
pub use fuzz::FuzzMessage;

#[cfg(feature = "fuzz")]
mod fuzz {
    #![allow(missing_docs)] // These are only used for internal fuzzing
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FuzzMessage {
        inner: Message,
    }

    impl FuzzMessage {
        pub fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
            Ok(FuzzMessage {
                inner: Message::deserialize(buffer)?,
            })
        }

        pub fn serialize(&self) -> [u8; WIRE_SIZE] {
            self.inner.serialize()
        }
    }
}

/// A single protocol message.
///
/// The meaning of `timestamp` depends on the kind: a FOLLOW_UP carries the
/// sender's SYNC transmit time, a DELAY_RESP carries the responder's DELAY_REQ
/// receive time. SYNC and DELAY_REQ carry zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub sender_id: NodeId,
    pub sender_hop: u16,
    pub correlation_id: u32,
    pub timestamp: Time,
}

impl Message {
    pub(crate) fn sync(sender_id: NodeId, sender_hop: u16, correlation_id: u32) -> Self {
        Message {
            kind: MessageKind::Sync,
            sender_id,
            sender_hop,
            correlation_id,
            timestamp: Time::ZERO,
        }
    }

    pub(crate) fn follow_up(
        sender_id: NodeId,
        sender_hop: u16,
        correlation_id: u32,
        sync_send_time: Time,
    ) -> Self {
        Message {
            kind: MessageKind::FollowUp,
            sender_id,
            sender_hop,
            correlation_id,
            timestamp: sync_send_time,
        }
    }

    pub(crate) fn delay_req(sender_id: NodeId, sender_hop: u16, correlation_id: u32) -> Self {
        Message {
            kind: MessageKind::DelayReq,
            sender_id,
            sender_hop,
            correlation_id,
            timestamp: Time::ZERO,
        }
    }

    pub(crate) fn delay_resp(
        sender_id: NodeId,
        sender_hop: u16,
        correlation_id: u32,
        delay_req_receive_time: Time,
    ) -> Self {
        Message {
            kind: MessageKind::DelayResp,
            sender_id,
            sender_hop,
            correlation_id,
            timestamp: delay_req_receive_time,
        }
    }

    /// Encode into the fixed wire layout
    pub fn serialize(&self) -> [u8; WIRE_SIZE] {
        let mut buffer = [0; WIRE_SIZE];
        buffer[0] = self.kind as u8;
        buffer[1..3].copy_from_slice(&self.sender_id.to_be_bytes());
        buffer[3..5].copy_from_slice(&self.sender_hop.to_be_bytes());
        buffer[5..9].copy_from_slice(&self.correlation_id.to_be_bytes());
        buffer[9..17].copy_from_slice(&self.timestamp.nanos().to_be_bytes());
        buffer
    }

    /// Decode from the wire layout. Trailing bytes are ignored.
    pub fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let buffer: &[u8; WIRE_SIZE] = buffer
            .get(..WIRE_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(WireFormatError::BufferTooShort {
                expected: WIRE_SIZE,
                actual: buffer.len(),
            })?;

        let kind = MessageKind::try_from(buffer[0])?;
        let [_, s0, s1, h0, h1, c0, c1, c2, c3, t @ ..] = *buffer;

        Ok(Message {
            kind,
            sender_id: u16::from_be_bytes([s0, s1]),
            sender_hop: u16::from_be_bytes([h0, h1]),
            correlation_id: u32::from_be_bytes([c0, c1, c2, c3]),
            timestamp: Time::from_nanos(i64::from_be_bytes(t)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_up_wire_layout() {
        let message = Message::follow_up(0x0102, 0x0304, 0x0506_0708, Time::from_nanos(-2));
        let bytes = message.serialize();

        assert_eq!(
            bytes,
            [
                0x01, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xff, 0xff, 0xfe
            ]
        );
        assert_eq!(Message::deserialize(&bytes), Ok(message));
    }

    #[test]
    fn sync_has_zero_timestamp() {
        let bytes = Message::sync(7, 1, 42).serialize();
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[9..], &[0; 8]);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut buffer = [0u8; 32];
        buffer[..WIRE_SIZE].copy_from_slice(&Message::delay_req(3, 2, 9).serialize());
        buffer[WIRE_SIZE..].fill(0xaa);

        let message = Message::deserialize(&buffer).unwrap();
        assert_eq!(message.kind, MessageKind::DelayReq);
        assert_eq!(message.sender_id, 3);
        assert_eq!(message.sender_hop, 2);
        assert_eq!(message.correlation_id, 9);
    }

    #[test]
    fn unknown_kind() {
        let mut bytes = Message::delay_resp(1, 0, 1, Time::from_nanos(5)).serialize();
        bytes[0] = 0x7;
        assert_eq!(
            Message::deserialize(&bytes),
            Err(WireFormatError::UnknownMessageKind(0x7))
        );
    }

    #[test]
    fn short_buffer() {
        assert_eq!(
            Message::deserialize(&[0u8; 16]),
            Err(WireFormatError::BufferTooShort {
                expected: WIRE_SIZE,
                actual: 16
            })
        );
    }

    #[test]
    fn kind_conversion() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::try_from(kind as u8), Ok(kind));
        }
        assert_eq!(MessageKind::try_from(4), Err(EnumConversionError(4)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn kind_serialization() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &MessageKind::FollowUp,
            &[Token::UnitVariant {
                name: "MessageKind",
                variant: "FOLLOW_UP",
            }],
        );
    }
}
