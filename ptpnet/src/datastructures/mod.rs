//! General datastructures as exchanged between clocks

pub mod messages;

/// Errors produced while decoding a message from its wire representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireFormatError {
    #[error("buffer too short, expected at least {expected} bytes but got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("unknown message kind {0:#04x}")]
    UnknownMessageKind(u8),
}

impl From<messages::EnumConversionError> for WireFormatError {
    fn from(value: messages::EnumConversionError) -> Self {
        WireFormatError::UnknownMessageKind(value.0)
    }
}
