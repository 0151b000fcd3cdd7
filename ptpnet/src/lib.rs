//! ptpnet is a library modelling the IEEE1588 delay request-response
//! exchange (SYNC, FOLLOW_UP, DELAY_REQ, DELAY_RESP) over a network of
//! drifting clocks, synchronized hop by hop from a single master.
//!
//! # Device interfaces
//! `ptpnet` performs no I/O. It does not own a scheduler, a transport or a
//! notion of wall-clock time. These need to be provided by the user of the
//! library.
//!
//! The [`PtpNetwork`] owns every [`PtpClock`](`clock::PtpClock`) and
//! [`Link`](`network::Link`). Its `handle_*` methods take the current global
//! time and return [`NetworkAction`](`network::NetworkAction`)s: messages to
//! carry over a link and protocol steps to schedule after a delay.
//!
//! The `ptpnet-sim` crate provides a discrete-event implementation of these
//! interfaces, together with topology presets and a command line driver.
//!
//! # Clock model
//! Each clock has a fixed multiplicative drift. Local time is integrated
//! incrementally every time the global time advances; the master's local time
//! is the global time. A slave applies a single offset correction
//! `((t2 - t1) + (t3 - t4)) / 2` per completed exchange and then relays the
//! exchange to its own neighbors, except the one it synchronized against.

pub mod clock;
pub mod config;
pub mod datastructures;
pub mod network;
pub mod observability;
pub mod time;

pub use network::PtpNetwork;

#[cfg(feature = "fuzz")]
pub mod fuzz {
    pub use crate::datastructures::messages::FuzzMessage;
}
