//! Market-data feed frame decoding.
//!
//! Frames are Ethernet/IPv4/UDP with the message sequence number at the
//! start of the UDP payload and a fixed-size hardware timestamp trailer
//! appended after the network payload by the capture tap. The trailer sits
//! at the end of the *captured* frame, independent of the declared IP/UDP
//! lengths, so every offset here is validated against the captured length.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::FrameError;
pub use parser::{PacketRecord, Side, SidePorts, decode_frame};
