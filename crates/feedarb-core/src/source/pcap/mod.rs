//! PCAP/PCAPNG source implementation.
//!
//! This module provides a `PacketSource` backed by PCAP or PCAPNG files. It
//! handles file I/O and low-level parsing, emitting raw packet events for
//! the decoder. A capture declaring a non-Ethernet link type is rejected as
//! a whole, before any of its frames reach the decoder.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
