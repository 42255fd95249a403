mod pcap;

pub use pcap::PcapFileSource;

use thiserror::Error;

/// One captured frame as handed to the decoder.
///
/// `data` holds exactly the captured bytes, so `data.len()` is the captured
/// length every decoder bounds check runs against. `ts` is the
/// capture-medium timestamp in seconds; it is report metadata only and
/// never participates in arbitration.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
    #[error("unsupported link type {linktype}; only Ethernet captures are supported")]
    UnsupportedLinkType { linktype: i32 },
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
            pcap::error::PcapSourceError::UnsupportedLinkType { linktype } => {
                SourceError::UnsupportedLinkType { linktype }
            }
        }
    }
}
