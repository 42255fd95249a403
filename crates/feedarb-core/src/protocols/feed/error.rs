use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("capture too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unexpected IP version {version}")]
    BadIpVersion { version: u8 },
    #[error("IPv4 header length {length} below minimum")]
    BadIpHeaderLength { length: usize },
    #[error("IPv4 total length {length} cannot hold a UDP datagram")]
    BadIpTotalLength { length: usize },
    #[error("UDP length {length} below header size")]
    BadUdpLength { length: usize },
    #[error("UDP payload of {length} bytes cannot hold a sequence number")]
    PayloadTooShort { length: usize },
}
