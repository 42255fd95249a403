pub const ETHERNET_HEADER_LEN: usize = 14;
pub const ETHERTYPE_OFFSET: usize = 12;
pub const ETHERTYPE_IPV4: u16 = 0x0800;

pub const IPV4_VERSION: u8 = 4;
pub const IPV4_MIN_HEADER_LEN: usize = 20;
pub const IPV4_TOTAL_LENGTH_OFFSET: usize = 2;
pub const IPV4_PROTOCOL_OFFSET: usize = 9;
pub const IP_PROTOCOL_UDP: u8 = 17;

pub const UDP_HEADER_LEN: usize = 8;
pub const UDP_DST_PORT_OFFSET: usize = 2;
pub const UDP_LENGTH_OFFSET: usize = 4;

/// The sequence number occupies the first four payload bytes.
pub const SEQUENCE_LEN: usize = 4;

/// Metamako-style timestamp trailer appended after the network payload.
pub const TRAILER_LEN: usize = 20;
pub const TRAILER_SECONDS_OFFSET: usize = 8;
pub const TRAILER_NANOS_OFFSET: usize = 12;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Default multicast ports identifying the two redundant feeds.
pub const SIDE_A_PORT: u16 = 14310;
pub const SIDE_B_PORT: u16 = 15310;
