use super::error::FrameError;
use super::layout;
use super::reader::FrameReader;

/// One of the two redundant market-data feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

/// Decoded arrival: which feed, which message, and the hardware receive
/// instant from the capture tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRecord {
    pub side: Side,
    pub sequence: u64,
    pub timestamp_ns: u64,
}

/// The UDP ports identifying the two feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePorts {
    pub side_a: u16,
    pub side_b: u16,
}

impl Default for SidePorts {
    fn default() -> Self {
        Self {
            side_a: layout::SIDE_A_PORT,
            side_b: layout::SIDE_B_PORT,
        }
    }
}

impl SidePorts {
    pub fn side_for(&self, port: u16) -> Option<Side> {
        if port == self.side_a {
            Some(Side::A)
        } else if port == self.side_b {
            Some(Side::B)
        } else {
            None
        }
    }
}

/// Decode one captured frame into a feed arrival record.
///
/// Returns `Ok(None)` for frames that are well-formed but not feed traffic
/// (wrong EtherType, non-UDP transport, no side port match) and `Err` for
/// structurally malformed or truncated captures. Call sites skip the frame
/// in both cases; nothing a capture contains is fatal here.
///
/// The trailer is located from the end of the captured frame, not from the
/// declared IP/UDP lengths: capture padding and truncation make the two
/// legitimately differ, so every check runs against the captured length.
pub fn decode_frame(frame: &[u8], ports: &SidePorts) -> Result<Option<PacketRecord>, FrameError> {
    let reader = FrameReader::new(frame);
    reader.require_len(layout::ETHERNET_HEADER_LEN + layout::TRAILER_LEN)?;

    let ether_type = reader.read_u16_be(layout::ETHERTYPE_OFFSET)?;
    if ether_type != layout::ETHERTYPE_IPV4 {
        return Ok(None);
    }

    reader.require_len(
        layout::ETHERNET_HEADER_LEN + layout::IPV4_MIN_HEADER_LEN + layout::TRAILER_LEN,
    )?;
    let ip = layout::ETHERNET_HEADER_LEN;
    let version_ihl = reader.read_u8(ip)?;
    let version = version_ihl >> 4;
    if version != layout::IPV4_VERSION {
        return Err(FrameError::BadIpVersion { version });
    }
    let ip_header_len = usize::from(version_ihl & 0x0f) * 4;
    if ip_header_len < layout::IPV4_MIN_HEADER_LEN {
        return Err(FrameError::BadIpHeaderLength {
            length: ip_header_len,
        });
    }

    let protocol = reader.read_u8(ip + layout::IPV4_PROTOCOL_OFFSET)?;
    if protocol != layout::IP_PROTOCOL_UDP {
        return Ok(None);
    }

    let total_length = usize::from(reader.read_u16_be(ip + layout::IPV4_TOTAL_LENGTH_OFFSET)?);
    if total_length < ip_header_len + layout::UDP_HEADER_LEN {
        return Err(FrameError::BadIpTotalLength {
            length: total_length,
        });
    }
    reader.require_len(layout::ETHERNET_HEADER_LEN + total_length + layout::TRAILER_LEN)?;

    let udp = ip + ip_header_len;
    reader.require_len(udp + layout::UDP_HEADER_LEN + layout::TRAILER_LEN)?;
    let udp_length = usize::from(reader.read_u16_be(udp + layout::UDP_LENGTH_OFFSET)?);
    if udp_length < layout::UDP_HEADER_LEN {
        return Err(FrameError::BadUdpLength { length: udp_length });
    }
    let payload_length = udp_length - layout::UDP_HEADER_LEN;
    if payload_length < layout::SEQUENCE_LEN {
        return Err(FrameError::PayloadTooShort {
            length: payload_length,
        });
    }

    let src_port = reader.read_u16_be(udp)?;
    let dst_port = reader.read_u16_be(udp + layout::UDP_DST_PORT_OFFSET)?;
    let side = match classify_side(src_port, dst_port, ports) {
        Some(side) => side,
        None => return Ok(None),
    };

    let payload = udp + layout::UDP_HEADER_LEN;
    reader.require_len(payload + layout::SEQUENCE_LEN + layout::TRAILER_LEN)?;
    let sequence = u64::from(reader.read_u32_le(payload)?);

    let trailer = reader.captured_len() - layout::TRAILER_LEN;
    let seconds = reader.read_u32_be(trailer + layout::TRAILER_SECONDS_OFFSET)?;
    let nanos = reader.read_u32_be(trailer + layout::TRAILER_NANOS_OFFSET)?;
    let timestamp_ns = u64::from(seconds) * layout::NANOS_PER_SECOND + u64::from(nanos);

    Ok(Some(PacketRecord {
        side,
        sequence,
        timestamp_ns,
    }))
}

/// When both ports name different sides the destination wins: the record
/// belongs to the receiving multicast group. A single match wins regardless
/// of direction, source checked first.
fn classify_side(src_port: u16, dst_port: u16, ports: &SidePorts) -> Option<Side> {
    let src = ports.side_for(src_port);
    let dst = ports.side_for(dst_port);
    match (src, dst) {
        (Some(src_side), Some(dst_side)) if src_side != dst_side => Some(dst_side),
        (Some(src_side), _) => Some(src_side),
        (None, dst_side) => dst_side,
    }
}
