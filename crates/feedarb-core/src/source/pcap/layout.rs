/// First four bytes of a PCAPNG section header block.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Buffer size handed to the pcap-parser readers.
pub const PCAP_READER_BUFFER_SIZE: usize = 65536;
