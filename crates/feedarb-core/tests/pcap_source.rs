use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use etherparse::PacketBuilder;
use feedarb_core::{FeedAnalyzer, PacketSource, PcapFileSource, SidePorts, SourceError};

const TRAILER_LEN: usize = 20;
const LINKTYPE_ETHERNET: u32 = 1;
const LINKTYPE_RAW: u32 = 101;

fn trailer(seconds: u32, nanos: u32) -> [u8; TRAILER_LEN] {
    let mut block = [0u8; TRAILER_LEN];
    block[8..12].copy_from_slice(&seconds.to_be_bytes());
    block[12..16].copy_from_slice(&nanos.to_be_bytes());
    block
}

fn feed_frame(src_port: u16, dst_port: u16, sequence: u32, seconds: u32, nanos: u32) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([10, 0, 0, 1], [239, 1, 1, 1], 64)
        .udp(src_port, dst_port);
    let mut payload = sequence.to_le_bytes().to_vec();
    payload.extend_from_slice(&[0xAA; 12]);

    let mut frame = Vec::with_capacity(builder.size(payload.len()) + TRAILER_LEN);
    builder.write(&mut frame, &payload).unwrap();
    frame.extend_from_slice(&trailer(seconds, nanos));
    frame
}

/// Legacy PCAP bytes: little-endian global header plus one record per frame.
fn legacy_capture(linktype: u32, frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&linktype.to_le_bytes());
    for (ts_sec, ts_usec, data) in frames {
        out.extend_from_slice(&ts_sec.to_le_bytes());
        out.extend_from_slice(&ts_usec.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

/// Minimal PCAPNG bytes: section header, one interface, one enhanced packet
/// block per frame (microsecond timestamps, the interface default).
fn pcapng_capture(linktype: u16, frames: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();

    out.extend_from_slice(&0x0a0d_0d0au32.to_le_bytes());
    out.extend_from_slice(&28u32.to_le_bytes());
    out.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&u64::MAX.to_le_bytes());
    out.extend_from_slice(&28u32.to_le_bytes());

    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&20u32.to_le_bytes());
    out.extend_from_slice(&linktype.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&20u32.to_le_bytes());

    for (ts_micros, data) in frames {
        let padded = data.len().div_ceil(4) * 4;
        let total = 32 + padded as u32;
        out.extend_from_slice(&6u32.to_le_bytes());
        out.extend_from_slice(&total.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&((ts_micros >> 32) as u32).to_le_bytes());
        out.extend_from_slice(&(*ts_micros as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&vec![0u8; padded - data.len()]);
        out.extend_from_slice(&total.to_le_bytes());
    }
    out
}

fn write_temp_capture(prefix: &str, ext: &str, bytes: &[u8]) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("feedarb_{prefix}_{unique}.{ext}"));
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn legacy_capture_arbitrates_end_to_end() {
    let ports = SidePorts::default();
    let frames = vec![
        // Side A delivers sequence 1 at 1.000000100s, Side B 150ns later.
        (1, 0, feed_frame(ports.side_a, 40000, 1, 1, 100)),
        (1, 10, feed_frame(40000, ports.side_b, 1, 1, 250)),
        // Background traffic on foreign ports is skipped, not fatal.
        (2, 0, feed_frame(9999, 8888, 2, 1, 300)),
    ];
    let path = write_temp_capture("legacy", "pcap", &legacy_capture(LINKTYPE_ETHERNET, &frames));

    let mut analyzer = FeedAnalyzer::new(ports);
    analyzer.process_file(&path).unwrap();
    let report = analyzer.into_report();
    let _ = fs::remove_file(&path);

    assert_eq!(report.capture.packets_total, 3);
    assert_eq!(report.capture.frames_decoded, 2);
    assert_eq!(report.arbitration.total_packets_a, 1);
    assert_eq!(report.arbitration.total_packets_b, 1);
    assert_eq!(report.arbitration.faster_count_a, 1);
    assert_eq!(report.arbitration.avg_advantage_a_ns, 150.0);
    assert!(report.capture.time_start.is_some());
    assert_eq!(report.generated_at, report.capture.time_end.clone().unwrap());
}

#[test]
fn matching_state_carries_across_files() {
    let ports = SidePorts::default();
    let side_a = legacy_capture(
        LINKTYPE_ETHERNET,
        &[(1, 0, feed_frame(ports.side_a, 40000, 7, 2, 100))],
    );
    let side_b = legacy_capture(
        LINKTYPE_ETHERNET,
        &[(1, 5, feed_frame(40000, ports.side_b, 7, 2, 40))],
    );
    let path_a = write_temp_capture("split_a", "pcap", &side_a);
    let path_b = write_temp_capture("split_b", "pcap", &side_b);

    let mut analyzer = FeedAnalyzer::new(ports);
    analyzer.process_file(&path_a).unwrap();
    assert_eq!(analyzer.summary().unmatched_a, 1);
    analyzer.process_file(&path_b).unwrap();
    let summary = analyzer.summary();
    let _ = fs::remove_file(&path_a);
    let _ = fs::remove_file(&path_b);

    assert_eq!(summary.unmatched_a, 0);
    assert_eq!(summary.faster_count_b, 1);
    assert_eq!(summary.avg_advantage_b_ns, 60.0);
}

#[test]
fn pcapng_capture_decodes_feed_frames() {
    let ports = SidePorts::default();
    let frames = vec![
        (1_500_000u64, feed_frame(ports.side_a, 40000, 3, 5, 0)),
        (1_500_020u64, feed_frame(40000, ports.side_b, 3, 5, 900)),
    ];
    let path = write_temp_capture("ng", "pcapng", &pcapng_capture(1, &frames));

    let mut analyzer = FeedAnalyzer::new(ports);
    analyzer.process_file(&path).unwrap();
    let report = analyzer.into_report();
    let _ = fs::remove_file(&path);

    assert_eq!(report.capture.packets_total, 2);
    assert_eq!(report.capture.frames_decoded, 2);
    assert_eq!(report.arbitration.faster_count_a, 1);
    assert_eq!(report.arbitration.avg_advantage_a_ns, 900.0);
}

#[test]
fn legacy_non_ethernet_link_type_is_fatal() {
    let capture = legacy_capture(LINKTYPE_RAW, &[(1, 0, vec![0u8; 40])]);
    let path = write_temp_capture("rawlink", "pcap", &capture);

    let mut source = PcapFileSource::open(&path).unwrap();
    let err = source.next_packet().unwrap_err();
    assert!(matches!(
        err,
        SourceError::UnsupportedLinkType { linktype: 101 }
    ));

    // Through the analyzer the failure identifies the source file.
    let mut analyzer = FeedAnalyzer::new(SidePorts::default());
    let err = analyzer.process_file(&path).unwrap_err();
    let _ = fs::remove_file(&path);
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn pcapng_non_ethernet_interface_is_fatal() {
    let capture = pcapng_capture(113, &[(0, vec![0u8; 40])]);
    let path = write_temp_capture("ng_rawlink", "pcapng", &capture);

    let mut source = PcapFileSource::open(&path).unwrap();
    let err = source.next_packet().unwrap_err();
    let _ = fs::remove_file(&path);

    assert!(matches!(
        err,
        SourceError::UnsupportedLinkType { linktype: 113 }
    ));
}

#[test]
fn truncated_capture_file_is_rejected() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("feedarb_truncated_{unique}.pcap"));

    fs::write(&path, [0xd4, 0xc3, 0xb2]).unwrap();
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    let _ = fs::remove_file(&path);

    assert!(matches!(err, SourceError::Io(_)));
}
