//! Core library for post-mortem feed-arbitration analysis.
//!
//! This crate implements the offline pipeline used by the CLI: packet
//! sources replay captured frames into the feed frame decoder, whose records
//! drive the arbitration aggregator. For every message sequence number seen
//! on both redundant market-data channels ("Side A", "Side B") the
//! aggregator determines which side delivered it first and by how much,
//! using the hardware receive timestamp carried in each frame's vendor
//! trailer rather than the capture-medium clock.
//!
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules. Frame layout conventions are captured in readers so the
//! parser stays free of direct indexing.
//!
//! Invariants:
//! - Every byte access in the decoder is bounds-checked against the
//!   captured frame length before the read happens.
//! - A sequence number observed at least once is tracked by exactly one
//!   slot: pending with one side recorded, or completed.
//! - Summaries are snapshots; building one never perturbs later processing.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use feedarb_core::arbitrate_pcap_file;
//!
//! let report = arbitrate_pcap_file(Path::new("capture.pcap"))?;
//! println!("A faster on {} messages", report.arbitration.faster_count_a);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::{AnalysisError, ArbitrationStats, FeedAnalyzer, arbitrate_pcap_file};
pub use protocols::feed::{FrameError, PacketRecord, Side, SidePorts, decode_frame};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated arbitration report for one run.
///
/// # Examples
/// ```
/// use feedarb_core::{FeedAnalyzer, SidePorts};
///
/// let report = FeedAnalyzer::new(SidePorts::default()).into_report();
/// assert_eq!(report.report_version, feedarb_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Capture files consumed by this run, in processing order.
    pub inputs: Vec<InputInfo>,

    /// Raw capture statistics across all inputs.
    pub capture: CaptureSummary,
    /// Arbitration results.
    pub arbitration: ArbitrationSummary,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "feedarb").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// One input capture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture statistics (timestamps may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed across all inputs.
    pub packets_total: u64,
    /// Packets successfully decoded into feed records.
    pub frames_decoded: u64,
    /// RFC3339 capture timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 capture timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Snapshot of the arbitration state.
///
/// Totals count raw arrivals including duplicates; faster-counts and
/// advantage averages only cover sequence numbers matched on both sides.
/// An average is exactly `0.0` when its faster-count is zero.
///
/// # Examples
/// ```
/// use feedarb_core::{ArbitrationStats, Side};
///
/// let mut stats = ArbitrationStats::new();
/// stats.process(Side::A, 1, 100);
/// stats.process(Side::B, 1, 250);
/// let summary = stats.build_summary();
/// assert_eq!(summary.faster_count_a, 1);
/// assert_eq!(summary.avg_advantage_a_ns, 150.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationSummary {
    /// Raw packets seen on Side A, duplicates included.
    pub total_packets_a: u64,
    /// Raw packets seen on Side B, duplicates included.
    pub total_packets_b: u64,
    /// Sequence numbers seen only on Side A so far.
    pub unmatched_a: u64,
    /// Sequence numbers seen only on Side B so far.
    pub unmatched_b: u64,
    /// Matched sequence numbers where Side A arrived first.
    pub faster_count_a: u64,
    /// Matched sequence numbers where Side B arrived first.
    pub faster_count_b: u64,
    /// Mean margin in nanoseconds over A-faster matches.
    pub avg_advantage_a_ns: f64,
    /// Mean margin in nanoseconds over B-faster matches.
    pub avg_advantage_b_ns: f64,
    /// Mean winning margin in nanoseconds over all decided matches.
    pub avg_fastest_advantage_ns: f64,
}
