use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::protocols::feed::{SidePorts, decode_frame};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{
    CaptureSummary, DEFAULT_GENERATED_AT, InputInfo, REPORT_VERSION, Report, ToolInfo,
};

mod arbitration;

pub use arbitration::ArbitrationStats;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source error in {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: SourceError,
    },
}

/// Arbitrate a single capture file with the default side ports.
pub fn arbitrate_pcap_file(path: &Path) -> Result<Report, AnalysisError> {
    let mut analyzer = FeedAnalyzer::new(SidePorts::default());
    analyzer.process_file(path)?;
    Ok(analyzer.into_report())
}

/// Drives capture sources through the decoder into one shared aggregator.
///
/// One analyzer spans a whole run: matching state carries across files, so
/// a message captured on Side A in one file still pairs with its Side B
/// arrival from another. Sources are drained one at a time.
pub struct FeedAnalyzer {
    ports: SidePorts,
    stats: ArbitrationStats,
    inputs: Vec<InputInfo>,
    packets_total: u64,
    frames_decoded: u64,
    first_ts: Option<f64>,
    last_ts: Option<f64>,
}

impl FeedAnalyzer {
    pub fn new(ports: SidePorts) -> Self {
        Self {
            ports,
            stats: ArbitrationStats::new(),
            inputs: Vec::new(),
            packets_total: 0,
            frames_decoded: 0,
            first_ts: None,
            last_ts: None,
        }
    }

    /// Open `path` as a PCAP/PCAPNG source and drain it fully.
    pub fn process_file(&mut self, path: &Path) -> Result<(), AnalysisError> {
        let source = PcapFileSource::open(path).map_err(|err| AnalysisError::Source {
            path: path.display().to_string(),
            source: err,
        })?;
        self.inputs.push(InputInfo {
            path: path.display().to_string(),
            bytes: path.metadata()?.len(),
        });
        self.process_source(path, source)
    }

    /// Drain one packet source.
    ///
    /// Frames that fail decoding are skipped; a source fault or an
    /// unsupported link type aborts the source with its path attached.
    pub fn process_source<S: PacketSource>(
        &mut self,
        path: &Path,
        mut source: S,
    ) -> Result<(), AnalysisError> {
        let mut packets = 0u64;
        let mut decoded = 0u64;
        loop {
            let event = source.next_packet().map_err(|err| AnalysisError::Source {
                path: path.display().to_string(),
                source: err,
            })?;
            let Some(PacketEvent { ts, data }) = event else {
                break;
            };
            packets += 1;
            update_ts_bounds(&mut self.first_ts, &mut self.last_ts, ts);

            match decode_frame(&data, &self.ports) {
                Ok(Some(record)) => {
                    decoded += 1;
                    self.stats
                        .process(record.side, record.sequence, record.timestamp_ns);
                }
                Ok(None) => {}
                Err(err) => debug!(%err, "skipping malformed frame"),
            }
        }
        self.packets_total += packets;
        self.frames_decoded += decoded;
        info!(path = %path.display(), packets, decoded, "processed capture source");
        Ok(())
    }

    /// Snapshot the arbitration state; safe to call at any point.
    pub fn summary(&self) -> crate::ArbitrationSummary {
        self.stats.build_summary()
    }

    /// Consume the analyzer into the final report.
    pub fn into_report(self) -> Report {
        let capture = CaptureSummary {
            packets_total: self.packets_total,
            frames_decoded: self.frames_decoded,
            time_start: ts_to_rfc3339(self.first_ts),
            time_end: ts_to_rfc3339(self.last_ts),
        };
        let generated_at = capture
            .time_end
            .clone()
            .or_else(|| capture.time_start.clone())
            .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

        Report {
            report_version: REPORT_VERSION,
            tool: ToolInfo {
                name: "feedarb".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            generated_at,
            inputs: self.inputs,
            capture,
            arbitration: self.stats.build_summary(),
        }
    }
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
