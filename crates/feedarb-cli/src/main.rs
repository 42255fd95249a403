use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use feedarb_core::{ArbitrationSummary, FeedAnalyzer, Report, SidePorts};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("FEEDARB_BUILD_COMMIT"),
    ", built ",
    env!("FEEDARB_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "feedarb")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Feed-arbitration latency analyzer for redundant market-data captures.",
    long_about = None,
    after_help = "Examples:\n  feedarb arbitrate captures/\n  feedarb arbitrate capture.pcap -o report.json\n  feedarb arbitrate 'captures/*.pcap' --stdout --pretty"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay captures and determine which feed delivered each message first.
    #[command(
        after_help = "Examples:\n  feedarb arbitrate captures/\n  feedarb arbitrate capture.pcap --port-a 20001 --port-b 20002"
    )]
    Arbitrate {
        /// A capture file, a directory of captures, or a glob pattern
        input: PathBuf,

        /// UDP port identifying Side A traffic
        #[arg(long, value_name = "PORT")]
        port_a: Option<u16>,

        /// UDP port identifying Side B traffic
        #[arg(long, value_name = "PORT")]
        port_b: Option<u16>,

        /// Also write the JSON report to this path
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,

        /// Write the JSON report to stdout instead of the text summary
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Arbitrate {
            input,
            port_a,
            port_b,
            report,
            stdout,
            pretty,
            compact,
            quiet,
        } => cmd_arbitrate(input, port_a, port_b, report, stdout, pretty, compact, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_arbitrate(
    input: PathBuf,
    port_a: Option<u16>,
    port_b: Option<u16>,
    report_path: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let inputs = collect_inputs(&input)?;

    let mut ports = SidePorts::default();
    if let Some(port) = port_a {
        ports.side_a = port;
    }
    if let Some(port) = port_b {
        ports.side_b = port;
    }

    let mut analyzer = FeedAnalyzer::new(ports);
    for path in &inputs {
        analyzer
            .process_file(path)
            .map_err(|err| CliError::new(err.to_string(), None))?;
    }
    let report = analyzer.into_report();

    if stdout {
        let json = serialize_report(&report, pretty, compact)?;
        print!("{}", json);
        return Ok(());
    }

    print!("{}", render_summary(&report.arbitration));

    if let Some(report_path) = report_path {
        let json = serialize_report(&report, pretty, compact)?;
        if let Some(parent) = report_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(&report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        if !quiet {
            eprintln!("OK: report written -> {}", report_path.display());
        }
    }
    Ok(())
}

/// Render the summary in the fixed reference layout: raw totals, unmatched
/// counts, faster-counts, then the three averages to two decimals.
fn render_summary(summary: &ArbitrationSummary) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Side A total packets: {}", summary.total_packets_a);
    let _ = writeln!(out, "Side B total packets: {}", summary.total_packets_b);
    let _ = writeln!(out, "Side A unmatched packets: {}", summary.unmatched_a);
    let _ = writeln!(out, "Side B unmatched packets: {}", summary.unmatched_b);
    let _ = writeln!(out, "Packets where A faster: {}", summary.faster_count_a);
    let _ = writeln!(out, "Packets where B faster: {}", summary.faster_count_b);
    let _ = writeln!(
        out,
        "Average advantage when A faster: {:.2} ns",
        summary.avg_advantage_a_ns
    );
    let _ = writeln!(
        out,
        "Average advantage when B faster: {:.2} ns",
        summary.avg_advantage_b_ns
    );
    let _ = writeln!(
        out,
        "Average advantage of fastest channel overall: {:.2} ns",
        summary.avg_fastest_advantage_ns
    );
    out
}

fn serialize_report(report: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

/// Resolve the positional input into the ordered list of capture files:
/// a glob pattern expands to its matches, a directory is scanned one level
/// deep, and a plain path must itself be a capture file.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = input.to_string_lossy();
    if is_glob_pattern(&pattern) {
        return resolve_glob(&pattern);
    }

    let meta = fs::metadata(input).map_err(|err| {
        CliError::new(
            format!("cannot read input {}: {}", input.display(), err),
            Some("pass a capture file or a directory of captures".to_string()),
        )
    })?;

    if meta.is_dir() {
        return scan_directory(input);
    }
    if !is_capture_file(input) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(vec![input.to_path_buf()])
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(dir).map_err(|err| {
        CliError::new(
            format!("cannot read directory {}: {}", dir.display(), err),
            None,
        )
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            CliError::new(
                format!("cannot read directory {}: {}", dir.display(), err),
                None,
            )
        })?;
        let path = entry.path();
        if path.is_file() && is_capture_file(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(CliError::new(
            format!("no capture files found in directory: {}", dir.display()),
            Some("expected .pcap or .pcapng files".to_string()),
        ));
    }
    files.sort();
    Ok(files)
}

fn resolve_glob(pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let paths = glob(pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() && is_capture_file(&path) {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no capture files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        ));
    }
    matches.sort();
    Ok(matches)
}

fn is_capture_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    ext == "pcap" || ext == "pcapng"
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
