//! Command-line interface definitions for tcpsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags that are
//! not given fall back to the loaded [`Settings`].

mod scan;

pub use scan::execute;

use crate::config::Settings;
use crate::scanner::ScanRequest;
use crate::types::PortRange;
use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// A concurrent TCP connect port scanner.
///
/// Probes every port in START_PORT..=END_PORT on HOST and lists the ones that
/// accept a connection, optionally with the first bytes the service sends.
#[derive(Parser, Debug)]
#[command(name = "tcpsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect port scanner", long_about = None)]
pub struct Args {
    /// Target IP address or hostname to scan
    #[arg(value_name = "HOST")]
    pub host: String,

    /// First port of the range [default: 1]
    #[arg(value_name = "START_PORT")]
    pub start_port: Option<u16>,

    /// Last port of the range, inclusive [default: 1024]
    #[arg(value_name = "END_PORT")]
    pub end_port: Option<u16>,

    /// Maximum number of probes in flight [default: 100]
    #[arg(short = 't', long, visible_alias = "threads", visible_short_alias = 'c')]
    pub concurrency: Option<usize>,

    /// Per-port timeout in milliseconds [default: 750]
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Grab a banner from each open port
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Output format for results [default: plain]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbose output (log scan progress)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress everything but the results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "TCPSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Load settings from `--config` or the default location.
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        match &self.config {
            Some(path) => Settings::load_from(path)
                .with_context(|| format!("could not load settings from {}", path.display())),
            None => Settings::load().context("could not load settings"),
        }
    }

    /// Resolve the output format against the settings default.
    pub fn output_format(&self, settings: &Settings) -> anyhow::Result<OutputFormat> {
        match self.output {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&settings.output, true)
                .map_err(|e| anyhow!("invalid output format in settings: {}", e)),
        }
    }

    /// Build the scan request from flags and settings.
    pub fn to_request(&self, settings: &Settings) -> anyhow::Result<ScanRequest> {
        let start = self.start_port.unwrap_or(settings.start_port);
        let end = self.end_port.unwrap_or(settings.end_port);
        let ports = PortRange::from_bounds(start, end).context("invalid port range")?;

        Ok(ScanRequest::new(self.host.clone())
            .with_ports(ports)
            .with_concurrency(self.concurrency.unwrap_or(settings.concurrency))
            .with_timeout(Duration::from_millis(
                self.timeout.unwrap_or(settings.timeout_ms),
            ))
            .with_banners(self.banner || settings.banner))
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tcpsweep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let args = parse(&["example.com"]);
        let request = args.to_request(&Settings::default()).unwrap();

        assert_eq!(request.host, "example.com");
        assert_eq!(request.ports, PortRange::default());
        assert_eq!(request.concurrency, 100);
        assert_eq!(request.timeout, Duration::from_millis(750));
        assert!(!request.grab_banners);
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&["10.0.0.1", "20", "25", "--threads", "50", "--timeout", "200", "-b"]);
        let request = args.to_request(&Settings::default()).unwrap();

        assert_eq!(request.ports.start(), Port::new(20).unwrap());
        assert_eq!(request.ports.end(), Port::new(25).unwrap());
        assert_eq!(request.concurrency, 50);
        assert_eq!(request.timeout, Duration::from_millis(200));
        assert!(request.grab_banners);
    }

    #[test]
    fn test_short_t_sets_worker_count() {
        let args = parse(&["10.0.0.1", "20", "25", "-t", "50"]);
        let request = args.to_request(&Settings::default()).unwrap();

        assert_eq!(request.concurrency, 50);
        assert_eq!(request.timeout, Duration::from_millis(750));

        let args = parse(&["10.0.0.1", "-c", "8"]);
        assert_eq!(args.concurrency, Some(8));
    }

    #[test]
    fn test_port_zero_rejected() {
        let args = parse(&["10.0.0.1", "0", "10"]);
        assert!(args.to_request(&Settings::default()).is_err());
    }

    #[test]
    fn test_output_format_fallback() {
        let args = parse(&["10.0.0.1"]);
        let settings = Settings {
            output: "JSON".to_string(),
            ..Settings::default()
        };
        assert_eq!(args.output_format(&settings).unwrap(), OutputFormat::Json);

        let args = parse(&["10.0.0.1", "-o", "csv"]);
        assert_eq!(args.output_format(&settings).unwrap(), OutputFormat::Csv);

        let bad = Settings {
            output: "xml".to_string(),
            ..Settings::default()
        };
        assert!(parse(&["10.0.0.1"]).output_format(&bad).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["tcpsweep", "host", "-v", "-q"]).is_err());
    }
}
