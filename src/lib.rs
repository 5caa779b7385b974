//! # tcpsweep - A Concurrent TCP Port Scanner
//!
//! tcpsweep determines which TCP ports of a host accept connections within a
//! time budget, optionally capturing the first bytes each open service sends.
//!
//! ## Features
//!
//! - **Bounded Concurrency**: At most `concurrency` probes in flight, each on
//!   its own tokio task
//! - **Failure Isolation**: Refused, timed-out or unreachable ports become
//!   data, never scan-level errors
//! - **Banner Grabbing**: Lossy, size-capped capture of service greetings
//! - **Live Progress**: Every outcome is streamed as soon as it completes
//! - **Cancellation**: Interrupted scans return their partial results
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use tcpsweep::scanner::{scan, ScanRequest};
//! use tcpsweep::types::PortRange;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let request = ScanRequest::new("127.0.0.1")
//!         .with_ports(PortRange::from_bounds(1, 1024)?)
//!         .with_concurrency(200)
//!         .with_timeout(Duration::from_millis(500))
//!         .with_banners(true);
//!
//!     let report = scan(request).await?;
//!     for outcome in &report.results {
//!         println!("{} open {:?}", outcome.port, outcome.banner);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port and target types with validation
//! - [`scanner`] - The scan coordinator, the `Prober` trait and the TCP probe
//! - [`banner`] - Banner exchange and decoding
//! - [`config`] - Settings file handling
//! - [`error`] - Error types
//! - [`cli`], [`output`], [`logging`] - The command-line front end

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{BannerError, ConnectError, ScanError};
pub use scanner::{
    scan, PortStatus, ProbeOutcome, Prober, ScanCoordinator, ScanReport, ScanRequest, ScanResult,
};
pub use types::{Port, PortRange, ScanTarget};
