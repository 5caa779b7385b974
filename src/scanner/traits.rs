//! Probe abstraction.
//!
//! Defines the per-port outcome type and the `Prober` trait the coordinator
//! dispatches against, so the dispatch logic can be driven by any probe
//! implementation.

use crate::error::ConnectError;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a probed port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// The TCP handshake completed.
    Open,
    /// The connection was actively refused.
    Closed,
    /// The attempt failed for any other reason (timeout, unreachable, ...).
    Errored(ConnectError),
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Errored(ConnectError::TimedOut) => write!(f, "filtered"),
            Self::Errored(_) => write!(f, "error"),
        }
    }
}

/// Result of probing a single port.
///
/// Built once by a probe and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
    /// Banner captured from the service (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Connect time in milliseconds, for open ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ProbeOutcome {
    fn new(port: Port, status: PortStatus) -> Self {
        Self {
            port,
            status,
            banner: None,
            response_time_ms: None,
        }
    }

    /// An open port.
    pub fn open(port: Port) -> Self {
        Self::new(port, PortStatus::Open)
    }

    /// Build the outcome of a failed connection attempt.
    pub fn failed(port: Port, error: ConnectError) -> Self {
        let status = match error {
            ConnectError::Refused => PortStatus::Closed,
            other => PortStatus::Errored(other),
        };
        Self::new(port, status)
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Set the response time.
    pub fn with_response_time(mut self, time_ms: u64) -> Self {
        self.response_time_ms = Some(time_ms);
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        matches!(self.status, PortStatus::Open)
    }

    /// The connect failure behind a non-open outcome.
    pub fn error(&self) -> Option<ConnectError> {
        match &self.status {
            PortStatus::Open => None,
            PortStatus::Closed => Some(ConnectError::Refused),
            PortStatus::Errored(e) => Some(e.clone()),
        }
    }
}

/// Something that can probe a single port of an already-resolved target.
///
/// Implementations must not fail: every failure mode is folded into the
/// returned [`ProbeOutcome`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port.
    async fn probe(&self, port: Port) -> ProbeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_port_status_display() {
        assert_eq!(PortStatus::Open.to_string(), "open");
        assert_eq!(PortStatus::Closed.to_string(), "closed");
        assert_eq!(PortStatus::Errored(ConnectError::TimedOut).to_string(), "filtered");
        assert_eq!(
            PortStatus::Errored(ConnectError::HostUnreachable).to_string(),
            "error"
        );
    }

    #[test]
    fn test_refused_maps_to_closed() {
        let outcome = ProbeOutcome::failed(port(81), ConnectError::Refused);
        assert_eq!(outcome.status, PortStatus::Closed);
        assert!(!outcome.is_open());
        assert_eq!(outcome.error(), Some(ConnectError::Refused));
    }

    #[test]
    fn test_timeout_maps_to_errored() {
        let outcome = ProbeOutcome::failed(port(81), ConnectError::TimedOut);
        assert_eq!(outcome.status, PortStatus::Errored(ConnectError::TimedOut));
        assert_eq!(outcome.error(), Some(ConnectError::TimedOut));
    }

    #[test]
    fn test_open_outcome() {
        let outcome = ProbeOutcome::open(port(22))
            .with_banner(Some("SSH-2.0-OpenSSH_9.6".to_string()))
            .with_response_time(15);

        assert!(outcome.is_open());
        assert_eq!(outcome.error(), None);
        assert_eq!(outcome.banner.as_deref(), Some("SSH-2.0-OpenSSH_9.6"));
        assert_eq!(outcome.response_time_ms, Some(15));
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(ProbeOutcome::open(port(80))).unwrap();
        assert_eq!(json["port"], 80);
        assert_eq!(json["status"], "open");
        assert!(json.get("banner").is_none());
    }
}
