//! Error types for tcpsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Only [`ScanError`]
//! ever aborts a scan; [`ConnectError`] and [`BannerError`] are absorbed
//! into the per-port outcome.

use crate::types::TargetError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Fatal, scan-level errors. Raised before any port is probed.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to resolve host '{host}': {reason}")]
    HostResolution { host: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<TargetError> for ScanError {
    fn from(err: TargetError) -> Self {
        Self::HostResolution {
            host: err.host().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Why a single connection attempt did not produce an open port.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ConnectError {
    #[error("connection refused")]
    Refused,

    #[error("connection timed out")]
    TimedOut,

    #[error("host unreachable")]
    HostUnreachable,

    #[error("network unreachable")]
    NetworkUnreachable,

    #[error("connection failed: {0}")]
    Other(String),
}

/// Failure during the banner exchange on an already-open port.
#[derive(Error, Debug)]
pub enum BannerError {
    #[error("failed to send banner trigger: {0}")]
    Write(std::io::Error),

    #[error("failed to read banner: {0}")]
    Read(std::io::Error),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
