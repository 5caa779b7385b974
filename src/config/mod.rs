//! Configuration management for tcpsweep.
//!
//! Provides XDG-compliant settings storage for scan defaults.

mod settings;

pub use settings::{Paths, Settings};
