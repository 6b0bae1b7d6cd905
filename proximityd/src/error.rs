//! Error module
//!

use thiserror::Error;

/// Startup errors, everything after that is a `TerminationReason`.
///
#[derive(Debug, Error)]
pub enum Status {
    #[error("Missing tracker URL in configuration")]
    NoTrackerUrl,
    #[error("Bad home coordinates ({0}, {1})")]
    BadHome(f64, f64),
    #[error("Bad panel size {0}x{1}")]
    BadPanelSize(u32, u32),
    #[error("Session interval must be shorter than max_duration")]
    BadInterval,
}
