//! Why did the loop stop?
//!

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::{error, info, warn};

/// Returned by the poll loop, every path ends with the same teardown.
///
#[derive(Clone, Debug, PartialEq)]
pub enum TerminationReason {
    /// Ran for longer than `max_duration`
    SessionExpired { elapsed: Duration },
    /// The tracker refused our token
    Unauthorized,
    /// SIGINT/SIGTERM
    Interrupted,
    /// Rasterizer or panel failure
    DisplayFault(String),
}

impl TerminationReason {
    /// Log the reason at the right level.
    ///
    pub fn log(&self) {
        match self {
            TerminationReason::SessionExpired { .. } => info!("{self}"),
            TerminationReason::Interrupted => warn!("{self}"),
            TerminationReason::Unauthorized | TerminationReason::DisplayFault(_) => {
                error!("{self}")
            }
        }
    }

    /// Process exit code, the daemon is restarted by its supervisor anyway.
    ///
    pub fn exit_code(&self) -> i32 {
        0
    }
}

impl Display for TerminationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::SessionExpired { elapsed } => {
                write!(f, "session expired after {}s, exiting", elapsed.as_secs())
            }
            TerminationReason::Unauthorized => write!(f, "client not authorized, exiting"),
            TerminationReason::Interrupted => write!(f, "interrupted by operator, exiting"),
            TerminationReason::DisplayFault(e) => write!(f, "display fault: {e}, exiting"),
        }
    }
}
