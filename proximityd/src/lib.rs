//! `proximityd` library part.
//!
//! The daemon polls a tracker for the last known position of one person, works out whether
//! they are at home, in a named place or away (and how far), and shows it on an e-paper panel.
//!
//! - `presence` classifies a sample,
//! - `planner` turns the classification into what to draw,
//! - `session` holds all mutable state of a run,
//! - `engine` is the poll loop itself, returning a `TerminationReason`.
//!

use clap::{crate_name, crate_version};

pub use cli::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use planner::*;
pub use presence::*;
pub use session::*;
pub use termination::*;

mod cli;
mod config;
mod engine;
mod error;
mod planner;
mod presence;
mod session;
mod termination;

const NAME: &str = crate_name!();
const VERSION: &str = crate_version!();

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}
