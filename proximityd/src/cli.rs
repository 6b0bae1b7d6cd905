//! Options and sub-commands of `proximityd`.
//!
//! - `run` is the daemon itself and the default,
//! - `check` does one fetch and shows what would be drawn, the panel is not touched,
//! - `completion` and `version` do not need a configuration file.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// debug mode (hierarchical traces).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Directory for the per-run log file, overrides `log_dir`.
    #[clap(short = 'L', long = "log-dir")]
    pub log_dir: Option<PathBuf>,
    /// Sub-commands (see below), `run` if none.
    #[clap(subcommand)]
    pub subcmd: Option<SubCommand>,
}

// ------

/// All sub-commands:
///
/// `check`
/// `completion SHELL`
/// `run`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Fetch once and show the resulting frame description
    Check,
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Poll and display until the session ends
    Run,
    /// List all package versions
    Version,
}

// ------

/// Options for completion
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
