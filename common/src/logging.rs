//! Common logging initializer
//!
//! Everything goes through `tracing`.  We always log to `stderr` (either compact or with the
//! hierarchical tree layer) and optionally to a per-run file named after the start time.
//!

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Default filter when `RUST_LOG` is not set
const DEF_FILTER: &str = "info";

/// Name of the per-run log file, e.g. `proximityd-2024-05-01_12:00:00.log`
///
pub fn log_file_name(name: &str, start: DateTime<Local>) -> String {
    format!("{}-{}.log", name, start.format("%Y-%m-%d_%H:%M:%S"))
}

#[tracing::instrument]
pub fn init_logging(name: &'static str, use_tree: bool, use_dir: Option<&Path>) -> Result<()> {
    // Initialise logging early
    //
    // Load filters from environment
    //
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEF_FILTER));

    // Do we want hierarchical output?
    //
    let (tree, compact) = if use_tree {
        let tree = HierarchicalLayer::new(2)
            .with_ansi(true)
            .with_span_retrace(true)
            .with_span_modes(true)
            .with_targets(true)
            .with_verbose_entry(true)
            .with_verbose_exit(true)
            .with_bracketed_fields(true);
        (Some(tree), None)
    } else {
        let compact = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact();
        (None, Some(compact))
    };

    // Log to file?
    //
    let file = match use_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;

            // One file per run, never rotated.
            //
            let fname = log_file_name(name, Local::now());
            let file_appender = tracing_appender::rolling::never(dir, fname);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    // Combine filters & exporters
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(compact)
        .with(file)
        .try_init()?;

    Ok(())
}
