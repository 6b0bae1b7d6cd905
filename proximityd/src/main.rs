//! This is the `proximityd` daemon.
//!
//! Load the configuration, set up logging and signals, then run the poll loop until the
//! session expires, the token is refused, the panel fails or we get interrupted.
//!

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use serde_json::json;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use tracing::{info, trace};

use proximity_common::init_logging;
use proximity_sources::SampleSource;
use proximityd::{
    classify, Config, Opts, Planner, PollLoop, Session, SignalPacer, SubCommand,
    TerminationReason,
};

/// Binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    // These two do not need anything else.
    //
    match &opts.subcmd {
        Some(SubCommand::Completion(copts)) => {
            generate(copts.shell, &mut Opts::command(), NAME, &mut io::stdout());
            return Ok(());
        }
        Some(SubCommand::Version) => {
            eprintln!("Modules: ");
            eprintln!("\t{}", proximityd::version());
            eprintln!("\t{}", proximity_common::version());
            eprintln!("\t{}", proximity_sources::version());
            eprintln!("\t{}", proximity_display::version());
            return Ok(());
        }
        _ => (),
    }

    let cfg = Config::load(opts.config.clone())?;

    // CLI wins over the configuration file.
    //
    let log_dir = opts.log_dir.clone().or(cfg.log_dir.clone());
    init_logging(NAME, opts.debug, log_dir.as_deref())?;

    banner()?;

    match opts.subcmd {
        Some(SubCommand::Check) => check(&cfg),
        _ => {
            let reason = run(&cfg)?;
            std::process::exit(reason.exit_code());
        }
    }
}

/// Fetch once and print what we would show.
///
fn check(cfg: &Config) -> Result<()> {
    trace!("check");

    let source = cfg.tracker.tracker()?;
    let sample = source.fetch_once()?;
    let state = classify(&sample, cfg.home);
    let cmd = Planner::new(cfg.layout.clone()).plan(&state);

    let out = json!({
        "sample": sample,
        "state": state,
        "render": cmd,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// The daemon.
///
fn run(cfg: &Config) -> Result<TerminationReason> {
    trace!("run");

    let term = Arc::new(AtomicBool::new(false));

    // Setup signals
    //
    // NOTE: the first signal lets the loop end and tear the panel down, the second
    //       one kills us right away if that gets stuck.
    //
    for sig in TERM_SIGNALS {
        flag::register_conditional_shutdown(*sig, 1, Arc::clone(&term))?;
        flag::register(*sig, Arc::clone(&term))?;
    }

    let source = cfg.tracker.tracker()?;
    let panel = cfg.display.panel()?;
    let canvas = cfg.display.canvas();

    info!("home is {}", cfg.home);
    let session = Session::new(Instant::now(), cfg.session.max_duration, cfg.session.dedup);
    info!("session started at {}", session.started_at());

    let mut poll = PollLoop::new(
        Box::new(source),
        panel,
        Box::new(canvas),
        Planner::new(cfg.layout.clone()),
        cfg.home,
        session,
    )
    .interval(cfg.session.interval)
    .pacer(Box::new(SignalPacer::new(term)));

    Ok(poll.run())
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
