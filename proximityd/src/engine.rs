//! The poll loop.
//!
//! One thread, one iteration at a time:
//!
//! 1. stop if interrupted or if the session is over,
//! 2. fetch the last sample,
//! 3. render it unless it is the same as the last one shown,
//! 4. sleep `interval` (the only place where SIGINT/SIGTERM is waited for).
//!
//! A render always completes before the interrupt flag is looked at again.
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use proximity_common::Coordinate;
use proximity_display::{DisplayError, Panel, Rasterizer, RefreshMode, WHITE};
use proximity_sources::{LocationSample, SampleSource};

use crate::{classify, Clock, Planner, Session, SystemClock, TerminationReason};

/// Default time between two polls
pub const DEF_INTERVAL: Duration = Duration::from_secs(10);

/// Granularity of the cancellable sleep
const SLICE: Duration = Duration::from_millis(100);

/// Waiting between polls and knowing when to stop.
///
pub trait Pacer: std::fmt::Debug {
    /// Has the operator asked us to stop?
    fn interrupted(&self) -> bool;
    /// Sleep for `d` or until interrupted
    fn pause(&mut self, d: Duration);
}

/// Real pacer, the flag is set by `signal-hook`.
///
#[derive(Debug, Default)]
pub struct SignalPacer {
    term: Arc<AtomicBool>,
}

impl SignalPacer {
    pub fn new(term: Arc<AtomicBool>) -> Self {
        Self { term }
    }
}

impl Pacer for SignalPacer {
    #[inline]
    fn interrupted(&self) -> bool {
        self.term.load(Ordering::Relaxed)
    }

    fn pause(&mut self, d: Duration) {
        let end = Instant::now() + d;
        while !self.interrupted() {
            let now = Instant::now();
            if now >= end {
                break;
            }
            thread::sleep(SLICE.min(end - now));
        }
    }
}

#[derive(Debug)]
pub struct PollLoop {
    source: Box<dyn SampleSource>,
    panel: Box<dyn Panel>,
    rasterizer: Box<dyn Rasterizer>,
    planner: Planner,
    /// Reference point for distances
    home: Coordinate,
    interval: Duration,
    session: Session,
    clock: Box<dyn Clock>,
    pacer: Box<dyn Pacer>,
}

impl PollLoop {
    pub fn new(
        source: Box<dyn SampleSource>,
        panel: Box<dyn Panel>,
        rasterizer: Box<dyn Rasterizer>,
        planner: Planner,
        home: Coordinate,
        session: Session,
    ) -> Self {
        Self {
            source,
            panel,
            rasterizer,
            planner,
            home,
            interval: DEF_INTERVAL,
            session,
            clock: Box::new(SystemClock),
            pacer: Box::new(SignalPacer::default()),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Time since the session started
    ///
    pub fn elapsed(&self) -> Duration {
        self.session.elapsed(self.clock.now())
    }

    /// Wake the panel up and start from a white screen.
    ///
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), DisplayError> {
        info!(
            "starting with {} on {}, every {}s for at most {}s",
            self.source.name(),
            self.panel.name(),
            self.interval.as_secs(),
            self.session.max_duration().as_secs()
        );
        self.panel.init(RefreshMode::Full)?;
        self.panel.clear(WHITE)
    }

    /// One iteration, `Some(reason)` ends the loop.
    ///
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self) -> Option<TerminationReason> {
        if self.pacer.interrupted() {
            return Some(TerminationReason::Interrupted);
        }

        let now = self.clock.now();
        if self.session.is_expired(now) {
            return Some(TerminationReason::SessionExpired {
                elapsed: self.session.elapsed(now),
            });
        }

        self.session.polled();
        match self.source.fetch_once() {
            Ok(sample) => {
                if self.session.needs_render(&sample) {
                    if let Err(e) = self.render(sample) {
                        return Some(TerminationReason::DisplayFault(e.to_string()));
                    }
                } else {
                    debug!("unchanged: {sample}");
                }
            }
            Err(e) if e.is_fatal() => {
                error!("fetch from {} failed: {e}", self.source.name());
                return Some(TerminationReason::Unauthorized);
            }
            Err(e) => {
                warn!(
                    "fetch #{} from {} failed: {e}, keeping current display",
                    self.session.polls(),
                    self.source.name()
                );
            }
        }

        trace!("sleeping {}s", self.interval.as_secs());
        self.pacer.pause(self.interval);
        None
    }

    /// Classify, plan, rasterize and push to the panel.
    ///
    fn render(&mut self, sample: LocationSample) -> Result<(), DisplayError> {
        let state = classify(&sample, self.home);
        let cmd = self.planner.plan(&state);
        info!("{sample} is {state}: {cmd}");

        let buf = self
            .rasterizer
            .rasterize(cmd.background, &cmd.lines(self.planner.layout()))?;

        if self.session.is_first_render() {
            self.panel.init(RefreshMode::Full)?;
            self.panel.display_full(&buf)?;
        } else {
            self.panel.init(RefreshMode::Partial)?;
            self.panel.display_partial(&buf)?;
        }
        self.session.rendered(sample);
        Ok(())
    }

    /// Put the panel to sleep and release it, errors are only logged.
    ///
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self) {
        if let Err(e) = self.panel.sleep() {
            error!("panel sleep failed: {e}");
        }
        if let Err(e) = self.panel.shutdown() {
            error!("panel shutdown failed: {e}");
        }
    }

    /// Run until something stops us, then tear the panel down.
    ///
    pub fn run(&mut self) -> TerminationReason {
        let reason = match self.start() {
            Ok(()) => loop {
                if let Some(reason) = self.step() {
                    break reason;
                }
            },
            Err(e) => TerminationReason::DisplayFault(e.to_string()),
        };

        reason.log();
        info!(
            "{} polls, {} renders in {}s",
            self.session.polls(),
            self.session.renders(),
            self.elapsed().as_secs()
        );
        self.teardown();
        reason
    }
}
