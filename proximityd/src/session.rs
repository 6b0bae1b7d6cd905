//! Everything that changes during a run.
//!
//! The `Session` is owned by the poll loop and only mutated there.  `last_observed` starts
//! at the sentinel (0, 0) and is only replaced after a successful render, so a failed render
//! gets retried with the next sample.
//!
//! Session length is measured on the monotonic clock, NTP adjustments of the wall clock do not
//! shorten or extend it.  The wall clock start is only kept for logging.
//!

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use proximity_sources::LocationSample;

/// When is a sample the same as the last one shown?
///
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DedupPolicy {
    /// Same coordinates, exact comparison
    #[default]
    Position,
    /// Same coordinates and same named place
    Place,
}

impl DedupPolicy {
    pub fn same(&self, a: &LocationSample, b: &LocationSample) -> bool {
        match self {
            DedupPolicy::Position => a.same_position(b),
            DedupPolicy::Place => a.same_place(b),
        }
    }
}

/// Source of monotonic "now", swapped in tests.
///
pub trait Clock: std::fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    /// When did we start, monotonic
    origin: Instant,
    /// Same, wall clock
    started_at: DateTime<Utc>,
    /// How long do we run
    max_duration: Duration,
    dedup: DedupPolicy,
    /// Last sample successfully shown
    last_observed: LocationSample,
    /// Next render is a full refresh
    is_first_render: bool,
    /// Frames pushed
    renders: usize,
    /// Fetch attempts
    polls: usize,
}

impl Session {
    pub fn new(origin: Instant, max_duration: Duration, dedup: DedupPolicy) -> Self {
        Self {
            origin,
            started_at: Utc::now(),
            max_duration,
            dedup,
            last_observed: LocationSample::sentinel(),
            is_first_render: true,
            renders: 0,
            polls: 0,
        }
    }

    /// Time since start, zero for an instant before it.
    ///
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }

    /// Strictly more than `max_duration`.
    ///
    pub fn is_expired(&self, now: Instant) -> bool {
        self.elapsed(now) > self.max_duration
    }

    /// Does `sample` need to be drawn?
    ///
    pub fn needs_render(&self, sample: &LocationSample) -> bool {
        if self.is_first_render {
            return true;
        }
        !self.dedup.same(sample, &self.last_observed)
    }

    /// Record a successful render of `sample`.
    ///
    pub fn rendered(&mut self, sample: LocationSample) {
        trace!("rendered {sample}");
        self.last_observed = sample;
        self.is_first_render = false;
        self.renders += 1;
    }

    #[inline]
    pub fn polled(&mut self) {
        self.polls += 1;
    }

    #[inline]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    #[inline]
    pub fn dedup(&self) -> DedupPolicy {
        self.dedup
    }

    #[inline]
    pub fn last_observed(&self) -> &LocationSample {
        &self.last_observed
    }

    #[inline]
    pub fn is_first_render(&self) -> bool {
        self.is_first_render
    }

    #[inline]
    pub fn renders(&self) -> usize {
        self.renders
    }

    #[inline]
    pub fn polls(&self) -> usize {
        self.polls
    }
}

#[cfg(test)]
mod tests {
    use proximity_common::Coordinate;
    use proximity_sources::{PlaceKind, PlaceMetadata};

    use super::*;

    fn session(dedup: DedupPolicy) -> Session {
        Session::new(Instant::now(), Duration::from_secs(100), dedup)
    }

    #[test]
    fn test_session_new() {
        let s = session(DedupPolicy::Position);

        assert!(s.is_first_render());
        assert_eq!(&LocationSample::sentinel(), s.last_observed());
        assert_eq!(0, s.renders());
        assert_eq!(0, s.polls());
    }

    #[test]
    fn test_session_expiry_is_strict() {
        let s = session(DedupPolicy::Position);
        let origin = s.origin();

        assert!(!s.is_expired(origin));
        assert!(!s.is_expired(origin + Duration::from_secs(100)));
        assert!(s.is_expired(origin + Duration::from_millis(100_001)));
    }

    #[test]
    fn test_session_elapsed_is_monotonic() {
        let origin = Instant::now() + Duration::from_secs(10);
        let s = Session::new(origin, Duration::from_secs(100), DedupPolicy::Position);

        // Before the origin saturates
        assert_eq!(Duration::ZERO, s.elapsed(Instant::now()));
        assert_eq!(Duration::from_secs(5), s.elapsed(origin + Duration::from_secs(5)));
        assert!(s.started_at() <= Utc::now());
    }

    #[test]
    fn test_session_first_render_always() {
        let mut s = session(DedupPolicy::Position);

        // Even the sentinel itself
        assert!(s.needs_render(&LocationSample::sentinel()));
        s.rendered(LocationSample::sentinel());
        assert!(!s.is_first_render());
        assert!(!s.needs_render(&LocationSample::sentinel()));
    }

    #[test]
    fn test_session_dedup_position() {
        let mut s = session(DedupPolicy::Position);
        let pos = Coordinate::new(44.1, 15.2);

        s.rendered(LocationSample::new(pos, None));
        let moved_place =
            LocationSample::new(pos, Some(PlaceMetadata::new("Office", PlaceKind::Work)));
        assert!(!s.needs_render(&moved_place));
        assert!(s.needs_render(&LocationSample::new(Coordinate::new(44.1, 15.3), None)));
    }

    #[test]
    fn test_session_dedup_place() {
        let mut s = session(DedupPolicy::Place);
        let pos = Coordinate::new(44.1, 15.2);

        s.rendered(LocationSample::new(pos, None));
        let moved_place =
            LocationSample::new(pos, Some(PlaceMetadata::new("Office", PlaceKind::Work)));
        assert!(s.needs_render(&moved_place));
        assert!(!s.needs_render(&LocationSample::new(pos, None)));
    }

    #[test]
    fn test_session_counters() {
        let mut s = session(DedupPolicy::Position);

        s.polled();
        s.polled();
        s.rendered(LocationSample::new(Coordinate::new(1., 2.), None));
        assert_eq!(2, s.polls());
        assert_eq!(1, s.renders());
    }

    #[test]
    fn test_dedup_policy_parse() {
        assert_eq!(DedupPolicy::Place, "place".parse::<DedupPolicy>().unwrap());
        assert_eq!("position", DedupPolicy::Position.to_string());
    }
}
