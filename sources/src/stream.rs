//! Lazy polling subscription on top of any `SampleSource`.
//!
//! This is the "stream" flavour of a source: an infinite iterator that calls `fetch_once()`
//! every `every`.  Nothing is fetched until `next()` is called.
//!

use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::{FetchError, LocationSample, SampleSource};

/// Infinite sequence of fetch results.
///
#[derive(Debug)]
pub struct Samples<'a> {
    src: &'a dyn SampleSource,
    every: Duration,
    started: bool,
}

impl<'a> Samples<'a> {
    pub fn new(src: &'a dyn SampleSource, every: Duration) -> Self {
        Self {
            src,
            every,
            started: false,
        }
    }
}

impl Iterator for Samples<'_> {
    type Item = Result<LocationSample, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        // First one is immediate
        //
        if self.started && !self.every.is_zero() {
            thread::sleep(self.every);
        }
        self.started = true;

        trace!("polling {}", self.src.name());
        Some(self.src.fetch_once())
    }
}
