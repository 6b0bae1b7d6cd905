//! Module to deal with the different kind of sources we can get location samples from.
//!
//! The different submodules deal with the differences between sources:
//!
//! - authentication (token from the environment, inline API key)
//! - fetching data (endpoint, payload shapes, etc.).
//!
//! The poll loop only ever sees the `SampleSource` trait.
//!

use std::fmt::Debug;
use std::time::Duration;

// Re-export these modules for a shorted import path.
//
pub use access::*;
pub use auth::*;
pub use error::*;
pub use sample::*;
pub use stream::*;

mod access;
mod auth;
mod error;
mod sample;
mod stream;

#[macro_use]
mod macros;

/// This trait enables us to manage different ways of getting location samples under
/// a single interface.
///
/// `fetch_once()` is the synchronous request/response call used by the poll loop,
/// `subscribe()` wraps it into a lazy, infinite sequence.  Calling `subscribe()` again
/// restarts a fresh sequence.
///
pub trait SampleSource: Debug {
    /// Return source's name
    fn name(&self) -> String;
    /// Fetch the last known sample
    fn fetch_once(&self) -> Result<LocationSample, FetchError>;
    /// Poll forever, waiting `every` between two requests
    fn subscribe(&self, every: Duration) -> Samples<'_>
    where
        Self: Sized,
    {
        Samples::new(self, every)
    }
}

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
