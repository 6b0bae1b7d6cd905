//! Everything between a render decision and the glass.
//!
//! - `Rasterizer` turns a background identifier and a few lines of text into a `Bitmap`,
//! - `Panel` is the driver contract of a bistable (e-paper) display with full and partial
//!   refresh modes.
//!
//! `Canvas` is the bundled rasterizer and `DumpPanel` a driver writing every refresh to disk,
//! physical panels implement `Panel` the same way.
//!

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

pub use bitmap::*;
pub use dump::*;
pub use error::*;
pub use raster::*;

mod bitmap;
mod dump;
mod error;
mod raster;

/// Fill byte for a white panel
pub const WHITE: u8 = 0xFF;

/// How the panel is refreshed.
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum RefreshMode {
    /// Redraw the whole panel, slow and flashing
    Full,
    /// Redraw only what changed
    Partial,
}

/// Driver contract for the panel.
///
/// The expected sequence is `init(mode)` then the matching `display_*()` call, and
/// `sleep()` + `shutdown()` once at the end.
///
pub trait Panel: Debug {
    /// Return driver's name
    fn name(&self) -> String;
    /// Wake up the controller and load the waveform for `mode`
    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError>;
    /// Fill the whole panel with `fill`
    fn clear(&mut self, fill: u8) -> Result<(), DisplayError>;
    /// Push a frame with a full refresh, it becomes the base for partial ones
    fn display_full(&mut self, buf: &Bitmap) -> Result<(), DisplayError>;
    /// Push a frame with a partial refresh
    fn display_partial(&mut self, buf: &Bitmap) -> Result<(), DisplayError>;
    /// Deep sleep
    fn sleep(&mut self) -> Result<(), DisplayError>;
    /// Release the hardware
    fn shutdown(&mut self) -> Result<(), DisplayError>;
}

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
