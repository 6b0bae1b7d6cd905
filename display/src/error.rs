use thiserror::Error;

use crate::RefreshMode;

/// Custom error type for the display path, all of them are fatal for the daemon.
///
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Can not load background {0}: {1}")]
    Background(String, image::ImageError),
    #[error("Bad buffer size {0}x{1}, panel is {2}x{3}")]
    BadSize(u32, u32, u32, u32),
    #[error("Panel not initialised")]
    NotInitialised,
    #[error("Panel initialised for {0} refresh, not {1}")]
    WrongMode(RefreshMode, RefreshMode),
}
