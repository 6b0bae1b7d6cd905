//! Driver writing every refresh as a PNG file instead of talking to a controller.
//!
//! Mostly useful for development and tests: it enforces the same call sequence a real panel
//! needs (`init()` with the right mode before any `display_*()` call) so bugs in the polling
//! loop show up without hardware.
//!

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::{Bitmap, DisplayError, Panel, RefreshMode};

#[derive(Debug)]
pub struct DumpPanel {
    /// Output directory
    dir: PathBuf,
    width: u32,
    height: u32,
    /// Current waveform, `None` when asleep
    mode: Option<RefreshMode>,
    /// Frame counter
    frame: usize,
}

impl DumpPanel {
    #[tracing::instrument]
    pub fn new(dir: &Path, width: u32, height: u32) -> Result<Self, DisplayError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            width,
            height,
            mode: None,
            frame: 0,
        })
    }

    /// Number of files written so far
    ///
    pub fn frames(&self) -> usize {
        self.frame
    }

    pub fn mode(&self) -> Option<RefreshMode> {
        self.mode
    }

    fn check(&self, expected: RefreshMode, buf: &Bitmap) -> Result<(), DisplayError> {
        match self.mode {
            None => return Err(DisplayError::NotInitialised),
            Some(mode) if mode != expected => {
                return Err(DisplayError::WrongMode(mode, expected));
            }
            _ => (),
        }
        if (buf.width(), buf.height()) != (self.width, self.height) {
            return Err(DisplayError::BadSize(
                buf.width(),
                buf.height(),
                self.width,
                self.height,
            ));
        }
        Ok(())
    }

    fn write(&mut self, what: &str, buf: &Bitmap) -> Result<(), DisplayError> {
        let fname = self.dir.join(format!("frame-{:04}-{what}.png", self.frame));
        trace!("writing {fname:?}");
        buf.to_luma().save(&fname)?;
        self.frame += 1;
        Ok(())
    }
}

impl Panel for DumpPanel {
    fn name(&self) -> String {
        String::from("dump")
    }

    #[tracing::instrument(skip(self))]
    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        debug!("init {mode}");
        self.mode = Some(mode);
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), DisplayError> {
        if self.mode.is_none() {
            return Err(DisplayError::NotInitialised);
        }
        let buf = Bitmap::filled(self.width, self.height, fill);
        self.write("clear", &buf)
    }

    fn display_full(&mut self, buf: &Bitmap) -> Result<(), DisplayError> {
        self.check(RefreshMode::Full, buf)?;
        self.write("full", buf)
    }

    fn display_partial(&mut self, buf: &Bitmap) -> Result<(), DisplayError> {
        self.check(RefreshMode::Partial, buf)?;
        self.write("partial", buf)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        debug!("sleep");
        self.mode = None;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        info!("{} frames written in {:?}", self.frame, self.dir);
        Ok(())
    }
}
