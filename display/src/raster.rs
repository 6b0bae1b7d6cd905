//! Compose a frame: background bitmap plus a few lines of text.
//!
//! Backgrounds are BMP files in the assets directory, one per `Background`, already at the
//! panel resolution.  Text uses a fixed 10x20 monospace font, anchored at its top-left corner.
//! The font is the ISO 8859-2 one so that Croatian place names (Č, Ć, Đ, Š, Ž) are drawn.
//! The panel is mounted upside down so the final image is rotated by 180° when asked to.
//!

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::iso_8859_2::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::{imageops, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Bitmap, DisplayError};

/// Black text, transparent background
const TEXT_STYLE: MonoTextStyle<'static, BinaryColor> =
    MonoTextStyle::new(&FONT_10X20, BinaryColor::On);

/// Background image identifier.
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Background {
    /// At home
    Home,
    /// At work or any other named place
    Work,
    /// Somewhere else
    Away,
}

impl Background {
    /// File holding the image in the assets directory
    ///
    pub fn file_name(&self) -> String {
        format!("{self}.bmp")
    }
}

/// One line of text and where to put it.
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

impl TextLine {
    pub fn new(text: &str, x: i32, y: i32) -> Self {
        Self {
            text: text.to_owned(),
            x,
            y,
        }
    }
}

/// Rasterizer contract: the lines are drawn in order over the background.
///
pub trait Rasterizer: std::fmt::Debug {
    fn rasterize(&mut self, background: Background, lines: &[TextLine])
        -> Result<Bitmap, DisplayError>;
}

/// `DrawTarget` over a grayscale image, ink is black.
///
struct Surface<'a>(&'a mut GrayImage);

impl OriginDimensions for Surface<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Surface<'_> {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.0.dimensions();
        for Pixel(p, color) in pixels {
            // Clip
            if p.x < 0 || p.y < 0 || p.x as u32 >= w || p.y as u32 >= h {
                continue;
            }
            let v = if color.is_on() { 0 } else { 255 };
            self.0.put_pixel(p.x as u32, p.y as u32, Luma([v]));
        }
        Ok(())
    }
}

/// The bundled rasterizer.
///
#[derive(Debug)]
pub struct Canvas {
    /// Where the `.bmp` files are
    assets: PathBuf,
    width: u32,
    height: u32,
    /// Rotate by 180° before handing the frame over
    rotate: bool,
    /// Decoded backgrounds
    cache: HashMap<Background, GrayImage>,
}

impl Canvas {
    pub fn new(assets: &Path, width: u32, height: u32, rotate: bool) -> Self {
        Self {
            assets: assets.to_path_buf(),
            width,
            height,
            rotate,
            cache: HashMap::new(),
        }
    }

    /// Load (once) the background image.
    ///
    #[tracing::instrument(skip(self))]
    fn background(&mut self, background: Background) -> Result<GrayImage, DisplayError> {
        if let Some(img) = self.cache.get(&background) {
            return Ok(img.clone());
        }

        let fname = self.assets.join(background.file_name());
        trace!("loading {fname:?}");
        let img = image::open(&fname)
            .map_err(|e| DisplayError::Background(fname.display().to_string(), e))?
            .to_luma8();

        let (w, h) = img.dimensions();
        if (w, h) != (self.width, self.height) {
            return Err(DisplayError::BadSize(w, h, self.width, self.height));
        }
        self.cache.insert(background, img.clone());
        Ok(img)
    }
}

impl Rasterizer for Canvas {
    #[tracing::instrument(skip(self))]
    fn rasterize(
        &mut self,
        background: Background,
        lines: &[TextLine],
    ) -> Result<Bitmap, DisplayError> {
        let mut img = self.background(background)?;

        let mut surface = Surface(&mut img);
        for line in lines {
            debug!("draw {:?} at ({}, {})", line.text, line.x, line.y);
            Text::with_baseline(
                &line.text,
                Point::new(line.x, line.y),
                TEXT_STYLE,
                Baseline::Top,
            )
            .draw(&mut surface)?;
        }

        let img = if self.rotate {
            imageops::rotate180(&img)
        } else {
            img
        };
        Ok(Bitmap::from_luma(&img))
    }
}
