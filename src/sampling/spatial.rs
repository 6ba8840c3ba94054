//! Spatial crop window selection

use crate::config::FrameSize;
use crate::error::{ClipError, Result};
use rand::Rng;
use std::ops::Range;

/// Crop rectangle as half-open row and column intervals of the scaled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialWindow {
    pub start_h: u32,
    pub end_h: u32,
    pub start_w: u32,
    pub end_w: u32,
}

impl SpatialWindow {
    pub fn new(start_h: u32, start_w: u32, size: FrameSize) -> Self {
        Self {
            start_h,
            end_h: start_h + size.height,
            start_w,
            end_w: start_w + size.width,
        }
    }

    pub fn height(&self) -> u32 {
        self.end_h - self.start_h
    }

    pub fn width(&self) -> u32 {
        self.end_w - self.start_w
    }

    pub fn rows(&self) -> Range<u32> {
        self.start_h..self.end_h
    }

    pub fn cols(&self) -> Range<u32> {
        self.start_w..self.end_w
    }
}

fn check_fits(scaled: FrameSize, crop: FrameSize) -> Result<()> {
    if crop.fits_within(scaled) {
        Ok(())
    } else {
        Err(ClipError::dimension_mismatch(format!(
            "crop {} is larger than scaled frame {}",
            crop, scaled
        )))
    }
}

/// Random crop fully contained in the scaled frame
pub fn random_crop<R: Rng + ?Sized>(
    scaled: FrameSize,
    crop: FrameSize,
    rng: &mut R,
) -> Result<SpatialWindow> {
    check_fits(scaled, crop)?;

    let start_h = rng.gen_range(0..=scaled.height - crop.height);
    let start_w = rng.gen_range(0..=scaled.width - crop.width);
    Ok(SpatialWindow::new(start_h, start_w, crop))
}

/// Center crop of the scaled frame
pub fn center_crop(scaled: FrameSize, crop: FrameSize) -> Result<SpatialWindow> {
    check_fits(scaled, crop)?;

    Ok(SpatialWindow::new(
        (scaled.height - crop.height) / 2,
        (scaled.width - crop.width) / 2,
        crop,
    ))
}
