//! Frame decoding abstraction
//!
//! The assembler only needs three capabilities from an image codec: decode a
//! color frame as RGB, decode a flow frame as single-channel grayscale, and
//! resize to an exact size. Decoding sits behind [`FrameCodec`] so callers can
//! plug in another decoder; resizing always goes through `image::imageops`.

use crate::{config::FrameSize, error::Result};
use image::{imageops, GrayImage, ImageBuffer, Pixel, RgbImage};
use std::path::Path;

/// Trait for frame decoders
pub trait FrameCodec: Send + Sync {
    /// Decode a color frame into RGB channel order
    ///
    /// # Errors
    /// - Missing or unreadable file
    /// - Corrupt or unsupported image data
    fn decode_color(&self, path: &Path) -> Result<RgbImage>;

    /// Decode a flow frame as single-channel grayscale
    ///
    /// # Errors
    /// - Missing or unreadable file
    /// - Corrupt or unsupported image data
    fn decode_gray(&self, path: &Path) -> Result<GrayImage>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl FrameCodec for ImageCodec {
    fn decode_color(&self, path: &Path) -> Result<RgbImage> {
        Ok(image::open(path)?.to_rgb8())
    }

    fn decode_gray(&self, path: &Path) -> Result<GrayImage> {
        Ok(image::open(path)?.to_luma8())
    }
}

/// Resize a frame to exactly `size`, ignoring aspect ratio
///
/// Uses bilinear filtering, matching the usual default of video frame
/// preprocessing pipelines.
pub fn resize_exact<P>(frame: &ImageBuffer<P, Vec<u8>>, size: FrameSize) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    if frame.dimensions() == (size.width, size.height) {
        return frame.clone();
    }
    imageops::resize(frame, size.width, size.height, imageops::FilterType::Triangle)
}
