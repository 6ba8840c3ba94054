//! Frame assembly: decoded frames in, normalized clip volume out
//!
//! [`FrameAssembler::assemble`] lists the frame directories of one sample,
//! picks temporal and spatial windows according to the [`UsageMode`], and
//! decodes, resizes and crops every frame into a [`VolumeBuilder`]. The builder
//! owns the buffer until it has been normalized, so a partially written volume
//! never escapes.

use crate::{
    config::{FrameSize, Modality, UsageMode, DEFAULT_CLIP_LEN, DEFAULT_CROP, DEFAULT_RESIZE},
    error::{ClipError, Result},
    sampling::{
        center_crop, center_window, random_crop, random_window, uniform_windows, wrap_index,
        SpatialWindow, TemporalWindow,
    },
    services::{resize_exact, FrameCodec, FrameIOService, ImageCodec},
    tracing_config::{events, spans},
    utils::{mean_subtract_rescale, normalize, NumericValidator, VolumeValidator},
    volume::ClipVolume,
};
use image::{imageops, GrayImage, ImageBuffer, Pixel, RgbImage};
use ndarray::{s, Array5, ArrayView2, ArrayView3};
use rand::Rng;
use std::path::{Path, PathBuf};

/// Everything needed to assemble one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRequest {
    /// One directory for rgb; horizontal then vertical directory for flow
    pub frame_dirs: Vec<PathBuf>,
    pub modality: Modality,
    /// Size every frame is resized to before cropping
    pub scale: FrameSize,
    pub crop: FrameSize,
    pub clip_len: usize,
    pub usage: UsageMode,
    /// Number of uniform clips in test usage, always 1 otherwise
    pub clips_per_video: usize,
    /// Apply flow mean subtraction before intensity normalization
    pub mean_subtract: bool,
}

impl AssemblyRequest {
    /// Request with default sizes, clip length and clip count for `usage`
    pub fn new(frame_dirs: Vec<PathBuf>, modality: Modality, usage: UsageMode) -> Self {
        Self {
            frame_dirs,
            modality,
            scale: DEFAULT_RESIZE,
            crop: DEFAULT_CROP,
            clip_len: DEFAULT_CLIP_LEN,
            usage,
            clips_per_video: usage.default_clips_per_video(),
            mean_subtract: true,
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: FrameSize) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_crop(mut self, crop: FrameSize) -> Self {
        self.crop = crop;
        self
    }

    #[must_use]
    pub fn with_clip_len(mut self, clip_len: usize) -> Self {
        self.clip_len = clip_len;
        self
    }

    #[must_use]
    pub fn with_clips_per_video(mut self, clips: usize) -> Self {
        self.clips_per_video = clips;
        self
    }

    #[must_use]
    pub fn with_mean_subtraction(mut self, enabled: bool) -> Self {
        self.mean_subtract = enabled;
        self
    }

    /// Number of clips the volume will hold
    pub fn clip_count(&self) -> usize {
        if self.usage.is_multi_clip() {
            self.clips_per_video
        } else {
            1
        }
    }

    /// Shape of the returned volume, independent of the video's frame count
    ///
    /// `(C, T, H, W)` for train and validation, `(N, C, T, H, W)` for test.
    pub fn output_shape(&self) -> Vec<usize> {
        let clip = [
            self.modality.channels(),
            self.clip_len,
            self.crop.height as usize,
            self.crop.width as usize,
        ];
        if self.usage.is_multi_clip() {
            std::iter::once(self.clips_per_video).chain(clip).collect()
        } else {
            clip.to_vec()
        }
    }

    pub fn validate(&self) -> Result<()> {
        VolumeValidator::validate_frame_dirs(self.modality, &self.frame_dirs)?;
        NumericValidator::validate_positive(self.clip_len, "clip length")?;
        NumericValidator::validate_positive(self.clips_per_video, "clips per video")?;

        if !self.usage.is_multi_clip() && self.clips_per_video != 1 {
            return Err(ClipError::config_value_error(
                &format!("clips per video for {} usage", self.usage),
                self.clips_per_video,
                "1",
            ));
        }

        if !self.crop.fits_within(self.scale) {
            return Err(ClipError::dimension_mismatch(format!(
                "crop {} is larger than scaled frame {}",
                self.crop, self.scale
            )));
        }

        Ok(())
    }
}

/// Owns the `(clips, depth, height, width, channels)` buffer while it is filled
///
/// Slots start at zero; a slot whose frame never gets written stays zero until
/// normalization.
#[derive(Debug)]
pub struct VolumeBuilder {
    buffer: Array5<f32>,
}

impl VolumeBuilder {
    pub fn new(clips: usize, clip_len: usize, crop: FrameSize, channels: usize) -> Self {
        Self {
            buffer: Array5::zeros((
                clips,
                clip_len,
                crop.height as usize,
                crop.width as usize,
                channels,
            )),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    fn check_slot(&self, clip: usize, t: usize, channel: usize) -> Result<()> {
        let (clips, depth, _, _, channels) = self.buffer.dim();
        if clip >= clips || t >= depth || channel >= channels {
            return Err(ClipError::processing(format!(
                "slot (clip {clip}, t {t}, channel {channel}) outside buffer {:?}",
                self.buffer.shape()
            )));
        }
        Ok(())
    }

    fn frame_dims(&self) -> (usize, usize) {
        let (_, _, height, width, _) = self.buffer.dim();
        (height, width)
    }

    /// Write a cropped RGB frame into every channel of a slot
    pub fn write_color(&mut self, clip: usize, t: usize, frame: &RgbImage) -> Result<()> {
        let channels = self.buffer.dim().4;
        self.check_slot(clip, t, channels.saturating_sub(1))?;
        if channels != 3 {
            return Err(ClipError::dimension_mismatch(format!(
                "color frame needs 3 channels, buffer has {channels}"
            )));
        }

        let (height, width) = self.frame_dims();
        check_frame_dims(frame.dimensions(), (height, width))?;
        let pixels = ArrayView3::from_shape((height, width, 3), frame.as_raw().as_slice())
            .map_err(|e| ClipError::processing(e.to_string()))?;
        self.buffer
            .slice_mut(s![clip, t, .., .., ..])
            .zip_mut_with(&pixels, |slot, &v| *slot = f32::from(v));
        Ok(())
    }

    /// Write a cropped grayscale flow frame into one channel of a slot
    pub fn write_flow(
        &mut self,
        clip: usize,
        t: usize,
        channel: usize,
        frame: &GrayImage,
    ) -> Result<()> {
        self.check_slot(clip, t, channel)?;

        let (height, width) = self.frame_dims();
        check_frame_dims(frame.dimensions(), (height, width))?;
        let pixels = ArrayView2::from_shape((height, width), frame.as_raw().as_slice())
            .map_err(|e| ClipError::processing(e.to_string()))?;
        self.buffer
            .slice_mut(s![clip, t, .., .., channel])
            .zip_mut_with(&pixels, |slot, &v| *slot = f32::from(v));
        Ok(())
    }

    /// Flow mean subtraction and per-plane rescale into `[0, 255]`
    #[must_use]
    pub fn subtract_flow_mean(mut self) -> Self {
        mean_subtract_rescale(&mut self.buffer);
        self
    }

    /// Normalize into `[-1, 1]` and hand out the volume in the usage layout
    pub fn finish(mut self, usage: UsageMode) -> Result<ClipVolume> {
        normalize(&mut self.buffer);
        let volume = ClipVolume::from_channel_last(self.buffer);
        if usage.is_multi_clip() {
            Ok(volume.to_clip_major())
        } else {
            volume.to_channel_first()
        }
    }
}

/// `actual` is image `(width, height)`, `expected` is buffer `(height, width)`
fn check_frame_dims(actual: (u32, u32), expected: (usize, usize)) -> Result<()> {
    if (actual.1 as usize, actual.0 as usize) != expected {
        return Err(ClipError::dimension_mismatch(format!(
            "frame of {}x{} does not fill a {}x{} slot",
            actual.1, actual.0, expected.0, expected.1
        )));
    }
    Ok(())
}

/// Resize to `scale`, then cut out `window`
fn scale_and_crop<P>(
    frame: &ImageBuffer<P, Vec<u8>>,
    scale: FrameSize,
    window: &SpatialWindow,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let scaled = resize_exact(frame, scale);
    imageops::crop_imm(
        &scaled,
        window.start_w,
        window.start_h,
        window.width(),
        window.height(),
    )
    .to_image()
}

/// Assembles clip volumes from frame directories
#[derive(Debug, Clone, Default)]
pub struct FrameAssembler<C: FrameCodec = ImageCodec> {
    codec: C,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: FrameCodec> FrameAssembler<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Assemble one normalized volume
    ///
    /// Train usage draws a random temporal window and a random crop,
    /// validation takes the centered ones, and test spreads
    /// `clips_per_video` windows uniformly over the video with a center crop.
    /// One spatial window is shared by every frame of every clip.
    ///
    /// # Errors
    /// - Invalid request (frame directory count, clip length, crop size)
    /// - Frame directory missing, empty, or flow directories of unequal length
    ///
    /// Frames that fail to decode are logged and leave their slot at zero.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        request: &AssemblyRequest,
        rng: &mut R,
    ) -> Result<ClipVolume> {
        request.validate()?;

        let first_dir = request.frame_dirs.first().map_or(Path::new(""), PathBuf::as_path);
        let span = spans::assembly(first_dir, &request.usage.to_string(), request.clip_count());
        let _guard = span.enter();

        let listings = request
            .frame_dirs
            .iter()
            .map(FrameIOService::list_frames)
            .collect::<Result<Vec<_>>>()?;
        let frame_count = VolumeValidator::validate_frame_counts(&request.frame_dirs, &listings)?;

        let windows = self.temporal_windows(request, frame_count, rng)?;
        let spatial = match request.usage {
            UsageMode::Train => random_crop(request.scale, request.crop, rng)?,
            UsageMode::Validation | UsageMode::Test => center_crop(request.scale, request.crop)?,
        };
        tracing::debug!(
            frame_count,
            windows = ?windows,
            crop = ?spatial,
            "selected sampling windows"
        );

        let mut builder = VolumeBuilder::new(
            windows.len(),
            request.clip_len,
            request.crop,
            request.modality.channels(),
        );
        let mut failures = 0;

        for (clip, window) in windows.iter().enumerate() {
            for (t, position) in window.positions().enumerate() {
                let index = wrap_index(position, frame_count);
                failures += self.fill_slot(
                    &mut builder,
                    request,
                    &listings,
                    index,
                    (clip, t),
                    &spatial,
                )?;
            }
        }

        if request.modality == Modality::Flow && request.mean_subtract {
            builder = builder.subtract_flow_mean();
        }

        let volume = builder.finish(request.usage)?;
        VolumeValidator::validate_shape(volume.shape(), &request.output_shape())?;
        events::sample_loaded(volume.shape(), failures);
        Ok(volume)
    }

    fn temporal_windows<R: Rng + ?Sized>(
        &self,
        request: &AssemblyRequest,
        frame_count: usize,
        rng: &mut R,
    ) -> Result<Vec<TemporalWindow>> {
        match request.usage {
            UsageMode::Train => Ok(vec![random_window(frame_count, request.clip_len, rng)?]),
            UsageMode::Validation => Ok(vec![center_window(frame_count, request.clip_len)?]),
            UsageMode::Test => {
                uniform_windows(frame_count, request.clip_len, request.clips_per_video)
            },
        }
    }

    /// Decode the frame(s) at `index` into one slot, returning the decode failure count
    fn fill_slot(
        &self,
        builder: &mut VolumeBuilder,
        request: &AssemblyRequest,
        listings: &[Vec<PathBuf>],
        index: usize,
        (clip, t): (usize, usize),
        spatial: &SpatialWindow,
    ) -> Result<usize> {
        let mut failures = 0;

        for (channel, listing) in listings.iter().enumerate() {
            let path = listing.get(index).ok_or(ClipError::IndexOutOfRange {
                index,
                len: listing.len(),
            })?;

            match request.modality {
                Modality::Rgb => match self.codec.decode_color(path) {
                    Ok(frame) => {
                        let frame = scale_and_crop(&frame, request.scale, spatial);
                        builder.write_color(clip, t, &frame)?;
                    },
                    Err(e) => {
                        events::decode_failure(path, &e);
                        failures += 1;
                    },
                },
                Modality::Flow => match self.codec.decode_gray(path) {
                    Ok(frame) => {
                        let frame = scale_and_crop(&frame, request.scale, spatial);
                        builder.write_flow(clip, t, channel, &frame)?;
                    },
                    Err(e) => {
                        events::decode_failure(path, &e);
                        failures += 1;
                    },
                },
            }
        }

        Ok(failures)
    }
}
