#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Clip Sampler
//!
//! Video clip sampling and preprocessing for action-recognition training on
//! frame-extracted datasets (UCF-101, HMDB-51).
//!
//! Each video is a directory of per-frame JPEG images, or a pair of
//! directories holding the horizontal and vertical optical-flow components.
//! The library picks temporal windows (random, centered or uniformly spread
//! multi-clip) and a spatial crop, decodes and resizes the frames, and
//! assembles them into fixed-shape `f32` volumes normalized to `[-1, 1]`.
//!
//! ## Features
//!
//! - **Temporal sampling**: random jitter for training, center window for
//!   validation, uniform multi-clip windows for evaluation, with looping for
//!   videos shorter than a clip
//! - **Spatial sampling**: random and center crops of the resized frame
//! - **Flow support**: two-direction flow frames with optional temporal mean
//!   subtraction
//! - **Typed layouts**: volumes carry their axis order as a [`Layout`]
//! - **Explicit randomness**: every random draw uses a caller-supplied
//!   generator, so loads are reproducible and safe across threads
//! - **CLI Integration**: dataset inspection and sweep tool (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clip_sampler::{DatasetConfig, Dataset, Mode, VideoDataset};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn example() -> clip_sampler::Result<()> {
//! let config = DatasetConfig::builder()
//!     .root("/data/UCF-101")
//!     .dataset(Dataset::Ucf101)
//!     .mode(Mode::Train)
//!     .build()?;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let dataset = VideoDataset::open(config, &mut rng)?;
//! let (volume, label) = dataset.get(0, &mut rng)?;
//! assert_eq!(volume.shape(), &[3, 16, 112, 112]);
//! # let _ = label;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bars and subscriber setup
//! - `tracing-json`: JSON log output for the CLI
//!
//! To use only as a library without CLI dependencies:
//!
//! ```toml
//! [dependencies]
//! clip-sampler = { version = "0.1", default-features = false }
//! ```

pub mod assembler;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod mapping;
pub mod sampling;
pub mod services;
pub mod tracing_config;
pub mod utils;
pub mod volume;

pub use assembler::{AssemblyRequest, FrameAssembler, VolumeBuilder};
pub use config::{
    Dataset, DatasetConfig, DatasetConfigBuilder, FrameSize, LoadMode, Modality, Mode, Split,
    UsageMode,
};
pub use dataset::{Sample, VideoDataset};
pub use error::{ClipError, Result};
pub use mapping::{frame_roots, mapping_file_path, parse_mapping, MappingEntry};
pub use sampling::{
    center_crop, center_window, random_crop, random_window, uniform_windows, SpatialWindow,
    TemporalWindow,
};
pub use services::{FrameCodec, FrameIOService, ImageCodec};
pub use utils::{denormalize, mean_subtract_rescale, normalize};
pub use volume::{ClipVolume, Layout};

pub use tracing_config::{events, spans, TracingConfig, TracingFormat};
#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;

/// Assemble one volume with the default `image`-backed codec
///
/// Shorthand for `FrameAssembler::new().assemble(request, rng)` when frames
/// are loaded outside a [`VideoDataset`].
///
/// ```rust,no_run
/// use clip_sampler::{assemble, AssemblyRequest, Modality, UsageMode};
/// use rand::thread_rng;
///
/// # fn example() -> clip_sampler::Result<()> {
/// let request = AssemblyRequest::new(
///     vec!["frames/v_Run_g01_c01".into()],
///     Modality::Rgb,
///     UsageMode::Validation,
/// );
/// let volume = assemble(&request, &mut thread_rng())?;
/// assert_eq!(volume.shape(), &[3, 16, 112, 112]);
/// # Ok(())
/// # }
/// ```
pub fn assemble<R: rand::Rng + ?Sized>(
    request: &AssemblyRequest,
    rng: &mut R,
) -> Result<ClipVolume> {
    FrameAssembler::new().assemble(request, rng)
}
