//! Configuration types for dataset loading and clip sampling

use crate::{
    error::{ClipError, Result},
    utils::NumericValidator,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Spatial size every frame is resized to before cropping (R(2+1)D setting)
pub const DEFAULT_RESIZE: FrameSize = FrameSize::new(128, 171);

/// Spatial size of the crop taken from each resized frame
pub const DEFAULT_CROP: FrameSize = FrameSize::new(112, 112);

/// Default temporal depth of a clip
pub const DEFAULT_CLIP_LEN: usize = 16;

/// Clips extracted per video for uniform multi-clip evaluation
pub const TEST_CLIPS_PER_VIDEO: usize = 10;

/// Known video datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    #[serde(rename = "ucf")]
    Ucf101,
    #[serde(rename = "hmdb")]
    Hmdb51,
}

impl Dataset {
    /// Short key used in mapping file names (`ucf_trainlist01.txt`)
    pub fn key(self) -> &'static str {
        match self {
            Self::Ucf101 => "ucf",
            Self::Hmdb51 => "hmdb",
        }
    }

    /// Directory name holding this dataset's mapping files
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ucf101 => "UCF-101",
            Self::Hmdb51 => "HMDB-51",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dataset {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ucf" | "ucf101" | "ucf-101" => Ok(Self::Ucf101),
            "hmdb" | "hmdb51" | "hmdb-51" => Ok(Self::Hmdb51),
            other => Err(ClipError::config_value_error("dataset", other, "ucf, hmdb")),
        }
    }
}

/// Train/test split number of the official split lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Split(u8);

impl Split {
    /// Create a split, accepting only 1, 2 or 3
    pub fn new(split: u8) -> Result<Self> {
        NumericValidator::validate_range(split, 1, 3, "split").map(Self)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Split {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for Split {
    type Error = ClipError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Split> for u8 {
    fn from(split: Split) -> Self {
        split.0
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which split list the provider reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Train,
    Test,
}

impl Mode {
    pub fn key(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            other => Err(ClipError::config_value_error("mode", other, "train, test")),
        }
    }
}

/// Input signal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Color frames, three channels
    #[default]
    Rgb,
    /// Optical flow stored as separate horizontal (`u`) and vertical (`v`) grayscale frames
    Flow,
}

impl Modality {
    /// Channel count of an assembled volume
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Flow => 2,
        }
    }

    /// Number of frame directories one sample is made of
    pub fn frame_dirs(self) -> usize {
        match self {
            Self::Rgb => 1,
            Self::Flow => 2,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgb => write!(f, "rgb"),
            Self::Flow => write!(f, "flow"),
        }
    }
}

impl FromStr for Modality {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "flow" => Ok(Self::Flow),
            other => Err(ClipError::config_value_error("modality", other, "rgb, flow")),
        }
    }
}

/// Whether a sample yields one clip or a series of clips covering the whole video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Clip,
    Video,
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clip => write!(f, "clip"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl FromStr for LoadMode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "clip" => Ok(Self::Clip),
            "video" => Ok(Self::Video),
            other => Err(ClipError::config_value_error("load mode", other, "clip, video")),
        }
    }
}

/// Sampling policy applied by the frame assembler
///
/// - `Train`: random temporal window, random crop, one clip
/// - `Validation`: center temporal window, center crop, one clip
/// - `Test`: uniform multi-clip windows, center crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageMode {
    Train,
    Validation,
    Test,
}

impl UsageMode {
    /// Clip count used when the caller does not override it
    pub fn default_clips_per_video(self) -> usize {
        match self {
            Self::Train | Self::Validation => 1,
            Self::Test => TEST_CLIPS_PER_VIDEO,
        }
    }

    /// Whether the returned volume keeps its clip axis
    pub fn is_multi_clip(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl std::fmt::Display for UsageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Validation => write!(f, "validation"),
            Self::Test => write!(f, "test"),
        }
    }
}

impl FromStr for UsageMode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "validation" | "val" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(ClipError::config_value_error(
                "usage mode",
                other,
                "train, validation, test",
            )),
        }
    }
}

/// Height/width pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub height: u32,
    pub width: u32,
}

impl FrameSize {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Whether a window of `self` fits inside `outer`
    pub fn fits_within(self, outer: FrameSize) -> bool {
        self.height <= outer.height && self.width <= outer.width
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Configuration for a video sample provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset root holding the extracted frame archives
    pub root: PathBuf,

    /// Directory holding `<UCF-101|HMDB-51>/<list>.txt` mapping files
    #[serde(default = "default_mapping_dir")]
    pub mapping_dir: PathBuf,

    pub dataset: Dataset,

    #[serde(default)]
    pub split: Split,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub modality: Modality,

    /// Temporal depth of each clip
    #[serde(default = "default_clip_len")]
    pub clip_len: usize,

    #[serde(default)]
    pub load_mode: LoadMode,

    /// Must be 1 in clip load mode and greater than 1 in video load mode
    #[serde(default = "default_clips_per_video")]
    pub clips_per_video: usize,

    /// Keep only this many randomly drawn samples (with replacement)
    #[serde(default)]
    pub subset: Option<usize>,

    #[serde(default = "default_resize")]
    pub resize: FrameSize,

    #[serde(default = "default_crop")]
    pub crop: FrameSize,

    /// Apply temporal mean subtraction to flow volumes
    #[serde(default = "default_true")]
    pub flow_mean_subtraction: bool,
}

fn default_mapping_dir() -> PathBuf {
    PathBuf::from("mapping")
}

fn default_clip_len() -> usize {
    DEFAULT_CLIP_LEN
}

fn default_clips_per_video() -> usize {
    1
}

fn default_resize() -> FrameSize {
    DEFAULT_RESIZE
}

fn default_crop() -> FrameSize {
    DEFAULT_CROP
}

fn default_true() -> bool {
    true
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            mapping_dir: default_mapping_dir(),
            dataset: Dataset::Ucf101,
            split: Split::default(),
            mode: Mode::default(),
            modality: Modality::default(),
            clip_len: DEFAULT_CLIP_LEN,
            load_mode: LoadMode::default(),
            clips_per_video: 1,
            subset: None,
            resize: DEFAULT_RESIZE,
            crop: DEFAULT_CROP,
            flow_mean_subtraction: true,
        }
    }
}

impl DatasetConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use clip_sampler::config::{DatasetConfig, Dataset, LoadMode, Mode};
    ///
    /// let config = DatasetConfig::builder()
    ///     .root("/data/UCF-101")
    ///     .dataset(Dataset::Ucf101)
    ///     .mode(Mode::Test)
    ///     .load_mode(LoadMode::Video)
    ///     .clips_per_video(10)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.clips_per_video, 10);
    /// ```
    #[must_use]
    pub fn builder() -> DatasetConfigBuilder {
        DatasetConfigBuilder::default()
    }

    /// Load and validate a configuration stored as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClipError::file_io_error("read config file", path, &e))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ClipError::invalid_config(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the loading policy combination
    ///
    /// # Validation Rules
    ///
    /// - train mode only loads single clips
    /// - clip loading means exactly one clip per video, video loading more than one
    /// - the crop must fit inside the resized frame
    pub fn validate(&self) -> Result<()> {
        if self.mode == Mode::Train && self.load_mode != LoadMode::Clip {
            return Err(ClipError::invalid_config(
                "train mode requires clip load mode",
            ));
        }

        match self.load_mode {
            LoadMode::Clip if self.clips_per_video != 1 => {
                return Err(ClipError::config_value_error(
                    "clips per video for clip load mode",
                    self.clips_per_video,
                    "1",
                ));
            },
            LoadMode::Video if self.clips_per_video <= 1 => {
                return Err(ClipError::config_value_error(
                    "clips per video for video load mode",
                    self.clips_per_video,
                    "> 1",
                ));
            },
            _ => {},
        }

        NumericValidator::validate_positive(self.clip_len, "clip length")?;

        if self.crop.height == 0 || self.crop.width == 0 {
            return Err(ClipError::config_value_error("crop size", self.crop, "non-zero"));
        }

        if !self.crop.fits_within(self.resize) {
            return Err(ClipError::dimension_mismatch(format!(
                "crop {} does not fit inside resized frame {}",
                self.crop, self.resize
            )));
        }

        if let Some(count) = self.subset {
            NumericValidator::validate_positive(count, "subset size")?;
        }

        Ok(())
    }

    /// Assembler policy implied by mode and load mode
    pub fn usage_mode(&self) -> UsageMode {
        match (self.mode, self.load_mode) {
            (Mode::Train, _) => UsageMode::Train,
            (Mode::Test, LoadMode::Clip) => UsageMode::Validation,
            (Mode::Test, LoadMode::Video) => UsageMode::Test,
        }
    }
}

/// Builder for `DatasetConfig`
#[derive(Debug, Default)]
pub struct DatasetConfigBuilder {
    config: DatasetConfig,
}

impl DatasetConfigBuilder {
    #[must_use]
    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.root = root.into();
        self
    }

    #[must_use]
    pub fn mapping_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.mapping_dir = dir.into();
        self
    }

    #[must_use]
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.config.dataset = dataset;
        self
    }

    #[must_use]
    pub fn split(mut self, split: Split) -> Self {
        self.config.split = split;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn modality(mut self, modality: Modality) -> Self {
        self.config.modality = modality;
        self
    }

    #[must_use]
    pub fn clip_len(mut self, clip_len: usize) -> Self {
        self.config.clip_len = clip_len;
        self
    }

    #[must_use]
    pub fn load_mode(mut self, load_mode: LoadMode) -> Self {
        self.config.load_mode = load_mode;
        self
    }

    #[must_use]
    pub fn clips_per_video(mut self, clips: usize) -> Self {
        self.config.clips_per_video = clips;
        self
    }

    /// Enable the reduced-subset mode used for quick correctness checks
    #[must_use]
    pub fn subset(mut self, count: Option<usize>) -> Self {
        self.config.subset = count;
        self
    }

    #[must_use]
    pub fn resize(mut self, size: FrameSize) -> Self {
        self.config.resize = size;
        self
    }

    #[must_use]
    pub fn crop(mut self, size: FrameSize) -> Self {
        self.config.crop = size;
        self
    }

    #[must_use]
    pub fn flow_mean_subtraction(mut self, enabled: bool) -> Self {
        self.config.flow_mean_subtraction = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<DatasetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
