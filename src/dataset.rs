//! Dataset-facing sample provider
//!
//! [`VideoDataset`] resolves sample indices to frame directories and labels,
//! and hands each lookup to a [`FrameAssembler`] configured from the
//! [`DatasetConfig`]. Construction validates the configuration eagerly; after
//! that the dataset is read-only and `get` can be called from several threads,
//! each with its own random generator.

use crate::{
    assembler::{AssemblyRequest, FrameAssembler},
    config::{DatasetConfig, UsageMode},
    error::{ClipError, Result},
    mapping::{frame_roots, mapping_file_path, parse_mapping},
    services::{FrameCodec, FrameIOService, ImageCodec},
    tracing_config::spans,
    utils::VolumeValidator,
    volume::ClipVolume,
};
use rand::{seq::SliceRandom, Rng};
use std::path::PathBuf;

/// Frame directories and label of one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// One directory for rgb; horizontal then vertical directory for flow
    pub frame_dirs: Vec<PathBuf>,
    pub label: u32,
}

/// Indexed collection of samples backed by frame directories on disk
#[derive(Debug, Clone)]
pub struct VideoDataset<C: FrameCodec = ImageCodec> {
    config: DatasetConfig,
    samples: Vec<Sample>,
    assembler: FrameAssembler<C>,
}

impl VideoDataset {
    /// Open the dataset described by `config`
    ///
    /// Reads `<mapping_dir>/<dataset>/<key>_<mode>list0<split>.txt` and resolves
    /// every entry against the frame roots under `config.root`. `rng` is only
    /// used when `config.subset` is set.
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Missing or malformed mapping file
    pub fn open<R: Rng + ?Sized>(config: DatasetConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let path = mapping_file_path(&config.mapping_dir, config.dataset, config.mode, config.split);
        let content = FrameIOService::read_mapping(&path)?;
        Self::from_mapping_str(config, &content, rng)
    }

    /// Build the dataset from mapping file contents already in memory
    pub fn from_mapping_str<R: Rng + ?Sized>(
        config: DatasetConfig,
        content: &str,
        rng: &mut R,
    ) -> Result<Self> {
        let roots = frame_roots(&config.root, config.dataset, config.modality);
        let samples = parse_mapping(content)?
            .into_iter()
            .map(|entry| Sample {
                frame_dirs: entry.frame_dirs(&roots),
                label: entry.label,
            })
            .collect();
        Self::from_samples(config, samples, ImageCodec, rng)
    }
}

impl<C: FrameCodec> VideoDataset<C> {
    /// Build the dataset from explicit samples and a frame codec
    ///
    /// When `config.subset` is set, that many samples are drawn from `samples`
    /// uniformly with replacement.
    pub fn from_samples<R: Rng + ?Sized>(
        config: DatasetConfig,
        samples: Vec<Sample>,
        codec: C,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        for sample in &samples {
            VolumeValidator::validate_frame_dirs(config.modality, &sample.frame_dirs)?;
        }

        let total = samples.len();
        let samples = match config.subset {
            Some(count) => select_subset(&samples, count, rng)?,
            None => samples,
        };

        tracing::debug!(
            dataset = %config.dataset,
            split = %config.split,
            mode = %config.mode,
            modality = %config.modality,
            usage = %config.usage_mode(),
            mapped = total,
            samples = samples.len(),
            "video dataset ready"
        );

        Ok(Self {
            config,
            samples,
            assembler: FrameAssembler::with_codec(codec),
        })
    }

    /// Swap the frame codec, keeping configuration and samples
    pub fn with_codec<D: FrameCodec>(self, codec: D) -> VideoDataset<D> {
        VideoDataset {
            config: self.config,
            samples: self.samples,
            assembler: FrameAssembler::with_codec(codec),
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn usage_mode(&self) -> UsageMode {
        self.config.usage_mode()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Result<&Sample> {
        self.samples.get(index).ok_or(ClipError::IndexOutOfRange {
            index,
            len: self.samples.len(),
        })
    }

    /// Assembly request for one sample under this dataset's configuration
    pub fn request(&self, sample: &Sample) -> AssemblyRequest {
        AssemblyRequest::new(sample.frame_dirs.clone(), self.config.modality, self.usage_mode())
            .with_scale(self.config.resize)
            .with_crop(self.config.crop)
            .with_clip_len(self.config.clip_len)
            .with_clips_per_video(self.config.clips_per_video)
            .with_mean_subtraction(self.config.flow_mean_subtraction)
    }

    /// Load the volume and label at `index`
    ///
    /// # Errors
    /// - `IndexOutOfRange` for `index >= len()`
    /// - Any assembly error for the sample's frame directories
    pub fn get<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Result<(ClipVolume, u32)> {
        let sample = self.sample(index)?;
        let span = spans::sample_loading(index, sample.label);
        let _guard = span.enter();

        let volume = self.assembler.assemble(&self.request(sample), rng)?;
        Ok((volume, sample.label))
    }
}

/// Draw `count` samples uniformly with replacement
fn select_subset<R: Rng + ?Sized>(
    samples: &[Sample],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Sample>> {
    let mut subset = Vec::with_capacity(count);
    for _ in 0..count {
        let sample = samples.choose(rng).ok_or_else(|| {
            ClipError::invalid_config("cannot draw a subset from an empty mapping")
        })?;
        subset.push(sample.clone());
    }
    Ok(subset)
}
