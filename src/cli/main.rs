//! Clip sampler CLI
//!
//! Opens a dataset from flags or a JSON configuration file, then either
//! inspects a single sample or sweeps the whole dataset to find samples that
//! fail to load.

use super::config::CliConfigBuilder;
use crate::{
    dataset::VideoDataset,
    services::FrameIOService,
    tracing_config::{init_cli_tracing, spans},
    volume::ClipVolume,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Video clip sampling and preprocessing tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "clip-sampler")]
pub struct Cli {
    /// Dataset root holding the extracted frame archives
    #[arg(value_name = "ROOT", required_unless_present = "config")]
    pub root: Option<PathBuf>,

    /// JSON dataset configuration; replaces all dataset flags
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the label-mapping lists
    #[arg(long, value_name = "DIR", default_value = "mapping")]
    pub mapping_dir: PathBuf,

    #[arg(short, long, value_enum, default_value_t = CliDataset::Ucf)]
    pub dataset: CliDataset,

    /// Split list to load (1-3)
    #[arg(short, long, default_value_t = 1)]
    pub split: u8,

    #[arg(short, long, value_enum, default_value_t = CliMode::Train)]
    pub mode: CliMode,

    #[arg(long, value_enum, default_value_t = CliModality::Rgb)]
    pub modality: CliModality,

    /// Frames per clip
    #[arg(long, default_value_t = 16)]
    pub clip_len: usize,

    #[arg(short, long, value_enum, default_value_t = CliLoadMode::Clip)]
    pub load_mode: CliLoadMode,

    /// Clips per video [default: 1 for clip loading, 10 for video loading]
    #[arg(long)]
    pub clips_per_video: Option<usize>,

    /// Only keep this many randomly drawn samples
    #[arg(long, value_name = "COUNT")]
    pub subset: Option<usize>,

    /// Skip temporal mean subtraction on flow volumes
    #[arg(long)]
    pub no_mean_subtraction: bool,

    /// Seed for temporal jittering, random crops and subset selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Load a single sample and print its statistics instead of sweeping
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Write the frames of the loaded sample as PNG files into this directory
    #[arg(long, value_name = "DIR", requires = "index")]
    pub dump_frames: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliDataset {
    Ucf,
    Hmdb,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliMode {
    Train,
    Test,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliModality {
    Rgb,
    Flow,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLoadMode {
    Clip,
    Video,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let dataset = VideoDataset::open(config, &mut rng).context("Failed to open dataset")?;
    info!(
        "Opened {} split {} ({} {}, {} usage): {} samples",
        dataset.config().dataset.display_name(),
        dataset.config().split,
        dataset.config().mode,
        dataset.config().modality,
        dataset.usage_mode(),
        dataset.len()
    );

    match cli.index {
        Some(index) => inspect_sample(&dataset, index, cli.dump_frames.as_deref(), &mut rng),
        None => sweep(&dataset, &mut rng),
    }
}

/// Load one sample and print its shape, value range and label
fn inspect_sample(
    dataset: &VideoDataset,
    index: usize,
    dump_dir: Option<&Path>,
    rng: &mut StdRng,
) -> Result<()> {
    let sample = dataset.sample(index)?;
    let frame_dir = sample
        .frame_dirs
        .first()
        .map(|d| d.display().to_string())
        .unwrap_or_default();

    let start = Instant::now();
    let (volume, label) = dataset
        .get(index, rng)
        .with_context(|| format!("Failed to load sample {index} from '{frame_dir}'"))?;

    let (min, max) = volume
        .data()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    println!("sample:  {index}");
    println!("frames:  {frame_dir}");
    println!("label:   {label}");
    println!("shape:   {:?} {}", volume.shape(), volume.layout());
    println!("range:   [{min:.4}, {max:.4}]");
    println!("time:    {:.1} ms", start.elapsed().as_secs_f64() * 1000.0);

    if let Some(dir) = dump_dir {
        let written = dump_frames(&volume, dir)?;
        println!("dumped:  {written} frames to {}", dir.display());
    }

    Ok(())
}

/// Write every frame of `volume` as `clipNN_frameNNN.png`
fn dump_frames(volume: &ClipVolume, dir: &Path) -> Result<usize> {
    let mut written = 0;
    for (clip, frames) in volume.frame_images().iter().enumerate() {
        for (t, frame) in frames.iter().enumerate() {
            let path = dir.join(format!("clip{clip:02}_frame{t:03}.png"));
            FrameIOService::save_frame(frame, &path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            written += 1;
        }
    }
    Ok(written)
}

/// Load every sample in order, stopping at the first failure
fn sweep(dataset: &VideoDataset, rng: &mut StdRng) -> Result<()> {
    let span = spans::dataset_sweep(dataset.config().dataset.key(), dataset.len());
    let _guard = span.enter();

    let pb = ProgressBar::new(dataset.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    for (index, sample) in dataset.samples().iter().enumerate() {
        if let Err(e) = dataset.get(index, rng) {
            pb.abandon();
            let frame_dir = sample
                .frame_dirs
                .first()
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            error!(index, frame_dir = %frame_dir, label = sample.label, error = %e, "sample failed");
            anyhow::bail!(
                "Sample {index} ('{frame_dir}', label {}) failed to load: {e}",
                sample.label
            );
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    info!(
        "Loaded {} samples in {:.2}s",
        dataset.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
