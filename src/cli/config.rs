//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliDataset, CliLoadMode, CliModality, CliMode};
use crate::config::{
    Dataset, DatasetConfig, LoadMode, Modality, Mode, Split, TEST_CLIPS_PER_VIDEO,
};
use anyhow::{Context, Result};

impl From<CliDataset> for Dataset {
    fn from(value: CliDataset) -> Self {
        match value {
            CliDataset::Ucf => Self::Ucf101,
            CliDataset::Hmdb => Self::Hmdb51,
        }
    }
}

impl From<CliMode> for Mode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Train => Self::Train,
            CliMode::Test => Self::Test,
        }
    }
}

impl From<CliModality> for Modality {
    fn from(value: CliModality) -> Self {
        match value {
            CliModality::Rgb => Self::Rgb,
            CliModality::Flow => Self::Flow,
        }
    }
}

impl From<CliLoadMode> for LoadMode {
    fn from(value: CliLoadMode) -> Self {
        match value {
            CliLoadMode::Clip => Self::Clip,
            CliLoadMode::Video => Self::Video,
        }
    }
}

/// Convert CLI arguments to a validated `DatasetConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the dataset configuration, preferring `--config` over flags
    pub(crate) fn from_cli(cli: &Cli) -> Result<DatasetConfig> {
        if let Some(path) = &cli.config {
            tracing::debug!(path = %path.display(), "loading dataset configuration file");
            return DatasetConfig::from_json_file(path)
                .with_context(|| format!("Invalid configuration file '{}'", path.display()));
        }

        let root = cli
            .root
            .clone()
            .context("A dataset root is required when --config is not given")?;

        let load_mode = LoadMode::from(cli.load_mode);
        let clips_per_video = cli.clips_per_video.unwrap_or(match load_mode {
            LoadMode::Clip => 1,
            LoadMode::Video => TEST_CLIPS_PER_VIDEO,
        });

        let config = DatasetConfig::builder()
            .root(root)
            .mapping_dir(cli.mapping_dir.clone())
            .dataset(cli.dataset.into())
            .split(Split::new(cli.split).context("Invalid split")?)
            .mode(cli.mode.into())
            .modality(cli.modality.into())
            .clip_len(cli.clip_len)
            .load_mode(load_mode)
            .clips_per_video(clips_per_video)
            .subset(cli.subset)
            .flow_mean_subtraction(!cli.no_mean_subtraction)
            .build()
            .context("Invalid configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_to_config() {
        let cli = Cli::parse_from([
            "clip-sampler",
            "/data/UCF-101",
            "--mode",
            "test",
            "--load-mode",
            "video",
            "--modality",
            "flow",
            "--split",
            "2",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.mode, Mode::Test);
        assert_eq!(config.load_mode, LoadMode::Video);
        assert_eq!(config.modality, Modality::Flow);
        assert_eq!(config.clips_per_video, TEST_CLIPS_PER_VIDEO);
        assert_eq!(config.split.get(), 2);
        assert!(config.flow_mean_subtraction);
    }

    #[test]
    fn test_invalid_combination_rejected() {
        let cli = Cli::parse_from(["clip-sampler", "/data", "--load-mode", "video"]);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());

        let cli = Cli::parse_from(["clip-sampler", "/data", "--split", "4"]);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_config_file_takes_precedence() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"root": "/srv/hmdb", "dataset": "hmdb", "mode": "test", "split": 3}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "clip-sampler".to_string(),
            "--config".to_string(),
            path.display().to_string(),
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.dataset, Dataset::Hmdb51);
        assert_eq!(config.split.get(), 3);
        assert_eq!(config.root, std::path::PathBuf::from("/srv/hmdb"));
    }
}
