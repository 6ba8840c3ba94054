//! Synthetic frame datasets for integration tests

#![allow(dead_code)]

use clip_sampler::{
    config::{DatasetConfigBuilder, Mode, Split},
    frame_roots, mapping_file_path,
    mapping::strip_extension,
    Dataset, DatasetConfig, Modality,
};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Frame side used by the end-to-end scenarios
pub const FRAME_SIDE: u32 = 256;

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame{:06}.jpg", index + 1))
}

/// Write `count` grayscale-content JPEG frames with a moving diagonal gradient
pub fn write_gradient_frames(dir: &Path, count: usize, side: u32) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        let frame = RgbImage::from_fn(side, side, |x, y| {
            let v = ((x + y + i as u32 * 7) % 256) as u8;
            Rgb([v, v, v])
        });
        frame.save(frame_path(dir, i)).unwrap();
    }
}

/// Write `count` solid JPEG frames of intensity `value`
pub fn write_solid_frames(dir: &Path, count: usize, side: u32, value: u8) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        RgbImage::from_pixel(side, side, Rgb([value, value, value]))
            .save(frame_path(dir, i))
            .unwrap();
    }
}

/// Write `count` single-channel flow frames whose intensity drifts over time
pub fn write_flow_frames(dir: &Path, count: usize, side: u32) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        let frame = GrayImage::from_fn(side, side, |x, _| {
            Luma([((x / 4 + i as u32 * 11) % 256) as u8])
        });
        frame.save(frame_path(dir, i)).unwrap();
    }
}

/// Replace one frame with bytes no decoder accepts
pub fn corrupt_frame(dir: &Path, index: usize) {
    fs::write(frame_path(dir, index), b"definitely not a jpeg").unwrap();
}

/// Dataset root plus mapping directory inside a temporary directory
pub struct DatasetFixture {
    pub temp: TempDir,
    pub root: PathBuf,
    pub mapping_dir: PathBuf,
}

impl DatasetFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("dataset");
        let mapping_dir = temp.path().join("mapping");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&mapping_dir).unwrap();
        Self {
            temp,
            root,
            mapping_dir,
        }
    }

    /// Frame directories a mapping token resolves to
    pub fn video_dirs(&self, dataset: Dataset, modality: Modality, token: &str) -> Vec<PathBuf> {
        frame_roots(&self.root, dataset, modality)
            .into_iter()
            .map(|root| root.join(strip_extension(token)))
            .collect()
    }

    /// Create frames for `token` in every frame root of the modality
    pub fn add_video(
        &self,
        dataset: Dataset,
        modality: Modality,
        token: &str,
        frames: usize,
        side: u32,
    ) -> Vec<PathBuf> {
        let dirs = self.video_dirs(dataset, modality, token);
        for dir in &dirs {
            match modality {
                Modality::Rgb => write_gradient_frames(dir, frames, side),
                Modality::Flow => write_flow_frames(dir, frames, side),
            }
        }
        dirs
    }

    /// Write a mapping list where `open` will look for it
    pub fn write_mapping(&self, dataset: Dataset, mode: Mode, split: u8, lines: &[&str]) -> PathBuf {
        let split = Split::new(split).unwrap();
        let path = mapping_file_path(&self.mapping_dir, dataset, mode, split);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        path
    }

    /// Builder with root and mapping directory pointing into the fixture
    pub fn config(&self) -> DatasetConfigBuilder {
        DatasetConfig::builder()
            .root(&self.root)
            .mapping_dir(&self.mapping_dir)
    }
}

/// Smallest and largest value of a volume
pub fn value_range(values: impl IntoIterator<Item = f32>) -> (f32, f32) {
    values
        .into_iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
