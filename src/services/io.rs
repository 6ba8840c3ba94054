//! Filesystem I/O for frame directories and mapping files
//!
//! Keeps directory listing and text loading apart from the sampling logic so
//! the assembler can be exercised against synthetic directories.

use crate::error::{ClipError, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// File extension of extracted frames
pub const FRAME_EXTENSION: &str = "jpg";

/// Service for listing frames and reading mapping files
pub struct FrameIOService;

impl FrameIOService {
    /// List the `*.jpg` frames of a directory in lexicographic order
    ///
    /// An empty listing is returned as-is; callers decide whether that is an
    /// error.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use clip_sampler::services::FrameIOService;
    ///
    /// let frames = FrameIOService::list_frames("jpegs_256/v_ApplyEyeMakeup_g08_c01")?;
    /// println!("{} frames", frames.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn list_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(ClipError::file_io_error(
                "list frame directory",
                dir,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let dir_str = dir.to_str().ok_or_else(|| {
            ClipError::processing(format!(
                "frame directory is not valid UTF-8: {}",
                dir.display()
            ))
        })?;
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(dir_str),
            FRAME_EXTENSION
        );

        let mut frames = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => frames.push(path),
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e, "Skipping unreadable frame entry");
                },
            }
        }
        frames.sort();

        Ok(frames)
    }

    /// Read a whole label-mapping file
    pub fn read_mapping<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(|e| ClipError::file_io_error("read mapping file", path, &e))
    }

    /// Save a debug frame as PNG, creating parent directories
    pub fn save_frame<P: AsRef<Path>>(frame: &RgbImage, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClipError::file_io_error("create output directory", parent, &e))?;
        }

        frame.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}
