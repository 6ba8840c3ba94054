//! Volume validation utilities
//!
//! Centralizes the shape and range checks applied to assembled clip volumes
//! and to the frame listings they are built from.

use crate::{
    config::Modality,
    error::{ClipError, Result},
};
use ndarray::{ArrayBase, Data, Dimension};
use std::path::PathBuf;

/// Validator for clip volumes and their inputs
pub struct VolumeValidator;

impl VolumeValidator {
    /// Validate that a volume has exactly the expected shape
    pub fn validate_shape(actual: &[usize], expected: &[usize]) -> Result<()> {
        if actual != expected {
            return Err(ClipError::dimension_mismatch(format!(
                "Volume shape mismatch. Expected {:?}, got {:?}",
                expected, actual
            )));
        }
        Ok(())
    }

    /// Validate every value is finite and inside `[min, max]`
    pub fn validate_value_range<S, D>(volume: &ArrayBase<S, D>, min: f32, max: f32) -> Result<()>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        for value in volume {
            if !value.is_finite() {
                return Err(ClipError::processing(
                    "Volume contains non-finite values (NaN or infinity)",
                ));
            }
            if *value < min || *value > max {
                return Err(ClipError::processing(format!(
                    "Volume value {} out of range [{}, {}]",
                    value, min, max
                )));
            }
        }
        Ok(())
    }

    /// Validate the number of frame directories for a modality
    pub fn validate_frame_dirs(modality: Modality, dirs: &[PathBuf]) -> Result<()> {
        let expected = modality.frame_dirs();
        if dirs.len() != expected {
            return Err(ClipError::dimension_mismatch(format!(
                "{} modality needs {} frame director{}, got {}",
                modality,
                expected,
                if expected == 1 { "y" } else { "ies" },
                dirs.len()
            )));
        }
        Ok(())
    }

    /// Validate all frame listings have the same length and return it
    ///
    /// Flow samples are split into horizontal and vertical directories that
    /// must hold one frame each per time step.
    pub fn validate_frame_counts(dirs: &[PathBuf], listings: &[Vec<PathBuf>]) -> Result<usize> {
        let Some(first) = listings.first() else {
            return Err(ClipError::processing("no frame listings to validate"));
        };
        let frame_count = first.len();

        if frame_count == 0 {
            let dir = dirs.first().cloned().unwrap_or_default();
            return Err(ClipError::EmptyVideo(dir));
        }

        for (dir, listing) in dirs.iter().zip(listings).skip(1) {
            if listing.len() != frame_count {
                return Err(ClipError::dimension_mismatch(format!(
                    "'{}' has {} frames, expected {} to match '{}'",
                    dir.display(),
                    listing.len(),
                    frame_count,
                    dirs.first().map(|d| d.display().to_string()).unwrap_or_default()
                )));
            }
        }

        Ok(frame_count)
    }
}
