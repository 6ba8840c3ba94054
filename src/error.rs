//! Error types for clip sampling and volume assembly

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for clip sampling operations
pub type Result<T> = std::result::Result<T, ClipError>;

/// Error types surfaced by the sampling pipeline
///
/// Per-frame decode failures are not represented here: the assembler absorbs
/// them, logs the offending path and leaves the slot zero-filled.
#[derive(Error, Debug)]
pub enum ClipError {
    /// Input/output errors (missing directory, unreadable mapping file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding errors from the frame codec
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid dataset/split/mode/modality or clip-count combination
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample index outside `[0, len)`
    #[error("Sample index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Shape preconditions violated (flow direction lengths, crop larger than scale)
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Frame directory without any frames
    #[error("No frames found in '{}'", .0.display())]
    EmptyVideo(PathBuf),

    /// Malformed label-mapping line
    #[error("Malformed mapping line {line}: {message}")]
    Mapping { line: usize, message: String },

    /// Invalid glob pattern built from a frame directory path
    #[error("Invalid frame pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Unexpected pipeline failures
    #[error("Processing error: {0}")]
    Processing(String),
}

impl ClipError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new dimension mismatch error
    pub fn dimension_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a mapping error for a 1-based line number
    pub fn mapping<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Mapping {
            line,
            message: msg.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with the accepted values
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid: {})",
            parameter, value, valid_range
        ))
    }
}
