//! Label-mapping files and the on-disk dataset layout
//!
//! A mapping file holds one sample per line, `<path token> <label>`, where the
//! path token names a video file relative to the dataset (for example
//! `ApplyEyeMakeup/v_ApplyEyeMakeup_g08_c01.avi`). Its frames live in a
//! directory named after the token without extension, under one frame root per
//! modality direction.

use crate::{
    config::{Dataset, Modality, Mode, Split},
    error::{ClipError, Result},
};
use std::path::{Path, PathBuf};

/// One parsed mapping line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Path token with its file extension removed
    pub path_token: String,
    pub label: u32,
}

impl MappingEntry {
    /// Frame directories for this entry, one per frame root
    pub fn frame_dirs(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        roots.iter().map(|root| root.join(&self.path_token)).collect()
    }
}

/// Remove the extension from the final component of a path token
///
/// Everything from the first `.` of the file name on is dropped, so
/// `v_Foo_g01_c01.avi` and `v_Foo_g01_c01.tar.gz` both become `v_Foo_g01_c01`.
pub fn strip_extension(token: &str) -> &str {
    let name_start = token.rfind('/').map_or(0, |i| i + 1);
    match token[name_start..].find('.') {
        Some(dot) => &token[..name_start + dot],
        None => token,
    }
}

/// Parse the contents of a mapping file
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_mapping(content: &str) -> Result<Vec<MappingEntry>> {
    let mut entries = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line_no = i + 1;
        let mut fields = line.split_whitespace();
        let Some(token) = fields.next() else {
            continue;
        };

        let label = fields
            .next()
            .ok_or_else(|| ClipError::mapping(line_no, format!("missing label after '{token}'")))?;
        let label = label.parse::<u32>().map_err(|e| {
            ClipError::mapping(line_no, format!("label '{label}' is not an integer: {e}"))
        })?;

        if let Some(extra) = fields.next() {
            return Err(ClipError::mapping(
                line_no,
                format!("unexpected trailing field '{extra}'"),
            ));
        }

        let path_token = strip_extension(token);
        if path_token.is_empty() {
            return Err(ClipError::mapping(line_no, format!("empty path in '{token}'")));
        }

        entries.push(MappingEntry {
            path_token: path_token.to_string(),
            label,
        });
    }

    Ok(entries)
}

/// Frame roots of a dataset, in frame-directory order
///
/// rgb has a single root; flow has the horizontal (`u`) root followed by the
/// vertical (`v`) one.
pub fn frame_roots(root: &Path, dataset: Dataset, modality: Modality) -> Vec<PathBuf> {
    let prefix = match dataset {
        Dataset::Ucf101 => "ucf101",
        Dataset::Hmdb51 => "hmdb51",
    };

    match modality {
        Modality::Rgb => vec![root.join(format!("{prefix}_jpegs_256")).join("jpegs_256")],
        Modality::Flow => {
            let flow = root.join(format!("{prefix}_tvl1_flow")).join("tvl1_flow");
            vec![flow.join("u"), flow.join("v")]
        },
    }
}

/// Location of the mapping file for a dataset split
///
/// `<mapping_dir>/UCF-101/ucf_trainlist01.txt` and so on.
pub fn mapping_file_path(mapping_dir: &Path, dataset: Dataset, mode: Mode, split: Split) -> PathBuf {
    mapping_dir.join(dataset.display_name()).join(format!(
        "{}_{}list0{}.txt",
        dataset.key(),
        mode.key(),
        split.get()
    ))
}
