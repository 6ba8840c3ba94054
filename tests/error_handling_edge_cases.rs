//! Error handling and edge case testing
//!
//! Covers the failure taxonomy of the sampling pipeline: configuration errors
//! caught at construction, out-of-range indices, malformed inputs on disk, and
//! per-frame decode failures that are absorbed instead of aborting the load.

mod common;

use clip_sampler::{
    assemble,
    config::{LoadMode, Mode},
    error::{ClipError, Result},
    AssemblyRequest, Dataset, DatasetConfig, FrameSize, Modality, UsageMode, VideoDataset,
};
use common::{corrupt_frame, write_flow_frames, write_solid_frames, DatasetFixture};
use rand::{rngs::StdRng, SeedableRng};
use std::str::FromStr;
use tempfile::TempDir;

#[test]
fn test_config_policy_violations() {
    // Train mode only loads single clips.
    let result = DatasetConfig::builder()
        .load_mode(LoadMode::Video)
        .clips_per_video(10)
        .build();
    assert!(matches!(result, Err(ClipError::InvalidConfig(_))));

    // Clip loading means exactly one clip per video.
    let result = DatasetConfig::builder()
        .mode(Mode::Test)
        .clips_per_video(3)
        .build();
    let error = result.unwrap_err();
    assert!(error.to_string().contains("clips per video"));
    assert!(error.to_string().contains('3'));

    // Video loading needs more than one clip.
    let result = DatasetConfig::builder()
        .mode(Mode::Test)
        .load_mode(LoadMode::Video)
        .clips_per_video(1)
        .build();
    assert!(matches!(result, Err(ClipError::InvalidConfig(_))));

    let result = DatasetConfig::builder().clip_len(0).build();
    assert!(matches!(result, Err(ClipError::InvalidConfig(_))));
}

#[test]
fn test_untyped_names_rejected() {
    assert!(matches!(Dataset::from_str("kinetics"), Err(ClipError::InvalidConfig(_))));
    assert!(matches!(Mode::from_str("val"), Err(ClipError::InvalidConfig(_))));
    assert!(matches!(Modality::from_str("depth"), Err(ClipError::InvalidConfig(_))));
    assert!(matches!(clip_sampler::Split::new(0), Err(ClipError::InvalidConfig(_))));
    assert!(matches!(clip_sampler::Split::new(4), Err(ClipError::InvalidConfig(_))));
}

#[test]
fn test_crop_larger_than_resize() {
    let result = DatasetConfig::builder()
        .resize(FrameSize::new(100, 100))
        .crop(FrameSize::new(112, 112))
        .build();
    assert!(matches!(result, Err(ClipError::DimensionMismatch(_))));
}

#[test]
fn test_config_file_errors() -> Result<()> {
    let temp = TempDir::new()?;

    let missing = DatasetConfig::from_json_file(temp.path().join("absent.json"));
    assert!(matches!(missing, Err(ClipError::Io(_))));

    let broken = temp.path().join("broken.json");
    std::fs::write(&broken, "{ not json")?;
    assert!(matches!(
        DatasetConfig::from_json_file(&broken),
        Err(ClipError::InvalidConfig(_))
    ));

    let bad_split = temp.path().join("split.json");
    std::fs::write(&bad_split, r#"{"root": ".", "dataset": "ucf", "split": 9}"#)?;
    assert!(DatasetConfig::from_json_file(&bad_split).is_err());

    Ok(())
}

#[test]
fn test_index_out_of_range() -> Result<()> {
    let fixture = DatasetFixture::new();
    fixture.write_mapping(Dataset::Ucf101, Mode::Train, 1, &["a/x.avi 0", "b/y.avi 1"]);
    let mut rng = StdRng::seed_from_u64(0);
    let dataset = VideoDataset::open(fixture.config().build()?, &mut rng)?;

    let error = dataset.get(2, &mut rng).unwrap_err();
    assert!(matches!(error, ClipError::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(
        error.to_string(),
        "Sample index 2 out of range for dataset of length 2"
    );

    Ok(())
}

#[test]
fn test_flow_direction_length_mismatch() -> Result<()> {
    let temp = TempDir::new()?;
    let u = temp.path().join("u");
    let v = temp.path().join("v");
    write_flow_frames(&u, 12, 32);
    write_flow_frames(&v, 11, 32);

    let request = AssemblyRequest::new(vec![u, v], Modality::Flow, UsageMode::Train);
    let result = assemble(&request, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(ClipError::DimensionMismatch(_))));

    Ok(())
}

#[test]
fn test_wrong_frame_dir_count() {
    let request = AssemblyRequest::new(
        vec!["only_u".into()],
        Modality::Flow,
        UsageMode::Validation,
    );
    let result = assemble(&request, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(ClipError::DimensionMismatch(_))));
}

#[test]
fn test_empty_and_missing_frame_directories() -> Result<()> {
    let temp = TempDir::new()?;
    let empty = temp.path().join("empty");
    std::fs::create_dir_all(&empty)?;
    // Non-jpg files do not count as frames.
    std::fs::write(empty.join("notes.txt"), "x")?;

    let request = AssemblyRequest::new(vec![empty.clone()], Modality::Rgb, UsageMode::Train);
    match assemble(&request, &mut StdRng::seed_from_u64(0)) {
        Err(ClipError::EmptyVideo(path)) => assert_eq!(path, empty),
        other => panic!("expected EmptyVideo, got {other:?}"),
    }

    let missing = temp.path().join("missing");
    let request = AssemblyRequest::new(vec![missing], Modality::Rgb, UsageMode::Train);
    match assemble(&request, &mut StdRng::seed_from_u64(0)) {
        Err(ClipError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_corrupt_frame_is_soft_failure() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("video");
    write_solid_frames(&dir, 20, 64, 100);
    // Center window over 20 frames starts at frame index 2.
    corrupt_frame(&dir, 2);

    let request = AssemblyRequest::new(vec![dir], Modality::Rgb, UsageMode::Validation);
    let volume = assemble(&request, &mut StdRng::seed_from_u64(0))?;
    assert_eq!(volume.shape(), &[3, 16, 112, 112]);

    let clip = volume.to_channel_last().into_array();
    // Unwritten slot stays at zero intensity, i.e. -1 after normalization.
    let first = clip.index_axis(ndarray::Axis(1), 0);
    assert!(first.iter().all(|&v| v == -1.0));
    let second = clip.index_axis(ndarray::Axis(1), 1);
    assert!(second.iter().all(|&v| v > -0.5));

    Ok(())
}

#[test]
fn test_malformed_mapping_file() -> Result<()> {
    let fixture = DatasetFixture::new();
    fixture.write_mapping(
        Dataset::Ucf101,
        Mode::Train,
        1,
        &["a/x.avi 0", "b/y.avi one"],
    );
    let result = VideoDataset::open(fixture.config().build()?, &mut StdRng::seed_from_u64(0));

    match result {
        Err(ClipError::Mapping { line, message }) => {
            assert_eq!(line, 2);
            assert!(message.contains("one"));
        },
        other => panic!("expected Mapping error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_missing_mapping_file() -> Result<()> {
    let fixture = DatasetFixture::new();
    let result = VideoDataset::open(
        fixture.config().mode(Mode::Test).build()?,
        &mut StdRng::seed_from_u64(0),
    );

    let error = result.unwrap_err();
    assert!(matches!(error, ClipError::Io(_)));
    assert!(error.to_string().contains("ucf_testlist01.txt"));

    Ok(())
}
