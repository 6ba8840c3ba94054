//! End-to-end assembly scenarios over synthetic frame directories

mod common;

use clip_sampler::{
    assemble, uniform_windows, AssemblyRequest, Dataset, Layout, LoadMode, Modality, Mode,
    Result, Sample, UsageMode, VideoDataset,
};
use common::{value_range, write_gradient_frames, DatasetFixture, FRAME_SIDE};
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

#[test]
fn test_rgb_train_volume_shape_and_range() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("v_Synthetic_g01_c01");
    write_gradient_frames(&dir, 20, FRAME_SIDE);

    let request = AssemblyRequest::new(vec![dir], Modality::Rgb, UsageMode::Train);
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..3 {
        let volume = assemble(&request, &mut rng)?;
        assert_eq!(volume.shape(), &[3, 16, 112, 112]);
        assert_eq!(volume.layout(), Layout::ChannelFirst);

        let (min, max) = value_range(volume.data().iter().copied());
        assert!(min >= -1.0 && max <= 1.0, "range [{min}, {max}]");
        assert!(max > min, "gradient frames should not collapse to a constant");
    }

    Ok(())
}

#[test]
fn test_short_video_multi_clip_rgb() -> Result<()> {
    let fixture = DatasetFixture::new();
    fixture.add_video(Dataset::Ucf101, Modality::Rgb, "Short/v_Short_g01_c01.avi", 5, 64);
    fixture.write_mapping(Dataset::Ucf101, Mode::Test, 1, &["Short/v_Short_g01_c01.avi 3"]);

    let config = fixture
        .config()
        .mode(Mode::Test)
        .load_mode(LoadMode::Video)
        .clips_per_video(10)
        .build()?;
    let mut rng = StdRng::seed_from_u64(0);
    let dataset = VideoDataset::open(config, &mut rng)?;
    assert_eq!(dataset.usage_mode(), UsageMode::Test);

    let (volume, label) = dataset.get(0, &mut rng)?;
    assert_eq!(label, 3);
    assert_eq!(volume.shape(), &[10, 3, 16, 112, 112]);
    assert_eq!(volume.layout(), Layout::ClipMajor);

    // 5 frames double to 40 before 10 clips of 16 are spread over them.
    let windows = uniform_windows(5, 16, 10)?;
    assert_eq!(windows.len(), 10);
    assert!(windows.iter().all(|w| w.len() == 16 && w.end <= 40));
    assert_eq!(windows.last().map(|w| w.end), Some(40));

    Ok(())
}

#[test]
fn test_short_video_multi_clip_flow() -> Result<()> {
    let fixture = DatasetFixture::new();
    fixture.add_video(Dataset::Hmdb51, Modality::Flow, "Jump/jump_01.avi", 5, 64);
    fixture.write_mapping(Dataset::Hmdb51, Mode::Test, 2, &["Jump/jump_01.avi 12"]);

    let config = fixture
        .config()
        .dataset(Dataset::Hmdb51)
        .split(clip_sampler::Split::new(2)?)
        .mode(Mode::Test)
        .modality(Modality::Flow)
        .load_mode(LoadMode::Video)
        .clips_per_video(10)
        .build()?;
    let mut rng = StdRng::seed_from_u64(0);
    let dataset = VideoDataset::open(config, &mut rng)?;

    let (volume, label) = dataset.get(0, &mut rng)?;
    assert_eq!(label, 12);
    assert_eq!(volume.shape(), &[10, 2, 16, 112, 112]);

    let (min, max) = value_range(volume.data().iter().copied());
    assert!(min >= -1.0 && max <= 1.0, "range [{min}, {max}]");

    Ok(())
}

#[test]
fn test_flow_range_with_and_without_mean_subtraction() -> Result<()> {
    let fixture = DatasetFixture::new();
    let dirs = fixture.add_video(Dataset::Ucf101, Modality::Flow, "Run/v_Run_g02_c01.avi", 24, 96);

    for enabled in [true, false] {
        let request = AssemblyRequest::new(dirs.clone(), Modality::Flow, UsageMode::Train)
            .with_mean_subtraction(enabled);
        let volume = assemble(&request, &mut StdRng::seed_from_u64(9))?;

        assert_eq!(volume.shape(), &[2, 16, 112, 112]);
        assert!(volume
            .data()
            .iter()
            .all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
    }

    Ok(())
}

#[test]
fn test_shape_independent_of_frame_count() -> Result<()> {
    let temp = TempDir::new()?;
    let mut rng = StdRng::seed_from_u64(5);

    for frame_count in [1, 7, 16, 24, 32, 45] {
        let dir = temp.path().join(format!("video_{frame_count}"));
        write_gradient_frames(&dir, frame_count, 48);

        for usage in [UsageMode::Train, UsageMode::Validation, UsageMode::Test] {
            let request = AssemblyRequest::new(vec![dir.clone()], Modality::Rgb, usage);
            let volume = assemble(&request, &mut rng)?;
            assert_eq!(volume.shape(), request.output_shape().as_slice());
        }
    }

    Ok(())
}

#[test]
fn test_validation_is_deterministic() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("video");
    write_gradient_frames(&dir, 30, 128);

    let request = AssemblyRequest::new(vec![dir], Modality::Rgb, UsageMode::Validation);
    let first = assemble(&request, &mut StdRng::seed_from_u64(1))?;
    let second = assemble(&request, &mut StdRng::seed_from_u64(99))?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_seeded_training_is_reproducible() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("video");
    write_gradient_frames(&dir, 40, 128);

    let samples = vec![Sample {
        frame_dirs: vec![dir],
        label: 0,
    }];
    let config = clip_sampler::DatasetConfig::builder().build()?;
    let dataset = VideoDataset::from_samples(
        config,
        samples,
        clip_sampler::ImageCodec,
        &mut StdRng::seed_from_u64(0),
    )?;

    let (a, _) = dataset.get(0, &mut StdRng::seed_from_u64(77))?;
    let (b, _) = dataset.get(0, &mut StdRng::seed_from_u64(77))?;
    assert_eq!(a, b);

    Ok(())
}

#[test]
fn test_multi_clip_layout_conversions() -> Result<()> {
    let temp = TempDir::new()?;
    let dir = temp.path().join("video");
    write_gradient_frames(&dir, 12, 64);

    let request = AssemblyRequest::new(vec![dir], Modality::Rgb, UsageMode::Test)
        .with_clips_per_video(3);
    let volume = assemble(&request, &mut StdRng::seed_from_u64(0))?;
    assert_eq!(volume.shape(), &[3, 3, 16, 112, 112]);

    let clip = volume.clip(2)?;
    assert_eq!(clip.layout(), Layout::ChannelFirst);
    assert_eq!(clip.shape(), &[3, 16, 112, 112]);

    let channel_last = volume.to_channel_last();
    assert_eq!(channel_last.shape(), &[3, 16, 112, 112, 3]);
    assert_eq!(channel_last.to_clip_major(), volume);

    let frames = volume.frame_images();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|clip| clip.len() == 16));
    assert_eq!(frames[0][0].dimensions(), (112, 112));

    Ok(())
}
