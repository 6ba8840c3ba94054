//! Assembled clip volumes and their axis layouts

use crate::{
    error::{ClipError, Result},
    utils::denormalize,
};
use image::{Rgb, RgbImage};
use ndarray::{Array5, ArrayD, ArrayViewD, Axis, IxDyn};

/// Axis order of a [`ClipVolume`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// `(clips, depth, height, width, channels)`, the order frames are written in
    ChannelLast,
    /// `(channels, depth, height, width)` for a single clip
    ChannelFirst,
    /// `(clips, channels, depth, height, width)` for multi-clip evaluation
    ClipMajor,
}

impl Layout {
    pub fn ndim(self) -> usize {
        match self {
            Self::ChannelFirst => 4,
            Self::ChannelLast | Self::ClipMajor => 5,
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChannelLast => write!(f, "(clips, depth, height, width, channels)"),
            Self::ChannelFirst => write!(f, "(channels, depth, height, width)"),
            Self::ClipMajor => write!(f, "(clips, channels, depth, height, width)"),
        }
    }
}

/// Immutable, normalized clip volume tagged with its layout
#[derive(Debug, Clone, PartialEq)]
pub struct ClipVolume {
    data: ArrayD<f32>,
    layout: Layout,
}

impl ClipVolume {
    /// Wrap a buffer in assembly order
    pub fn from_channel_last(data: Array5<f32>) -> Self {
        Self {
            data: data.into_dyn(),
            layout: Layout::ChannelLast,
        }
    }

    /// Wrap an arbitrary buffer, checking its rank against `layout`
    pub fn from_parts(data: ArrayD<f32>, layout: Layout) -> Result<Self> {
        if data.ndim() != layout.ndim() {
            return Err(ClipError::dimension_mismatch(format!(
                "{}-d array cannot be laid out as {}",
                data.ndim(),
                layout
            )));
        }
        Ok(Self { data, layout })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn data(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// View in `(clips, depth, height, width, channels)` order whatever the layout
    fn channel_last_view(&self) -> ArrayViewD<'_, f32> {
        match self.layout {
            Layout::ChannelLast => self.data.view(),
            Layout::ClipMajor => self.data.view().permuted_axes(IxDyn(&[0, 2, 3, 4, 1])),
            Layout::ChannelFirst => self
                .data
                .view()
                .insert_axis(Axis(0))
                .permuted_axes(IxDyn(&[0, 2, 3, 4, 1])),
        }
    }

    fn dim(&self, channel_last_axis: usize) -> usize {
        self.channel_last_view().len_of(Axis(channel_last_axis))
    }

    pub fn num_clips(&self) -> usize {
        self.dim(0)
    }

    pub fn depth(&self) -> usize {
        self.dim(1)
    }

    pub fn height(&self) -> usize {
        self.dim(2)
    }

    pub fn width(&self) -> usize {
        self.dim(3)
    }

    pub fn channels(&self) -> usize {
        self.dim(4)
    }

    pub fn to_channel_last(&self) -> ClipVolume {
        Self {
            data: self.channel_last_view().as_standard_layout().into_owned(),
            layout: Layout::ChannelLast,
        }
    }

    pub fn to_clip_major(&self) -> ClipVolume {
        let view = self.channel_last_view().permuted_axes(IxDyn(&[0, 4, 1, 2, 3]));
        Self {
            data: view.as_standard_layout().into_owned(),
            layout: Layout::ClipMajor,
        }
    }

    /// Drop the clip axis of a single-clip volume
    pub fn to_channel_first(&self) -> Result<ClipVolume> {
        if self.num_clips() != 1 {
            return Err(ClipError::dimension_mismatch(format!(
                "channel-first layout holds one clip, volume has {}",
                self.num_clips()
            )));
        }
        self.clip(0)
    }

    /// Extract one clip in channel-first layout
    pub fn clip(&self, index: usize) -> Result<ClipVolume> {
        let clips = self.num_clips();
        if index >= clips {
            return Err(ClipError::IndexOutOfRange { index, len: clips });
        }
        let view = self
            .channel_last_view()
            .index_axis_move(Axis(0), index)
            .permuted_axes(IxDyn(&[3, 0, 1, 2]));
        Ok(Self {
            data: view.as_standard_layout().into_owned(),
            layout: Layout::ChannelFirst,
        })
    }

    /// Render every frame as an 8-bit image, indexed `[clip][depth]`
    ///
    /// Flow volumes put the horizontal component in red and the vertical one
    /// in green.
    pub fn frame_images(&self) -> Vec<Vec<RgbImage>> {
        let frames = denormalize(&self.channel_last_view());
        let (clips, depth, height, width, channels) = (
            self.num_clips(),
            self.depth(),
            self.height(),
            self.width(),
            self.channels(),
        );

        let mut images = Vec::with_capacity(clips);
        for n in 0..clips {
            let mut clip_images = Vec::with_capacity(depth);
            for t in 0..depth {
                let image = RgbImage::from_fn(width as u32, height as u32, |x, y| {
                    let px = |c: usize| {
                        frames
                            .get(&[n, t, y as usize, x as usize, c][..])
                            .copied()
                            .unwrap_or(0)
                    };
                    match channels {
                        1 => Rgb([px(0), px(0), px(0)]),
                        2 => Rgb([px(0), px(1), 0]),
                        _ => Rgb([px(0), px(1), px(2)]),
                    }
                });
                clip_images.push(image);
            }
            images.push(clip_images);
        }
        images
    }
}
