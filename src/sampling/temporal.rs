//! Temporal window selection
//!
//! Windows are expressed over a logically looped video: positions at or past
//! `frame_count` wrap back to the start, so a 5-frame video can still yield a
//! 16-frame clip. All three policies return windows of exactly `clip_len`
//! positions.

use crate::error::{ClipError, Result};
use rand::Rng;
use std::ops::Range;

/// Frame count for which the random policy uses a fixed loop multiplier.
///
/// Heuristic kept from the sampling policy the released models were trained
/// with; not derived from any sampling invariant.
pub const FIXED_MULTIPLIER_FRAME_COUNT: usize = 32;

/// Loop multiplier used for `FIXED_MULTIPLIER_FRAME_COUNT` videos
pub const FIXED_LOOP_MULTIPLIER: usize = 2;

/// Half-open interval `[start, end)` of (possibly looped) frame positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemporalWindow {
    pub start: usize,
    pub end: usize,
}

impl TemporalWindow {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn positions(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Map a looped position back onto a real frame index
#[inline]
pub fn wrap_index(position: usize, frame_count: usize) -> usize {
    position % frame_count
}

/// Minimum looped length the random and uniform policies sample from
fn sample_len(clip_len: usize) -> f64 {
    clip_len as f64 * 1.5
}

fn check_inputs(frame_count: usize, clip_len: usize) -> Result<()> {
    if clip_len == 0 {
        return Err(ClipError::config_value_error("clip length", 0, "> 0"));
    }
    if frame_count == 0 {
        return Err(ClipError::processing(
            "cannot select a temporal window from a video with zero frames",
        ));
    }
    Ok(())
}

/// Loop multiplier applied by the random policy to videos shorter than 1.5 clips
fn random_loop_multiplier(frame_count: usize, clip_len: usize) -> usize {
    let computed = (sample_len(clip_len) / frame_count as f64).ceil() as usize;

    if frame_count == FIXED_MULTIPLIER_FRAME_COUNT {
        // The fixed multiplier leaves no room for clips of 64+ frames.
        if frame_count * FIXED_LOOP_MULTIPLIER > clip_len {
            return FIXED_LOOP_MULTIPLIER;
        }
        tracing::debug!(
            frame_count,
            clip_len,
            "fixed loop multiplier too small for clip, using computed multiplier"
        );
    }

    computed
}

/// Randomly place a window for temporal jittering during training
///
/// Videos of at least 1.5 clip lengths draw the start from
/// `[0, frame_count - clip_len)`; shorter ones are looped first and draw from
/// the looped length.
pub fn random_window<R: Rng + ?Sized>(
    frame_count: usize,
    clip_len: usize,
    rng: &mut R,
) -> Result<TemporalWindow> {
    check_inputs(frame_count, clip_len)?;

    let upper = if frame_count as f64 >= sample_len(clip_len) {
        frame_count - clip_len
    } else {
        frame_count * random_loop_multiplier(frame_count, clip_len) - clip_len
    };

    let start = rng.gen_range(0..upper);
    Ok(TemporalWindow::new(start, clip_len))
}

/// Deterministic window centered over the (looped) video
pub fn center_window(frame_count: usize, clip_len: usize) -> Result<TemporalWindow> {
    check_inputs(frame_count, clip_len)?;

    let looped = if frame_count >= clip_len {
        frame_count
    } else {
        frame_count * clip_len.div_ceil(frame_count)
    };

    Ok(TemporalWindow::new((looped - clip_len) / 2, clip_len))
}

/// Video length after doubling until it covers at least 1.5 clips
pub fn uniform_looped_len(frame_count: usize, clip_len: usize) -> Result<usize> {
    check_inputs(frame_count, clip_len)?;

    let mut looped = frame_count;
    while (looped as f64) < sample_len(clip_len) {
        looped *= 2;
    }
    Ok(looped)
}

/// Evenly spread `n_clips` windows over the whole video
///
/// The first window starts at 0 and the last one ends exactly at the looped
/// length. Spacing between consecutive windows is negative when the clips
/// cannot fit side by side, in which case they overlap. A single clip is
/// placed at the end of the video.
pub fn uniform_windows(
    frame_count: usize,
    clip_len: usize,
    n_clips: usize,
) -> Result<Vec<TemporalWindow>> {
    if n_clips == 0 {
        return Err(ClipError::config_value_error("clip count", 0, "> 0"));
    }
    let looped = uniform_looped_len(frame_count, clip_len)?;
    let last = TemporalWindow::new(looped - clip_len, clip_len);

    if n_clips == 1 {
        return Ok(vec![last]);
    }

    let spacing = (looped as f64 - (clip_len * n_clips) as f64) / (n_clips - 1) as f64;

    let mut windows = Vec::with_capacity(n_clips);
    windows.push(TemporalWindow::new(0, clip_len));
    for _ in 1..n_clips - 1 {
        let prev_end = windows.last().map_or(clip_len, |w| w.end);
        let start = (prev_end as f64 + spacing).round_ties_even().max(0.0) as usize;
        windows.push(TemporalWindow::new(start, clip_len));
    }
    windows.push(last);

    Ok(windows)
}
