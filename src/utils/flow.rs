//! Temporal mean subtraction for optical flow volumes

use ndarray::{Array5, Axis};

/// Center the motion signal and stretch it back over `[0, 255]`
///
/// `buffer` is laid out as `(clips, depth, height, width, channels)`. For each
/// clip, pixel and channel the mean over `depth` is subtracted. Each
/// (clip, channel) plane is then shifted by the absolute value of its minimum
/// and scaled so its maximum becomes 255. Planes that are constant after
/// centering are left at zero.
pub fn mean_subtract_rescale(buffer: &mut Array5<f32>) {
    let depth = buffer.len_of(Axis(1));
    if depth == 0 {
        return;
    }

    let mean = buffer.sum_axis(Axis(1)) / depth as f32;
    *buffer -= &mean.insert_axis(Axis(1));

    for mut clip in buffer.axis_iter_mut(Axis(0)) {
        for mut plane in clip.axis_iter_mut(Axis(3)) {
            let min = plane.fold(f32::INFINITY, |acc, &v| acc.min(v));
            plane += min.abs();

            let max = plane.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
            if max > f32::EPSILON {
                plane.mapv_inplace(|v| v / max * 255.0);
            } else {
                plane.fill(0.0);
            }
        }
    }
}
