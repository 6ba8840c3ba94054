//! Intensity normalization of assembled volumes

use ndarray::{Array, ArrayBase, Data, DataMut, Dimension};

/// Intensity mapped to zero by [`normalize`]
pub const INTENSITY_CENTER: f32 = 128.0;

/// Divisor mapping `[0, 255]` onto roughly `[-1, 1]`
pub const INTENSITY_SCALE: f32 = 128.0;

/// Map `[0, 255]` intensities onto `[-1, 1)` in place
pub fn normalize<S, D>(buffer: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    buffer.mapv_inplace(|v| (v - INTENSITY_CENTER) / INTENSITY_SCALE);
}

/// Inverse of [`normalize`] for inspecting volumes as 8-bit images
///
/// Values are rounded and clamped into `0..=255`, so only values that were in
/// range before normalization come back exactly.
pub fn denormalize<S, D>(buffer: &ArrayBase<S, D>) -> Array<u8, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    buffer.mapv(|v| (v * INTENSITY_SCALE + INTENSITY_CENTER).round().clamp(0.0, 255.0) as u8)
}
