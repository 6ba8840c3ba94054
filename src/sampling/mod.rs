//! Temporal and spatial index selection for clip assembly

pub mod spatial;
pub mod temporal;

pub use spatial::{center_crop, random_crop, SpatialWindow};
pub use temporal::{
    center_window, random_window, uniform_looped_len, uniform_windows, wrap_index, TemporalWindow,
};
