//! Shared buffer post-processing and validation utilities

pub mod flow;
pub mod normalize;
pub mod validation;

pub use flow::mean_subtract_rescale;
pub use normalize::{denormalize, normalize};
pub use validation::{NumericValidator, VolumeValidator};
