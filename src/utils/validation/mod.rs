//! Validation utilities for configuration values and assembled volumes

pub mod numeric;
pub mod tensor;

pub use numeric::NumericValidator;
pub use tensor::VolumeValidator;
