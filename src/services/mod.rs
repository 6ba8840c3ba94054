//! Services for frame I/O and decoding
//!
//! This module separates filesystem and codec concerns from the sampling and
//! assembly logic.

pub mod codec;
pub mod io;

pub use codec::{resize_exact, FrameCodec, ImageCodec};
pub use io::{FrameIOService, FRAME_EXTENSION};
