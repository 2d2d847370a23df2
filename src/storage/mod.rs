//! Media storage module
//!
//! Handles image upload and deletion on the local filesystem.

mod media;

pub use media::{MediaStorage, Upload};
