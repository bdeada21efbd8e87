//! Validation modules

pub mod media;

pub use media::{validate_files, validate_image, validate_video};
