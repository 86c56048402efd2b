//! Media storage module
//!
//! Handles media file upload and removal for status attachments.

mod media;

pub use media::MediaStorage;
