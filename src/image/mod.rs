//! Image checks ahead of analysis
//!
//! Uploads are decoded once to prove they are well-formed images. The
//! provider then receives the original bytes, labelled with the MIME type
//! sniffed from their header.

pub mod processor;

pub use processor::ImageProcessor;

use crate::models::ImageFormat;
use base64::Engine as _;
use std::fmt;

/// A verified upload, ready for the inline request payload.
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for PreparedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
