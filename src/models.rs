//! Data models and structures
//!
//! Session-scoped values exchanged between the front-end, the credential
//! validator and the image analyzer. None of them is persisted.

use crate::ai::mime::sniff_format;
use crate::prompts::FALLBACK_MESSAGE;
use crate::{AnalysisError, Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;
use zeroize::Zeroize;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_WIDTH: usize = 100;

/// Gemini API key that never shows up in logs or debug output.
#[derive(Clone)]
pub struct Credential {
    inner: String,
}

impl Credential {
    /// Returns `None` for empty or whitespace-only input.
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            inner: trimmed.to_string(),
        })
    }

    /// Raw key value. Only call this when building a request.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

/// Authenticated provider session: the key that passed validation plus the
/// models it may call `generateContent` on.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    session_id: Uuid,
    credential: Credential,
    models: BTreeSet<String>,
}

impl ClientHandle {
    /// Returns `None` when `models` is empty; a handle always has at least
    /// one eligible model.
    pub fn new(
        session_id: Uuid,
        credential: Credential,
        models: impl IntoIterator<Item = String>,
    ) -> Option<Self> {
        let models: BTreeSet<String> = models.into_iter().collect();
        if models.is_empty() {
            return None;
        }
        Some(Self {
            session_id,
            credential,
            models,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn models(&self) -> &BTreeSet<String> {
        &self.models
    }

    pub fn supports(&self, model: &str) -> bool {
        self.models.contains(model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// Accepted upload extensions, case-insensitive.
    pub const EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "webp"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::WebP => "WebP",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// An uploaded file, restricted to the supported extensions.
pub struct ImageAsset {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageAsset {
    /// Accepts the upload when its extension is one of
    /// [`ImageFormat::EXTENSIONS`]. The bytes are not inspected here.
    pub fn from_upload(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let format = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "{} (expected one of: {})",
                    file_name,
                    ImageFormat::EXTENSIONS.join(", ")
                ))
            })?;

        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format declared by the file extension.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Format detected from the leading bytes, if it is a supported one.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        sniff_format(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel dimensions read from the image header, without a full decode.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What the user sees for one analyzed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// Provider text, unmodified.
    Text(String),
    /// The analysis failed; the user is shown [`FALLBACK_MESSAGE`].
    Fallback(AnalysisError),
}

impl AnalysisResult {
    pub fn text(&self) -> &str {
        match self {
            AnalysisResult::Text(text) => text,
            AnalysisResult::Fallback(_) => FALLBACK_MESSAGE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisResult::Fallback(_))
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            AnalysisResult::Text(_) => None,
            AnalysisResult::Fallback(err) => Some(err),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    /// Per-request timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Total width of the rendered result panel.
    pub width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            width: DEFAULT_WIDTH,
        }
    }
}
