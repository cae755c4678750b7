use super::PreparedImage;
use crate::models::ImageAsset;
use crate::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn prepare_sync(asset: ImageAsset) -> Result<PreparedImage> {
        let detected = asset.detected_format().ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "{} is not a JPEG, PNG or WebP image",
                asset.file_name()
            ))
        })?;
        if detected != asset.format() {
            tracing::debug!(
                "{} declares {} but contains {}",
                asset.file_name(),
                asset.format().label(),
                detected.label()
            );
        }

        // Full decode so truncated or corrupt files never reach the provider.
        let img = image::load_from_memory_with_format(asset.bytes(), detected.into())?;

        Ok(PreparedImage {
            width: img.width(),
            height: img.height(),
            format: detected,
            bytes: asset.into_bytes(),
        })
    }

    /// Decodes `asset` on the blocking pool and hands back its original bytes
    /// once they are known to be a well-formed image.
    pub async fn prepare(&self, asset: ImageAsset) -> Result<PreparedImage> {
        let file_name = asset.file_name().to_string();

        let prepared = tokio::task::spawn_blocking(move || Self::prepare_sync(asset))
            .await
            .map_err(|e| Error::Invariant(format!("Image decoding task join error: {}", e)))??;

        tracing::debug!(
            "Verified {} ({} bytes, {}) as a {}x{} image",
            file_name,
            prepared.bytes.len(),
            prepared.mime_type(),
            prepared.width,
            prepared.height
        );
        Ok(prepared)
    }
}
