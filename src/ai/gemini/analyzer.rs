use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::ImageAnalyzer;
use crate::image::{ImageProcessor, PreparedImage};
use crate::models::{ClientHandle, ImageAsset};
use crate::{prompts, AnalysisError};
use async_trait::async_trait;

/// Describes images with a single `generateContent` call per upload.
pub struct GeminiImageAnalyzer {
    http: GeminiHttpClient,
    model: String,
    processor: ImageProcessor,
}

impl GeminiImageAnalyzer {
    pub fn new(http: GeminiHttpClient, model: String) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self {
            http,
            model,
            processor: ImageProcessor::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(image: &PreparedImage) -> GenerateContentRequest {
        let mut parts: Vec<Part> = prompts::analysis_parts()
            .into_iter()
            .map(|text| Part::Text {
                text: text.to_string(),
            })
            .collect();
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.to_base64(),
            },
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }
}

#[async_trait]
impl ImageAnalyzer for GeminiImageAnalyzer {
    async fn analyze(
        &self,
        handle: &ClientHandle,
        image: ImageAsset,
    ) -> Result<String, AnalysisError> {
        tracing::info!(
            "Analyzing {} ({} bytes) with {}",
            image.file_name(),
            image.len(),
            self.model
        );
        if !handle.supports(&self.model) {
            tracing::warn!(
                "{} was not among the models listed for this key",
                self.model
            );
        }

        let prepared = self
            .processor
            .prepare(image)
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        let request = Self::build_request(&prepared);
        let response: GenerateContentResponse = self
            .http
            .generate_content(handle.credential(), &self.model, &request)
            .await
            .map_err(|e| AnalysisError::from_provider(e, &self.model))?;

        match response.text() {
            Some(text) => {
                tracing::info!("Received analysis ({} chars)", text.len());
                Ok(text)
            }
            None => Err(AnalysisError::Blocked(
                response
                    .block_reason()
                    .unwrap_or_else(|| "empty response".to_string()),
            )),
        }
    }
}
