pub const IMAGE_ANALYSIS: &str = include_str!("../data/prompts/image_analysis.txt");

/// Shown in place of the analysis whenever describing an image fails.
pub const FALLBACK_MESSAGE: &str = "Could not generate image information.";

/// Instruction parts sent ahead of the image, one per blank-line separated
/// block of [`IMAGE_ANALYSIS`].
pub fn analysis_parts() -> Vec<&'static str> {
    IMAGE_ANALYSIS
        .split("\n\n")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
