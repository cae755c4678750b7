pub mod analyzer;
pub mod client;
pub mod types;
pub mod validator;

pub use analyzer::GeminiImageAnalyzer;
pub use client::GeminiHttpClient;
pub use validator::GeminiCredentialValidator;
