//! Describe images with Google Gemini from the terminal
//!
//! A session validates a Gemini API key by listing the models it can reach,
//! then sends each uploaded image with a fixed instruction prompt to a fast
//! multimodal model and renders the returned description beside the image
//! details.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod render;
pub mod session;

pub use error::{AnalysisError, Error, ErrorKind, Result, ValidationError};
