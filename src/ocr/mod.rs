//! OCR engine abstraction.
//!
//! Defines the [`OcrEngine`] trait so the recognition backend (a local
//! Tesseract install in production, a stub in tests) is a seam rather than a
//! hardwired call. Engines are configured once at process start; request
//! handling never reads ambient state.

pub mod tesseract;

use crate::error::ExtractError;
use image::DynamicImage;

/// Async trait implemented by each OCR backend.
///
/// `recognize` returns the engine's plain-text reading of the image with
/// leading/trailing whitespace stripped. Recognition is slow (hundreds of
/// milliseconds and up) and not cancelable once started.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError>;
}
