//! Tesseract CLI OCR engine.

use super::OcrEngine;
use crate::config::AppConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use std::process::Command;
use tracing::debug;

/// Runs the `tesseract` binary against a scratch PNG of the decoded image.
///
/// Binary location and language pack come from [`AppConfig`] at construction.
pub struct TesseractEngine {
    cmd: String,
    lang: String,
}

impl TesseractEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
            lang: config.tesseract_lang.clone(),
        }
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        let image = image.clone();
        let cmd = self.cmd.clone();
        let lang = self.lang.clone();

        // The CLI call blocks for the whole recognition, so keep it off the
        // async workers.
        tokio::task::spawn_blocking(move || run_tesseract(&cmd, &lang, &image))
            .await
            .map_err(|e| ExtractError::OcrEngine(format!("recognition task failed: {}", e)))?
    }
}

fn run_tesseract(cmd: &str, lang: &str, image: &DynamicImage) -> Result<String, ExtractError> {
    let dir = tempfile::tempdir()
        .map_err(|e| ExtractError::OcrEngine(format!("could not create scratch dir: {}", e)))?;
    let png_path = dir.path().join("card.png");

    image
        .save_with_format(&png_path, image::ImageFormat::Png)
        .map_err(|e| ExtractError::OcrEngine(format!("could not write scratch image: {}", e)))?;

    debug!(cmd, lang, "invoking tesseract");

    // tesseract <image> stdout -l <lang>
    let output = Command::new(cmd)
        .arg(&png_path)
        .arg("stdout")
        .arg("-l")
        .arg(lang)
        .output()
        .map_err(|e| ExtractError::OcrEngine(format!("failed to run '{}': {}", cmd, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::OcrEngine(format!(
            "tesseract exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let text = String::from_utf8(output.stdout)
        .map_err(|e| ExtractError::OcrEngine(format!("non-UTF-8 output: {}", e)))?;

    Ok(text.trim().to_string())
}
