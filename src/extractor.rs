//! Business-card extraction pipeline.
//!
//! One linear pass per request: decode → OCR → prompt → completion → parse →
//! append. The pipeline stops at the first failing stage; nothing reaches the
//! contact table unless every stage before it succeeded.

use crate::error::ExtractError;
use crate::mistral::MistralClient;
use crate::ocr::OcrEngine;
use crate::prompt;
use crate::schema::{self, ContactRecord, ParseMode};
use crate::storage::ContactStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Both outputs of a successful run, so the caller can display the raw OCR
/// text next to the structured record.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub ocr_text: String,
    pub contact: ContactRecord,
}

/// Pipeline orchestrator. Holds the long-lived collaborators; per-request
/// state stays on the stack of [`Extractor::run`].
pub struct Extractor {
    ocr: Arc<dyn OcrEngine>,
    llm: MistralClient,
    store: Arc<ContactStore>,
    parse_mode: ParseMode,
}

impl Extractor {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        llm: MistralClient,
        store: Arc<ContactStore>,
        parse_mode: ParseMode,
    ) -> Self {
        Self {
            ocr,
            llm,
            store,
            parse_mode,
        }
    }

    /// Run the full pipeline for one uploaded image.
    pub async fn run(&self, image_bytes: &[u8]) -> Result<ExtractionOutcome, ExtractError> {
        let started = Instant::now();

        if image_bytes.is_empty() {
            return Err(ExtractError::Decode("empty image upload".to_string()));
        }
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractError::Decode(e.to_string()))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "decoded image"
        );

        info!(engine = self.ocr.name(), "running OCR");
        let ocr_text = self.ocr.recognize(&image).await?;
        drop(image);
        if ocr_text.is_empty() {
            return Err(ExtractError::OcrEmpty);
        }
        debug!(chars = ocr_text.len(), preview = %preview(&ocr_text), "OCR text");

        info!("calling completion endpoint");
        let messages = prompt::build_messages(&ocr_text);
        let response = self.llm.complete(messages).await?;

        let content = response.first_content()?;
        let contact = schema::parse_contact(content, self.parse_mode)?;

        self.store.append(&contact)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extraction complete"
        );

        Ok(ExtractionOutcome { ocr_text, contact })
    }
}

/// First 100 characters, for log breadcrumbs.
fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
