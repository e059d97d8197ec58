//! Prompt construction for the field-extraction completion call.
//!
//! Pure and deterministic: the same OCR text always renders the same two
//! messages. The OCR text is untrusted, so it is framed between `"""`
//! delimiters rather than interpolated bare; braces or quotes on a card
//! cannot break out of the instruction.

use crate::mistral::Message;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts structured contact data from unstructured text.";

/// Render the system + user message pair for one OCR text.
pub fn build_messages(ocr_text: &str) -> Vec<Message> {
    let user_prompt = format!(
        r#"Extract the following fields from this business card:
- Name
- Job Title
- Company
- Email
- Phone
- Website
- Address

Return only the structured data as a JSON object with exactly these keys:
name, title, company, email, phone, website, address.
Use null for any field the card does not show. Do not include any
explanation, code fences, or surrounding text. Return valid JSON only.

OCR Extracted Text:
"""
{}
"""
"#,
        ocr_text
    );

    vec![Message::system(SYSTEM_PROMPT), Message::user(user_prompt)]
}
