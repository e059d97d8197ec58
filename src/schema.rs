//! Contact record schema and completion-reply parsing.
//!
//! The model is asked for a bare JSON object with seven keys. Replies are
//! decoded under an explicit [`ParseMode`]: `Strict` takes the content as-is,
//! `Lenient` first digs a JSON object out of code fences or surrounding
//! prose (models ignore the no-fences instruction often enough to need a
//! fallback).

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The seven columns of the contact table, in persisted order.
pub const FIELDS: [&str; 7] = [
    "name", "title", "company", "email", "phone", "website", "address",
];

/// One extracted business-card contact. Fields the card lacks stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

/// How strictly the completion content is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Content must itself be a bare JSON object.
    Strict,
    /// Locate a JSON object inside fences or free text before decoding.
    Lenient,
}

impl ParseMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

/// Decode and validate one completion content string into a record.
///
/// Absent keys become `None`; a present key whose value is neither a string
/// nor null fails validation. Keys outside the schema are dropped.
pub fn parse_contact(content: &str, mode: ParseMode) -> Result<ContactRecord, ExtractError> {
    let json_str = match mode {
        ParseMode::Strict => content.trim(),
        ParseMode::Lenient => extract_json_object(content).unwrap_or_else(|| content.trim()),
    };

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractError::SchemaParse(format!("{}: {}", e, preview(json_str))))?;

    let object = value
        .as_object()
        .ok_or_else(|| ExtractError::SchemaParse("content is not a JSON object".to_string()))?;

    let field = |key: &str| -> Result<Option<String>, ExtractError> {
        match object.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ExtractError::SchemaValidation(format!(
                "field '{}' is not a string or null: {}",
                key, other
            ))),
        }
    };

    Ok(ContactRecord {
        name: field("name")?,
        title: field("title")?,
        company: field("company")?,
        email: field("email")?,
        phone: field("phone")?,
        website: field("website")?,
        address: field("address")?,
    })
}

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Find a decodable JSON object inside fenced or free text.
///
/// Prefers a fenced block, then the span from the first `{` to the last `}`.
/// Returns `None` when no object-looking span exists; the caller falls back
/// to the raw content and lets the JSON parser produce the error.
fn extract_json_object(content: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON.captures(content) {
        return caps.get(1).map(|m| m.as_str());
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| content[start..=end].trim())
}

fn preview(s: &str) -> String {
    s.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CARD: &str = r#"{"name":"Jane Doe","title":"CEO","company":"Acme","email":"jane@acme.com","phone":"555-1234","website":"acme.com","address":"1 Main St"}"#;

    #[test]
    fn full_record_round_trip() {
        let record = parse_contact(FULL_CARD, ParseMode::Strict).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.title.as_deref(), Some("CEO"));
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(record.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(record.phone.as_deref(), Some("555-1234"));
        assert_eq!(record.website.as_deref(), Some("acme.com"));
        assert_eq!(record.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn missing_fields_become_none() {
        let record = parse_contact(r#"{"name":"Jane Doe"}"#, ParseMode::Strict).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.title, None);
        assert_eq!(record.company, None);
        assert_eq!(record.address, None);
    }

    #[test]
    fn explicit_nulls_become_none() {
        let record = parse_contact(r#"{"name":"Jane","phone":null}"#, ParseMode::Strict).unwrap();
        assert_eq!(record.phone, None);
    }

    #[test]
    fn extra_keys_are_dropped() {
        let content = r#"{"name":"Jane","fax":"555-9999","confidence":"high"}"#;
        let record = parse_contact(content, ParseMode::Strict).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane"));
        // Nothing else survives; the record has exactly the seven slots.
        assert_eq!(
            serde_json::to_value(&record)
                .unwrap()
                .as_object()
                .unwrap()
                .len(),
            7
        );
    }

    #[test]
    fn non_string_field_fails_validation() {
        let result = parse_contact(r#"{"name":"Jane","phone":5551234}"#, ParseMode::Strict);
        assert!(matches!(result, Err(ExtractError::SchemaValidation(_))));
    }

    #[test]
    fn array_content_is_a_parse_error() {
        let result = parse_contact(r#"[{"name":"Jane"}]"#, ParseMode::Strict);
        assert!(matches!(result, Err(ExtractError::SchemaParse(_))));
    }

    #[test]
    fn strict_rejects_prose_wrapped_json() {
        let content = r#"Sure! Here's the data: {"name":"Jane Doe"}"#;
        let result = parse_contact(content, ParseMode::Strict);
        assert!(matches!(result, Err(ExtractError::SchemaParse(_))));
    }

    #[test]
    fn lenient_extracts_prose_wrapped_json() {
        let content = r#"Sure! Here's the data: {"name":"Jane Doe"}"#;
        let record = parse_contact(content, ParseMode::Lenient).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn lenient_strips_json_fences() {
        let content = "```json\n{\"name\":\"Jane Doe\"}\n```";
        let record = parse_contact(content, ParseMode::Lenient).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn lenient_strips_bare_fences() {
        let content = "```\n{\"name\":\"Jane Doe\"}\n```";
        let record = parse_contact(content, ParseMode::Lenient).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn lenient_with_no_object_at_all_is_a_parse_error() {
        let result = parse_contact("I could not read the card, sorry.", ParseMode::Lenient);
        assert!(matches!(result, Err(ExtractError::SchemaParse(_))));
    }

    #[test]
    fn parse_mode_from_str() {
        assert_eq!(ParseMode::from_str("strict"), Some(ParseMode::Strict));
        assert_eq!(ParseMode::from_str("lenient"), Some(ParseMode::Lenient));
        assert_eq!(ParseMode::from_str("fuzzy"), None);
    }
}
