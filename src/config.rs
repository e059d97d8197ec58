//! Process configuration, read from the environment exactly once at startup.
//!
//! Nothing outside this module touches `std::env` for business settings; the
//! resulting [`AppConfig`] is passed into the OCR engine, the LLM client, and
//! the store by value at construction time.

use crate::error::ExtractError;
use crate::schema::ParseMode;
use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "https://api.mistral.ai";
const DEFAULT_MODEL: &str = "mistral-tiny";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CSV_PATH: &str = "results/contacts.csv";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// All runtime settings for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the chat-completion API (no trailing slash).
    pub api_url: String,
    /// Bearer credential for the completion API. Required.
    pub api_key: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Sampling temperature. Kept low to bias toward schema-conformant JSON.
    pub temperature: f32,
    /// Timeout applied to each completion call.
    pub timeout_secs: u64,
    /// How strictly the model's reply is decoded.
    pub parse_mode: ParseMode,
    /// Location of the tesseract binary.
    pub tesseract_cmd: String,
    /// Language pack passed to tesseract via `-l`.
    pub tesseract_lang: String,
    /// Path of the contact CSV table.
    pub csv_path: PathBuf,
    /// Socket address the server binds to.
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails fast with [`ExtractError::AuthConfig`] when `MISTRAL_API_KEY`
    /// is absent; the service must not accept traffic without a credential.
    pub fn from_env() -> Result<Self, ExtractError> {
        let api_key = env::var("MISTRAL_API_KEY").map_err(|_| ExtractError::AuthConfig {
            var: "MISTRAL_API_KEY",
        })?;

        Ok(Self {
            api_url: var_or("MISTRAL_API_URL", DEFAULT_API_URL),
            api_key,
            model: var_or("LLM_MODEL", DEFAULT_MODEL),
            temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TEMPERATURE),
            timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            parse_mode: env::var("LLM_PARSE_MODE")
                .ok()
                .and_then(|v| ParseMode::from_str(&v))
                .unwrap_or(ParseMode::Lenient),
            tesseract_cmd: var_or("TESSERACT_CMD", "tesseract"),
            tesseract_lang: var_or("TESSERACT_LANG", "eng"),
            csv_path: PathBuf::from(var_or("CSV_PATH", DEFAULT_CSV_PATH)),
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
