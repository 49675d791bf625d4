// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as known log levels, URL schemes, and destination chat formats.

use crate::diagnostic::ConfigError;
use crate::model::{LookoutConfig, MAX_CAPTION_TEXT_LIMIT};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `relay.throttle_ms`.
const MAX_THROTTLE_MS: u64 = 60_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LookoutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let url = config.bridge.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("bridge.url `{url}` must start with http:// or https://"),
        });
    }

    if config.session.auth_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "session.auth_dir must not be empty".to_string(),
        });
    }

    if config.relay.throttle_ms > MAX_THROTTLE_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "relay.throttle_ms must be at most {MAX_THROTTLE_MS}, got {}",
                config.relay.throttle_ms
            ),
        });
    }

    let caption_limit = config.relay.caption_text_limit;
    if !(1..=MAX_CAPTION_TEXT_LIMIT).contains(&caption_limit) {
        errors.push(ConfigError::Validation {
            message: format!(
                "relay.caption_text_limit must be between 1 and {MAX_CAPTION_TEXT_LIMIT}, got {caption_limit}"
            ),
        });
    }

    if let Some(ref chat_id) = config.telegram.chat_id
        && !is_valid_chat_id(chat_id)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "telegram.chat_id `{chat_id}` must be a numeric chat id or an @channel username"
            ),
        });
    }

    if let Some(ref api_url) = config.telegram.api_url
        && !(api_url.starts_with("http://") || api_url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("telegram.api_url `{api_url}` must start with http:// or https://"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `-1001234567890`, `12345`, and `@channelname`.
fn is_valid_chat_id(chat_id: &str) -> bool {
    let chat_id = chat_id.trim();
    if let Some(username) = chat_id.strip_prefix('@') {
        return !username.is_empty()
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
    }
    chat_id.parse::<i64>().is_ok()
}
