// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination chat parsing.

use lookout_core::LookoutError;
use teloxide::types::{ChatId, Recipient};

/// Parses `-1001234567890`, `12345` or `@channel` into a [`Recipient`].
pub fn parse_recipient(chat_id: &str) -> Result<Recipient, LookoutError> {
    let chat_id = chat_id.trim();
    if chat_id.starts_with('@') {
        if chat_id.len() == 1 {
            return Err(LookoutError::Config(
                "telegram.chat_id `@` is missing a channel name".into(),
            ));
        }
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    chat_id
        .parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|e| LookoutError::Config(format!("invalid telegram.chat_id `{chat_id}`: {e}")))
}
