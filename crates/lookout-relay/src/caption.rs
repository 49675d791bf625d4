// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML formatting of relayed statuses.
//!
//! Messages are sent with Telegram's HTML parse mode, so every piece of
//! sender-controlled text (name, status text, caption) is escaped. Only
//! `&`, `<` and `>` are reserved in that mode.

use std::borrow::Cow;

use lookout_config::model::MAX_CAPTION_TEXT_LIMIT;
use lookout_core::types::ClassifiedStatus;

/// Limit for status text inside a plain text message. Telegram caps the
/// whole message at 4096 characters after entity parsing.
pub const MESSAGE_TEXT_LIMIT: usize = 4000;

/// Telegram's media caption limit, counted after entity parsing.
pub const CAPTION_LIMIT: usize = 1024;

/// Longest sender name shown in a header.
pub const SENDER_NAME_LIMIT: usize = 64;

const TEXT_PREFIX: &str = "\n\n📝 ";

/// Escapes the characters reserved by Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverses [`escape_html`].
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (ch, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        out.push(ch);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some(_) if max_chars == 0 => Cow::Borrowed(""),
        Some(_) => {
            let keep = text
                .char_indices()
                .nth(max_chars - 1)
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            Cow::Owned(format!("{}…", &text[..keep]))
        }
    }
}

/// Builds the HTML bodies sent for classified statuses.
#[derive(Debug, Clone, Copy)]
pub struct CaptionBuilder {
    caption_text_limit: usize,
}

impl CaptionBuilder {
    /// `caption_text_limit` bounds the status text inside media captions and
    /// is clamped to `1..=MAX_CAPTION_TEXT_LIMIT`.
    pub fn new(caption_text_limit: usize) -> Self {
        Self {
            caption_text_limit: caption_text_limit.clamp(1, MAX_CAPTION_TEXT_LIMIT),
        }
    }

    pub fn caption_text_limit(&self) -> usize {
        self.caption_text_limit
    }

    /// Body of a text message: sender header followed by the status text.
    pub fn text_message(&self, status: &ClassifiedStatus) -> String {
        let text = status.text.as_deref().unwrap_or_default();
        format!(
            "{}{TEXT_PREFIX}{}",
            header(status),
            escape_html(&truncate_chars(text, MESSAGE_TEXT_LIMIT))
        )
    }

    /// Caption of a media message: sender header, then the caption if any.
    ///
    /// The displayed caption never exceeds [`CAPTION_LIMIT`] characters; the
    /// status text gets whatever the header leaves, up to the configured limit.
    pub fn media_caption(&self, status: &ClassifiedStatus) -> String {
        let header = header(status);
        let Some(text) = status.text.as_deref().filter(|text| !text.is_empty()) else {
            return header;
        };
        let budget = CAPTION_LIMIT
            .saturating_sub(visible_header_len(status))
            .saturating_sub(TEXT_PREFIX.chars().count());
        let limit = self.caption_text_limit.min(budget);
        if limit == 0 {
            return header;
        }
        format!(
            "{header}{TEXT_PREFIX}{}",
            escape_html(&truncate_chars(text, limit))
        )
    }
}

/// Phone as a wa.me link plus the display name.
fn header(status: &ClassifiedStatus) -> String {
    let phone = &status.sender_phone;
    format!(
        "📱 <a href=\"https://wa.me/+{phone}\">{phone}</a>\n👤 {}",
        escape_html(&truncate_chars(&status.sender_name, SENDER_NAME_LIMIT))
    )
}

/// Characters of [`header`] Telegram displays once the markup is parsed.
fn visible_header_len(status: &ClassifiedStatus) -> usize {
    "📱 \n👤 ".chars().count()
        + status.sender_phone.chars().count()
        + truncate_chars(&status.sender_name, SENDER_NAME_LIMIT).chars().count()
}
