// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire format spoken with the WhatsApp Web bridge.
//!
//! The event stream carries JSON text frames. A frame holds either one
//! event object `{"type": ..., "payload": ...}` or an array of them; either
//! way it is delivered to the relay as one batch. Event types the relay does
//! not know (presence, receipts, chats) are skipped.

use lookout_core::types::{Credentials, MediaKind, MediaRef, MessageKey, PresenceState, TransportEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Event types decoded into [`TransportEvent`].
const KNOWN_EVENTS: &[&str] = &[
    "creds.update",
    "connection.update",
    "contacts.update",
    "messages.upsert",
];

/// Frames sent from this process to the bridge over the event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame<'a> {
    /// First frame after connecting. `creds` is `null` for a fresh pairing.
    Auth {
        creds: Option<&'a Credentials>,
        device_name: &'a str,
        mark_online_on_connect: bool,
    },
}

/// Body of `POST /media/download`.
#[derive(Debug, Serialize)]
pub struct MediaDownloadRequest<'a> {
    pub key: &'a MessageKey,
    /// The message content holding only the media sub-message.
    pub message: Value,
    /// Never acknowledge the download as a view.
    pub silent: bool,
}

impl<'a> MediaDownloadRequest<'a> {
    pub fn new(media: &'a MediaRef) -> Result<Self, serde_json::Error> {
        let field = match media.kind {
            MediaKind::Photo => "imageMessage",
            MediaKind::Video => "videoMessage",
            MediaKind::Audio => "audioMessage",
            MediaKind::Document => "documentMessage",
        };
        let mut message = serde_json::Map::new();
        message.insert(field.to_string(), serde_json::to_value(&media.message)?);
        Ok(Self {
            key: &media.key,
            message: Value::Object(message),
            silent: true,
        })
    }
}

/// Body of `POST /presence`.
#[derive(Debug, Serialize)]
pub struct PresenceRequest {
    pub state: PresenceState,
}

/// Body of `POST /receipts`.
#[derive(Debug, Serialize)]
pub struct ReceiptsRequest<'a> {
    pub keys: &'a [MessageKey],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Frame {
    Many(Vec<Value>),
    One(Value),
}

/// Decodes one text frame into a batch.
///
/// Returns an error only when the frame is not JSON at all.
pub fn decode_frame(text: &str) -> Result<Vec<TransportEvent>, serde_json::Error> {
    let values = match serde_json::from_str::<Frame>(text)? {
        Frame::Many(values) => values,
        Frame::One(value) => vec![value],
    };
    Ok(values.into_iter().filter_map(decode_event).collect())
}

fn decode_event(value: Value) -> Option<TransportEvent> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !KNOWN_EVENTS.contains(&kind.as_str()) {
        debug!(kind = %kind, "skipping unhandled bridge event");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(kind = %kind, error = %e, "malformed bridge event");
            None
        }
    }
}

/// `http(s)://host/base` to `ws(s)://host/base/events`.
pub fn events_url(base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return None;
    };
    Some(format!("{ws}/events"))
}
