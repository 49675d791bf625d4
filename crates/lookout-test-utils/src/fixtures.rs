// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for transport events used across tests.

use lookout_core::types::{
    AccountInfo, ConnectionPhase, ConnectionUpdate, ContactUpdate, Credentials, EphemeralEnvelope,
    ExtendedText, InboundEvent, LastDisconnect, MediaKind, MediaMessage, MediaRef, MessageContent,
    MessageKey, MessagesUpsert, TransportEvent, UpsertKind,
};

/// A status-broadcast event from `phone` carrying `content`.
pub fn status_event(phone: &str, id: &str, content: MessageContent) -> InboundEvent {
    InboundEvent {
        key: MessageKey {
            remote_jid: "status@broadcast".into(),
            participant: Some(format!("{phone}@s.whatsapp.net").as_str().into()),
            id: id.to_string(),
            from_me: false,
        },
        message: Some(content),
        push_name: None,
        message_timestamp: Some(1_760_000_000),
    }
}

pub fn text_status(phone: &str, id: &str, text: &str, push_name: Option<&str>) -> InboundEvent {
    let mut event = status_event(
        phone,
        id,
        MessageContent {
            conversation: Some(text.to_string()),
            ..Default::default()
        },
    );
    event.push_name = push_name.map(str::to_string);
    event
}

pub fn extended_text_status(phone: &str, id: &str, text: &str) -> InboundEvent {
    status_event(
        phone,
        id,
        MessageContent {
            extended_text_message: Some(ExtendedText {
                text: Some(text.to_string()),
            }),
            ..Default::default()
        },
    )
}

fn media_message(caption: Option<&str>, mimetype: &str) -> MediaMessage {
    let mut message = MediaMessage {
        caption: caption.map(str::to_string),
        mimetype: Some(mimetype.to_string()),
        ..Default::default()
    };
    message.extra.insert(
        "url".into(),
        serde_json::Value::from("https://mmg.whatsapp.net/v/t62/mock"),
    );
    message
        .extra
        .insert("mediaKey".into(), serde_json::Value::from("bW9jay1rZXk="));
    message
}

pub fn image_status(phone: &str, id: &str, caption: Option<&str>) -> InboundEvent {
    status_event(
        phone,
        id,
        MessageContent {
            image_message: Some(media_message(caption, "image/jpeg")),
            ..Default::default()
        },
    )
}

pub fn video_status(phone: &str, id: &str, caption: Option<&str>) -> InboundEvent {
    status_event(
        phone,
        id,
        MessageContent {
            video_message: Some(media_message(caption, "video/mp4")),
            ..Default::default()
        },
    )
}

pub fn audio_status(phone: &str, id: &str) -> InboundEvent {
    status_event(
        phone,
        id,
        MessageContent {
            audio_message: Some(media_message(None, "audio/ogg; codecs=opus")),
            ..Default::default()
        },
    )
}

pub fn document_status(phone: &str, id: &str, file_name: Option<&str>) -> InboundEvent {
    let mut message = media_message(None, "application/pdf");
    message.file_name = file_name.map(str::to_string);
    status_event(
        phone,
        id,
        MessageContent {
            document_message: Some(message),
            ..Default::default()
        },
    )
}

/// Wraps the event's content in one ephemeral envelope.
pub fn ephemeral(mut event: InboundEvent) -> InboundEvent {
    let inner = event.message.take();
    event.message = Some(MessageContent {
        ephemeral_message: Some(Box::new(EphemeralEnvelope { message: inner })),
        ..Default::default()
    });
    event
}

/// The image reference of an event built by [`image_status`].
pub fn media_ref(event: &InboundEvent) -> MediaRef {
    let message = event
        .message
        .as_ref()
        .and_then(|content| content.image_message.clone())
        .unwrap_or_default();
    MediaRef {
        key: event.key.clone(),
        kind: MediaKind::Photo,
        message,
    }
}

/// A live (`notify`) upsert.
pub fn upsert(messages: Vec<InboundEvent>) -> TransportEvent {
    TransportEvent::MessagesUpsert(MessagesUpsert {
        kind: UpsertKind::Notify,
        messages,
    })
}

/// A history (`append`) upsert.
pub fn history(messages: Vec<InboundEvent>) -> TransportEvent {
    TransportEvent::MessagesUpsert(MessagesUpsert {
        kind: UpsertKind::Append,
        messages,
    })
}

pub fn connection_open() -> TransportEvent {
    TransportEvent::ConnectionUpdate(ConnectionUpdate {
        connection: Some(ConnectionPhase::Open),
        me: Some(AccountInfo {
            id: "15550001111:4@s.whatsapp.net".into(),
            name: Some("Archive".into()),
        }),
        ..Default::default()
    })
}

pub fn connection_close(status_code: u16) -> TransportEvent {
    TransportEvent::ConnectionUpdate(ConnectionUpdate {
        connection: Some(ConnectionPhase::Close),
        last_disconnect: Some(LastDisconnect {
            status_code: Some(status_code),
            message: Some("mock disconnect".into()),
        }),
        ..Default::default()
    })
}

pub fn qr(code: &str) -> TransportEvent {
    TransportEvent::ConnectionUpdate(ConnectionUpdate {
        qr: Some(code.to_string()),
        ..Default::default()
    })
}

/// A `contacts.update` naming each `(jid, notify name)` pair.
pub fn contacts(entries: &[(&str, &str)]) -> TransportEvent {
    TransportEvent::ContactsUpdate(
        entries
            .iter()
            .map(|(id, name)| ContactUpdate {
                id: (*id).into(),
                notify: Some(name.to_string()),
                verified_name: None,
                name: None,
            })
            .collect(),
    )
}

pub fn creds_update(value: serde_json::Value) -> TransportEvent {
    TransportEvent::CredsUpdate(Credentials(value))
}
