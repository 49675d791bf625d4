// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status classification.
//!
//! Classification runs in two steps. [`normalize`] strips at most one
//! ephemeral envelope and yields a flat [`Payload`]; [`classify`] then matches
//! on that payload and resolves the sender's phone and display name.

use lookout_core::types::{
    ClassifiedStatus, InboundEvent, MediaKind, MediaMessage, MediaRef, MessageContent, StatusKind,
};
use strum::Display;

use crate::contacts::ContactDirectory;

/// Name used when neither the directory nor the event knows the sender.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Why an event was not classified as a relayable status.
///
/// Drops are routine and never treated as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DropReason {
    /// The event did not arrive on the status-broadcast channel.
    NotStatus,
    /// The account posted this status itself.
    FromMe,
    /// The event has no content payload.
    NoContent,
    /// An ephemeral envelope wraps another ephemeral envelope.
    NestedEphemeral,
    /// The content matches none of the known payload shapes.
    Unsupported,
}

/// Content after normalization: one flat variant per known shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Media {
        kind: MediaKind,
        message: &'a MediaMessage,
        text: Option<&'a str>,
    },
    Text(&'a str),
    Empty,
}

/// Unwraps exactly one ephemeral envelope and flattens the content.
pub fn normalize(content: &MessageContent) -> Result<Payload<'_>, DropReason> {
    let content = match content.ephemeral_message.as_deref() {
        Some(envelope) => {
            let inner = envelope.message.as_ref().ok_or(DropReason::NoContent)?;
            if inner.ephemeral_message.is_some() {
                return Err(DropReason::NestedEphemeral);
            }
            inner
        }
        None => content,
    };

    let text = status_text(content);
    let media = [
        (MediaKind::Photo, &content.image_message),
        (MediaKind::Video, &content.video_message),
        (MediaKind::Audio, &content.audio_message),
        (MediaKind::Document, &content.document_message),
    ]
    .into_iter()
    .find_map(|(kind, message)| message.as_ref().map(|message| (kind, message)));

    Ok(match (media, text) {
        (Some((kind, message)), text) => Payload::Media {
            kind,
            message,
            text,
        },
        (None, Some(text)) => Payload::Text(text),
        (None, None) => Payload::Empty,
    })
}

/// First non-empty of: conversation, extended text, image caption, video caption.
fn status_text(content: &MessageContent) -> Option<&str> {
    [
        content.conversation.as_deref(),
        content
            .extended_text_message
            .as_ref()
            .and_then(|ext| ext.text.as_deref()),
        content
            .image_message
            .as_ref()
            .and_then(|m| m.caption.as_deref()),
        content
            .video_message
            .as_ref()
            .and_then(|m| m.caption.as_deref()),
    ]
    .into_iter()
    .flatten()
    .find(|text| !text.is_empty())
}

/// Decides whether `event` is a relayable status and extracts what the
/// forwarder needs.
pub fn classify(
    event: &InboundEvent,
    contacts: &ContactDirectory,
) -> Result<ClassifiedStatus, DropReason> {
    let key = &event.key;
    if !key.remote_jid.is_status_broadcast() {
        return Err(DropReason::NotStatus);
    }
    if key.from_me {
        return Err(DropReason::FromMe);
    }
    let content = event.message.as_ref().ok_or(DropReason::NoContent)?;

    let (kind, text, media) = match normalize(content)? {
        Payload::Media {
            kind,
            message,
            text,
        } => (
            StatusKind::from(kind),
            text,
            Some(MediaRef {
                key: key.clone(),
                kind,
                message: message.clone(),
            }),
        ),
        Payload::Text(text) => (StatusKind::Text, Some(text), None),
        Payload::Empty => return Err(DropReason::Unsupported),
    };

    let sender = key.sender();
    let sender_name = contacts
        .lookup(&sender)
        .or_else(|| event.push_name.as_deref().filter(|name| !name.is_empty()))
        .unwrap_or(UNKNOWN_SENDER)
        .to_string();

    Ok(ClassifiedStatus {
        sender_phone: sender.phone(),
        sender_name,
        message_id: key.id.clone(),
        text: text.map(str::to_string),
        kind,
        media,
    })
}

#[cfg(test)]
mod tests {
    use lookout_core::types::{
        ContactUpdate, EphemeralEnvelope, ExtendedText, Jid, MessageKey,
    };

    use super::*;

    const SENDER: &str = "15551234567@s.whatsapp.net";

    fn status_event(content: MessageContent) -> InboundEvent {
        InboundEvent {
            key: MessageKey {
                remote_jid: "status@broadcast".into(),
                participant: Some(SENDER.into()),
                id: "3EB0A1".into(),
                from_me: false,
            },
            message: Some(content),
            push_name: Some("Alex".into()),
            message_timestamp: Some(1_760_000_000),
        }
    }

    fn media(caption: Option<&str>) -> Option<MediaMessage> {
        Some(MediaMessage {
            caption: caption.map(Into::into),
            ..Default::default()
        })
    }

    fn ephemeral(inner: MessageContent) -> MessageContent {
        MessageContent {
            ephemeral_message: Some(Box::new(EphemeralEnvelope {
                message: Some(inner),
            })),
            ..Default::default()
        }
    }

    fn shapes() -> Vec<(MessageContent, StatusKind, Option<&'static str>)> {
        vec![
            (
                MessageContent {
                    conversation: Some("plain".into()),
                    ..Default::default()
                },
                StatusKind::Text,
                Some("plain"),
            ),
            (
                MessageContent {
                    extended_text_message: Some(ExtendedText {
                        text: Some("link https://example.com".into()),
                    }),
                    ..Default::default()
                },
                StatusKind::Text,
                Some("link https://example.com"),
            ),
            (
                MessageContent {
                    image_message: media(Some("sunset")),
                    ..Default::default()
                },
                StatusKind::Photo,
                Some("sunset"),
            ),
            (
                MessageContent {
                    video_message: media(Some("clip")),
                    ..Default::default()
                },
                StatusKind::Video,
                Some("clip"),
            ),
            (
                MessageContent {
                    audio_message: media(None),
                    ..Default::default()
                },
                StatusKind::Audio,
                None,
            ),
            (
                MessageContent {
                    document_message: media(None),
                    ..Default::default()
                },
                StatusKind::Document,
                None,
            ),
        ]
    }

    #[test]
    fn every_shape_classifies_bare_and_wrapped_once() {
        let contacts = ContactDirectory::new();
        for (content, kind, text) in shapes() {
            for content in [content.clone(), ephemeral(content)] {
                let status = classify(&status_event(content.clone()), &contacts)
                    .unwrap_or_else(|reason| panic!("{content:?} dropped: {reason}"));
                assert_eq!(status.kind, kind);
                assert_eq!(status.text.as_deref(), text);
                assert_eq!(status.media.is_some(), kind != StatusKind::Text);
            }
        }
    }

    #[test]
    fn media_ref_carries_kind_and_descriptors() {
        let mut image = MediaMessage::default();
        image
            .extra
            .insert("mediaKey".into(), serde_json::Value::from("a2V5"));
        let content = MessageContent {
            image_message: Some(image),
            ..Default::default()
        };
        let status = classify(&status_event(content), &ContactDirectory::new()).unwrap();
        let media = status.media.unwrap();
        assert_eq!(media.kind, MediaKind::Photo);
        assert_eq!(media.key.id, "3EB0A1");
        assert_eq!(media.message.extra["mediaKey"], "a2V5");
    }

    #[test]
    fn non_status_channel_is_never_classified() {
        for (content, _, _) in shapes() {
            let mut event = status_event(content);
            event.key.remote_jid = Jid::from(SENDER);
            assert_eq!(
                classify(&event, &ContactDirectory::new()),
                Err(DropReason::NotStatus)
            );
        }
    }

    #[test]
    fn own_status_is_dropped() {
        let mut event = status_event(MessageContent {
            conversation: Some("mine".into()),
            ..Default::default()
        });
        event.key.from_me = true;
        assert_eq!(
            classify(&event, &ContactDirectory::new()),
            Err(DropReason::FromMe)
        );
    }

    #[test]
    fn missing_content_is_dropped() {
        let mut event = status_event(MessageContent::default());
        event.message = None;
        assert_eq!(
            classify(&event, &ContactDirectory::new()),
            Err(DropReason::NoContent)
        );
    }

    #[test]
    fn unknown_shape_is_unsupported() {
        let event = status_event(MessageContent::default());
        assert_eq!(
            classify(&event, &ContactDirectory::new()),
            Err(DropReason::Unsupported)
        );
    }

    #[test]
    fn nested_ephemeral_is_rejected() {
        let inner = MessageContent {
            conversation: Some("deep".into()),
            ..Default::default()
        };
        let event = status_event(ephemeral(ephemeral(inner)));
        assert_eq!(
            classify(&event, &ContactDirectory::new()),
            Err(DropReason::NestedEphemeral)
        );
    }

    #[test]
    fn conversation_beats_caption() {
        let content = MessageContent {
            conversation: Some("words".into()),
            image_message: media(Some("caption")),
            ..Default::default()
        };
        let status = classify(&status_event(content), &ContactDirectory::new()).unwrap();
        assert_eq!(status.kind, StatusKind::Photo);
        assert_eq!(status.text.as_deref(), Some("words"));
    }

    #[test]
    fn empty_caption_counts_as_absent() {
        let content = MessageContent {
            image_message: media(Some("")),
            ..Default::default()
        };
        let status = classify(&status_event(content), &ContactDirectory::new()).unwrap();
        assert_eq!(status.text, None);
    }

    #[test]
    fn name_resolution_precedence() {
        let content = MessageContent {
            conversation: Some("hi".into()),
            ..Default::default()
        };

        let mut contacts = ContactDirectory::new();
        contacts.update(&[ContactUpdate {
            id: SENDER.into(),
            notify: Some("Alexandra".into()),
            verified_name: None,
            name: None,
        }]);
        let status = classify(&status_event(content.clone()), &contacts).unwrap();
        assert_eq!(status.sender_name, "Alexandra");

        let status = classify(&status_event(content.clone()), &ContactDirectory::new()).unwrap();
        assert_eq!(status.sender_name, "Alex");

        let mut event = status_event(content);
        event.push_name = None;
        let status = classify(&event, &ContactDirectory::new()).unwrap();
        assert_eq!(status.sender_name, UNKNOWN_SENDER);
    }

    #[test]
    fn phone_falls_back_to_channel_local_part() {
        let mut event = status_event(MessageContent {
            conversation: Some("hi".into()),
            ..Default::default()
        });
        event.key.participant = None;
        event.key.remote_jid = "15557654321:4@status@broadcast".into();
        let status = classify(&event, &ContactDirectory::new()).unwrap();
        assert_eq!(status.sender_phone, "15557654321");
        assert_eq!(status.dedup_key(), "15557654321_3EB0A1");
    }

    #[test]
    fn participant_device_suffix_is_ignored() {
        let mut event = status_event(MessageContent {
            conversation: Some("hi".into()),
            ..Default::default()
        });
        event.key.participant = Some("15551234567:9@s.whatsapp.net".into());
        let status = classify(&event, &ContactDirectory::new()).unwrap();
        assert_eq!(status.sender_phone, "15551234567");
    }
}
