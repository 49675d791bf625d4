// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the transport, the relay pipeline, and the delivery sink.
//!
//! The inbound types mirror the JSON emitted by the WhatsApp Web bridge
//! (camelCase field names, one level of optional sub-messages). Unknown
//! fields are ignored so newer bridge versions do not break decoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Channel marker that identifies status broadcasts.
pub const STATUS_BROADCAST: &str = "status@broadcast";

/// Unique identifier for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// A chat network address such as `15551234567@s.whatsapp.net`.
///
/// The local part may carry a device suffix (`15551234567:12@s.whatsapp.net`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jid(pub String);

impl Jid {
    pub fn new(jid: impl Into<String>) -> Self {
        Self(jid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address denotes the status-broadcast channel.
    pub fn is_status_broadcast(&self) -> bool {
        self.0.ends_with(STATUS_BROADCAST)
    }

    /// The local part, before `@`.
    pub fn user(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// The server part, after `@`.
    pub fn server(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, server)| server)
    }

    /// The same address with any device suffix removed.
    pub fn without_device(&self) -> Jid {
        let user = self.user().split(':').next().unwrap_or_default();
        match self.server() {
            Some(server) => Jid(format!("{user}@{server}")),
            None => Jid(user.to_string()),
        }
    }

    /// Digits of the local part, ignoring the device suffix.
    pub fn phone(&self) -> String {
        self.user()
            .split(':')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Jid {
    fn from(value: &str) -> Self {
        Jid(value.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the relay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Sink,
    SessionStore,
}

// --- Inbound (transport) types ---

/// Addressing information for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    /// The chat the message arrived in (`status@broadcast` for statuses).
    pub remote_jid: Jid,
    /// The actual author, present for broadcast and group messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<Jid>,
    /// Message identifier, unique per sender.
    pub id: String,
    /// Whether the account itself sent this message.
    #[serde(default)]
    pub from_me: bool,
}

impl MessageKey {
    /// The sender's address: the participant if present, else the chat
    /// address without its device suffix.
    pub fn sender(&self) -> Jid {
        match &self.participant {
            Some(participant) => participant.clone(),
            None => self.remote_jid.without_device(),
        }
    }
}

/// One raw message notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub key: MessageKey,
    /// Message content; absent for protocol stubs and revoked messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageContent>,
    /// Display name the sender attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp: Option<i64>,
}

/// Content payload of a message, one optional field per known shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_message: Option<Box<EphemeralEnvelope>>,
}

/// Text with link previews or formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Disappearing-message wrapper around another message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemeralEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageContent>,
}

/// An image, video, audio, or document sub-message.
///
/// Download descriptors (url, media key, hashes) are kept verbatim in
/// `extra` and handed back to the transport when fetching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Whether an upsert batch carries live notifications or history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpsertKind {
    Notify,
    Append,
    #[serde(other)]
    Other,
}

/// A batch of new messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesUpsert {
    #[serde(rename = "type")]
    pub kind: UpsertKind,
    pub messages: Vec<InboundEvent>,
}

/// A directory entry update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub id: Jid,
    /// Name the contact set for themselves.
    #[serde(default)]
    pub notify: Option<String>,
    /// Verified business name.
    #[serde(default, alias = "vname")]
    pub verified_name: Option<String>,
    /// Name saved in the account's address book.
    #[serde(default)]
    pub name: Option<String>,
}

/// Connection phase reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionPhase {
    Connecting,
    Open,
    Close,
}

/// Why the connection closed, derived from the disconnect status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DisconnectReason {
    LoggedOut,
    ConnectionLost,
    ConnectionClosed,
    ConnectionReplaced,
    MultideviceMismatch,
    Forbidden,
    BadSession,
    UnavailableService,
    RestartRequired,
    Unknown,
}

impl DisconnectReason {
    /// Maps a disconnect status code to a reason.
    pub fn from_status_code(code: Option<u16>) -> Self {
        match code {
            Some(401) => DisconnectReason::LoggedOut,
            Some(403) => DisconnectReason::Forbidden,
            Some(408) => DisconnectReason::ConnectionLost,
            Some(411) => DisconnectReason::MultideviceMismatch,
            Some(428) => DisconnectReason::ConnectionClosed,
            Some(440) => DisconnectReason::ConnectionReplaced,
            Some(500) => DisconnectReason::BadSession,
            Some(503) => DisconnectReason::UnavailableService,
            Some(515) => DisconnectReason::RestartRequired,
            _ => DisconnectReason::Unknown,
        }
    }

    /// The status code that produces this reason.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DisconnectReason::LoggedOut => Some(401),
            DisconnectReason::Forbidden => Some(403),
            DisconnectReason::ConnectionLost => Some(408),
            DisconnectReason::MultideviceMismatch => Some(411),
            DisconnectReason::ConnectionClosed => Some(428),
            DisconnectReason::ConnectionReplaced => Some(440),
            DisconnectReason::BadSession => Some(500),
            DisconnectReason::UnavailableService => Some(503),
            DisconnectReason::RestartRequired => Some(515),
            DisconnectReason::Unknown => None,
        }
    }
}

/// Details of the most recent disconnect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LastDisconnect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LastDisconnect {
    pub fn reason(&self) -> DisconnectReason {
        DisconnectReason::from_status_code(self.status_code)
    }
}

/// The account the session is logged in as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: Jid,
    #[serde(default)]
    pub name: Option<String>,
}

/// A change in connection state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionPhase>,
    /// Pairing code to render when the session is not yet linked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_disconnect: Option<LastDisconnect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me: Option<AccountInfo>,
}

/// Opaque session credentials owned by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(pub serde_json::Value);

/// One event from the transport's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TransportEvent {
    #[serde(rename = "creds.update")]
    CredsUpdate(Credentials),
    #[serde(rename = "connection.update")]
    ConnectionUpdate(ConnectionUpdate),
    #[serde(rename = "contacts.update")]
    ContactsUpdate(Vec<ContactUpdate>),
    #[serde(rename = "messages.upsert")]
    MessagesUpsert(MessagesUpsert),
}

/// Outgoing presence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceState {
    Available,
    Unavailable,
}

// --- Classification and outbound types ---

/// The media kinds that can be relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// File extension used for the synthetic attachment name.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "ogg",
            MediaKind::Document => "dat",
        }
    }
}

/// Payload kind of a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusKind {
    Text,
    Photo,
    Video,
    Audio,
    Document,
    Unsupported,
}

impl From<MediaKind> for StatusKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Photo => StatusKind::Photo,
            MediaKind::Video => StatusKind::Video,
            MediaKind::Audio => StatusKind::Audio,
            MediaKind::Document => StatusKind::Document,
        }
    }
}

/// Handle the transport needs to download one media attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub key: MessageKey,
    pub kind: MediaKind,
    pub message: MediaMessage,
}

/// A status update that passed classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedStatus {
    /// Digits-only phone number of the author.
    pub sender_phone: String,
    /// Resolved display name, `"Unknown"` when nothing is known.
    pub sender_name: String,
    /// Message identifier from the event key.
    pub message_id: String,
    /// Status text or media caption.
    pub text: Option<String>,
    pub kind: StatusKind,
    /// Present iff `kind` is a media kind.
    pub media: Option<MediaRef>,
}

impl ClassifiedStatus {
    /// Key used to recognise redeliveries of the same status.
    pub fn dedup_key(&self) -> String {
        format!("{}_{}", self.sender_phone, self.message_id)
    }
}

/// A binary attachment for a media payload.
#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A message ready for the delivery sink. Captions are HTML.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardPayload {
    Text {
        text: String,
    },
    Media {
        kind: MediaKind,
        caption: String,
        attachment: Attachment,
    },
}

impl ForwardPayload {
    pub fn caption(&self) -> &str {
        match self {
            ForwardPayload::Text { text } => text,
            ForwardPayload::Media { caption, .. } => caption,
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            ForwardPayload::Text { .. } => StatusKind::Text,
            ForwardPayload::Media { kind, .. } => (*kind).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jid_phone_strips_device_suffix() {
        let jid = Jid::from("15551234567:12@s.whatsapp.net");
        assert_eq!(jid.phone(), "15551234567");
        assert_eq!(jid.without_device().as_str(), "15551234567@s.whatsapp.net");
    }

    #[test]
    fn jid_status_broadcast_suffix() {
        assert!(Jid::from("status@broadcast").is_status_broadcast());
        assert!(!Jid::from("15551234567@s.whatsapp.net").is_status_broadcast());
        assert!(!Jid::from("12345@broadcast").is_status_broadcast());
    }

    #[test]
    fn message_key_sender_prefers_participant() {
        let key = MessageKey {
            remote_jid: "status@broadcast".into(),
            participant: Some("15551234567@s.whatsapp.net".into()),
            id: "ABC".into(),
            from_me: false,
        };
        assert_eq!(key.sender().as_str(), "15551234567@s.whatsapp.net");
    }

    #[test]
    fn disconnect_reason_codes() {
        assert_eq!(
            DisconnectReason::from_status_code(Some(401)),
            DisconnectReason::LoggedOut
        );
        assert_eq!(
            DisconnectReason::from_status_code(Some(515)),
            DisconnectReason::RestartRequired
        );
        assert_eq!(
            DisconnectReason::from_status_code(None),
            DisconnectReason::Unknown
        );
        assert_eq!(DisconnectReason::LoggedOut.status_code(), Some(401));
    }

    #[test]
    fn transport_event_decodes_upsert() {
        let json = serde_json::json!({
            "type": "messages.upsert",
            "payload": {
                "type": "notify",
                "messages": [{
                    "key": {
                        "remoteJid": "status@broadcast",
                        "participant": "15551234567@s.whatsapp.net",
                        "id": "3EB0C0FFEE"
                    },
                    "pushName": "Alex",
                    "message": {
                        "imageMessage": {
                            "caption": "sunset",
                            "mimetype": "image/jpeg",
                            "url": "https://mmg.whatsapp.net/x",
                            "mediaKey": "a2V5"
                        }
                    }
                }]
            }
        });

        let event: TransportEvent = serde_json::from_value(json).unwrap();
        let TransportEvent::MessagesUpsert(upsert) = event else {
            panic!("expected messages.upsert");
        };
        assert_eq!(upsert.kind, UpsertKind::Notify);
        let msg = &upsert.messages[0];
        assert_eq!(msg.push_name.as_deref(), Some("Alex"));
        let image = msg.message.as_ref().unwrap().image_message.as_ref().unwrap();
        assert_eq!(image.caption.as_deref(), Some("sunset"));
        assert_eq!(image.extra["mediaKey"], "a2V5");
    }

    #[test]
    fn transport_event_decodes_contacts_with_vname_alias() {
        let json = serde_json::json!({
            "type": "contacts.update",
            "payload": [{"id": "1555@s.whatsapp.net", "vname": "Acme Ltd"}]
        });
        let event: TransportEvent = serde_json::from_value(json).unwrap();
        match event {
            TransportEvent::ContactsUpdate(updates) => {
                assert_eq!(updates[0].verified_name.as_deref(), Some("Acme Ltd"));
                assert!(updates[0].notify.is_none());
            }
            other => panic!("expected contacts.update, got {other:?}"),
        }
    }

    #[test]
    fn unknown_upsert_kind_is_other() {
        let upsert: MessagesUpsert =
            serde_json::from_value(serde_json::json!({"type": "prepend", "messages": []}))
                .unwrap();
        assert_eq!(upsert.kind, UpsertKind::Other);
    }

    #[test]
    fn attachment_debug_hides_bytes() {
        let attachment = Attachment {
            bytes: vec![0u8; 2048],
            file_name: "status.jpg".into(),
        };
        let rendered = format!("{attachment:?}");
        assert!(rendered.contains("2048"));
        assert!(rendered.contains("status.jpg"));
    }
}
