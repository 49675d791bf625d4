// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram delivery sink for the Lookout status relay.
//!
//! Implements [`DeliverySink`] over the Telegram Bot API via teloxide. Every
//! payload goes to the one configured chat with HTML parse mode: text via
//! `sendMessage`, media via `sendPhoto`, `sendVideo`, `sendAudio` or
//! `sendDocument` with an in-memory attachment.

pub mod recipient;

use async_trait::async_trait;
use lookout_config::model::TelegramConfig;
use lookout_core::error::LookoutError;
use lookout_core::traits::{DeliverySink, PluginAdapter};
use lookout_core::types::{AdapterType, ForwardPayload, HealthStatus, MediaKind, MessageId};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, Recipient};
use tracing::{debug, info};

pub use recipient::parse_recipient;

/// Telegram delivery sink implementing [`DeliverySink`].
pub struct TelegramSink {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramSink {
    /// Creates a sink for `config.chat_id`.
    ///
    /// Requires `config.bot_token` and `config.chat_id` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, LookoutError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            LookoutError::Config("telegram.bot_token is required for Telegram delivery".into())
        })?;
        if token.is_empty() {
            return Err(LookoutError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }
        let chat_id = config.chat_id.as_deref().ok_or_else(|| {
            LookoutError::Config("telegram.chat_id is required for Telegram delivery".into())
        })?;
        let recipient = parse_recipient(chat_id)?;

        let mut bot = Bot::new(token);
        if let Some(api_url) = config.api_url.as_deref() {
            let url = reqwest::Url::parse(api_url).map_err(|e| {
                LookoutError::Config(format!("invalid telegram.api_url `{api_url}`: {e}"))
            })?;
            bot = bot.set_api_url(url);
        }

        Ok(Self { bot, recipient })
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    /// The bot's `@username`, as reported by `getMe`.
    pub async fn bot_username(&self) -> Result<String, LookoutError> {
        let me = self.bot.get_me().await.map_err(|e| LookoutError::Delivery {
            message: format!("getMe failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(me.username().to_string())
    }
}

/// Bot API method used for a payload.
pub fn method_name(payload: &ForwardPayload) -> &'static str {
    match payload {
        ForwardPayload::Text { .. } => "sendMessage",
        ForwardPayload::Media { kind, .. } => match kind {
            MediaKind::Photo => "sendPhoto",
            MediaKind::Video => "sendVideo",
            MediaKind::Audio => "sendAudio",
            MediaKind::Document => "sendDocument",
        },
    }
}

#[async_trait]
impl PluginAdapter for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        debug!("Telegram sink shutting down");
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn deliver(&self, payload: ForwardPayload) -> Result<MessageId, LookoutError> {
        let method = method_name(&payload);
        let to = self.recipient.clone();

        let sent = match payload {
            ForwardPayload::Text { text } => {
                self.bot
                    .send_message(to, text)
                    .parse_mode(ParseMode::Html)
                    .await
            }
            ForwardPayload::Media {
                kind,
                caption,
                attachment,
            } => {
                let file = InputFile::memory(attachment.bytes).file_name(attachment.file_name);
                match kind {
                    MediaKind::Photo => {
                        self.bot
                            .send_photo(to, file)
                            .caption(caption)
                            .parse_mode(ParseMode::Html)
                            .await
                    }
                    MediaKind::Video => {
                        self.bot
                            .send_video(to, file)
                            .caption(caption)
                            .parse_mode(ParseMode::Html)
                            .await
                    }
                    MediaKind::Audio => {
                        self.bot
                            .send_audio(to, file)
                            .caption(caption)
                            .parse_mode(ParseMode::Html)
                            .await
                    }
                    MediaKind::Document => {
                        self.bot
                            .send_document(to, file)
                            .caption(caption)
                            .parse_mode(ParseMode::Html)
                            .await
                    }
                }
            }
        }
        .map_err(|e| LookoutError::Delivery {
            message: format!("{method} failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        info!(method, message_id = sent.id.0, "delivered to Telegram");
        Ok(MessageId(sent.id.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use lookout_core::types::Attachment;
    use wiremock::matchers::{body_string_contains, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TOKEN: &str = "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11";

    fn config(api_url: Option<String>) -> TelegramConfig {
        TelegramConfig {
            bot_token: Some(TOKEN.into()),
            chat_id: Some("-1001234567890".into()),
            api_url,
        }
    }

    fn sent_message() -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "result": {
                "message_id": 77,
                "date": 1700000000i64,
                "chat": {
                    "id": 12345i64,
                    "type": "private",
                    "first_name": "Test",
                },
                "text": "ok",
            }
        })
    }

    fn photo() -> ForwardPayload {
        ForwardPayload::Media {
            kind: MediaKind::Photo,
            caption: "📱 <a href=\"https://wa.me/+15551234567\">15551234567</a>".into(),
            attachment: Attachment {
                bytes: b"jpeg-bytes".to_vec(),
                file_name: "status.jpg".into(),
            },
        }
    }

    #[test]
    fn new_requires_bot_token() {
        let mut cfg = config(None);
        cfg.bot_token = None;
        assert!(TelegramSink::new(&cfg).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let mut cfg = config(None);
        cfg.bot_token = Some(String::new());
        assert!(TelegramSink::new(&cfg).is_err());
    }

    #[test]
    fn new_requires_chat_id() {
        let mut cfg = config(None);
        cfg.chat_id = None;
        assert!(TelegramSink::new(&cfg).is_err());
    }

    #[test]
    fn new_rejects_bad_api_url() {
        assert!(TelegramSink::new(&config(Some("not a url".into()))).is_err());
    }

    #[test]
    fn method_names_follow_kind() {
        assert_eq!(
            method_name(&ForwardPayload::Text { text: "x".into() }),
            "sendMessage"
        );
        assert_eq!(method_name(&photo()), "sendPhoto");
    }

    #[tokio::test]
    async fn text_is_sent_with_html_parse_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot.+/sendmessage$"))
            .and(body_string_contains("HTML"))
            .and(body_string_contains("Hello &lt;world&gt;"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message()))
            .expect(1)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&config(Some(server.uri()))).unwrap();
        let id = sink
            .deliver(ForwardPayload::Text {
                text: "📝 Hello &lt;world&gt;".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, MessageId("77".into()));
    }

    #[tokio::test]
    async fn photo_is_uploaded_with_file_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot.+/sendphoto$"))
            .and(body_string_contains("status.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message()))
            .expect(1)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&config(Some(server.uri()))).unwrap();
        sink.deliver(photo()).await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot.+/sendmessage$"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found",
            })))
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&config(Some(server.uri()))).unwrap();
        let err = sink
            .deliver(ForwardPayload::Text { text: "hi".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, LookoutError::Delivery { .. }));
        assert!(err.to_string().contains("sendMessage"));
    }

    #[tokio::test]
    async fn health_check_uses_get_me() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot.+/getme$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {
                    "id": 1,
                    "is_bot": true,
                    "first_name": "Lookout",
                    "username": "lookout_bot",
                    "can_join_groups": true,
                    "can_read_all_group_messages": false,
                    "supports_inline_queries": false,
                    "can_connect_to_business": false,
                    "has_main_web_app": false,
                }
            })))
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&config(Some(server.uri()))).unwrap();
        assert_eq!(sink.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(sink.bot_username().await.unwrap(), "lookout_bot");
    }

    #[tokio::test]
    async fn unreachable_bot_is_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized",
            })))
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&config(Some(server.uri()))).unwrap();
        assert!(matches!(
            sink.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
