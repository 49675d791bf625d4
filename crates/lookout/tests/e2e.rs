// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: scripted transport events through the relay into the
//! real Telegram sink (against a mock Bot API) with credentials on disk.

use std::sync::Arc;

use lookout_config::model::TelegramConfig;
use lookout_core::SessionStore;
use lookout_relay::{RelaySettings, StatusRelay};
use lookout_telegram::TelegramSink;
use lookout_test_utils::fixtures::{
    connection_open, contacts, creds_update, image_status, text_status, upsert,
};
use lookout_test_utils::MockTransport;
use lookout_whatsapp::FileSessionStore;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sent_message(id: i64) -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "result": {
            "message_id": id,
            "date": 1700000000i64,
            "chat": {"id": -1001234567890i64, "type": "channel", "title": "Archive"},
        }
    })
}

fn sink(server: &MockServer) -> Arc<TelegramSink> {
    let config = TelegramConfig {
        bot_token: Some("123456:ABC-DEF".into()),
        chat_id: Some("-1001234567890".into()),
        api_url: Some(server.uri()),
    };
    Arc::new(TelegramSink::new(&config).unwrap())
}

fn settings() -> RelaySettings {
    RelaySettings {
        throttle: std::time::Duration::ZERO,
        ..RelaySettings::default()
    }
}

#[tokio::test]
async fn statuses_reach_telegram_and_credentials_reach_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot.+/sendmessage$"))
        .and(body_string_contains("Sam"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot.+/sendphoto$"))
        .and(body_string_contains("status.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(2)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSessionStore::new(dir.path()));
    let transport = Arc::new(MockTransport::new());
    transport.set_media("I1", b"jpeg-bytes".to_vec()).await;

    transport
        .push_batch(vec![
            creds_update(serde_json::json!({"me": {"id": "15550001111@s.whatsapp.net"}})),
            connection_open(),
            contacts(&[("15551234567@s.whatsapp.net", "Sam")]),
        ])
        .await;
    transport
        .push_batch(vec![upsert(vec![
            text_status("15551234567", "T1", "Good morning", None),
            image_status("15551234567", "I1", Some("sunrise")),
            text_status("15551234567", "T1", "Good morning", None),
        ])])
        .await;
    transport.close();

    let mut relay = StatusRelay::new(
        transport.clone(),
        sink(&server),
        store.clone(),
        settings(),
        false,
    );
    assert!(relay.run(CancellationToken::new()).await.is_err());

    assert_eq!(relay.dedup().len(), 2);
    assert_eq!(transport.fetch_count().await, 1);
    assert!(store.load().await.unwrap().is_some());
    assert!(store.credentials_path().exists());
}

#[tokio::test]
async fn telegram_rejection_does_not_stop_the_relay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot.+/sendmessage$"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found",
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(MockTransport::new());
    transport
        .push_batch(vec![upsert(vec![
            text_status("15551234567", "A", "one", Some("Sam")),
            text_status("15557654321", "B", "two", Some("Kai")),
        ])])
        .await;

    transport.close();

    let mut relay = StatusRelay::new(
        transport.clone(),
        sink(&server),
        Arc::new(FileSessionStore::new(dir.path())),
        settings(),
        true,
    );

    // Ends with the closed stream, not with the first rejection.
    assert!(relay.run(CancellationToken::new()).await.is_err());
    assert_eq!(relay.dedup().len(), 2);
}

#[tokio::test]
async fn cancelled_relay_exits_cleanly() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(MockTransport::new());

    let mut relay = StatusRelay::new(
        transport.clone(),
        sink(&server),
        Arc::new(FileSessionStore::new(dir.path())),
        settings(),
        true,
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    relay.run(cancel).await.unwrap();
    assert!(server.received_requests().await.unwrap().is_empty());
}
