// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with scripted event batches,
//! canned media bytes, and recorded outgoing calls for assertion in tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use lookout_core::traits::adapter::PluginAdapter;
use lookout_core::traits::transport::Transport;
use lookout_core::types::{
    AdapterType, HealthStatus, MediaRef, MessageKey, PresenceState, TransportEvent,
};
use lookout_core::LookoutError;

/// Bytes returned by `fetch_media` when no per-message bytes were set.
pub const DEFAULT_MEDIA: &[u8] = b"\xff\xd8\xff\xe0mock-media";

/// A mock chat network connection.
///
/// - **batches**: injected via `push_batch()`, returned in order by `next_batch()`
/// - **fetches**: every `fetch_media()` call is recorded; failures can be toggled
/// - **presence / receipts**: outgoing calls are captured
pub struct MockTransport {
    batches: Arc<Mutex<VecDeque<Vec<TransportEvent>>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
    connected: AtomicBool,
    media: Mutex<HashMap<String, Vec<u8>>>,
    fail_media: AtomicBool,
    fetches: Mutex<Vec<MediaRef>>,
    presence: Mutex<Vec<PresenceState>>,
    receipts: Mutex<Vec<Vec<MessageKey>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            media: Mutex::new(HashMap::new()),
            fail_media: AtomicBool::new(false),
            fetches: Mutex::new(Vec::new()),
            presence: Mutex::new(Vec::new()),
            receipts: Mutex::new(Vec::new()),
        }
    }

    /// Queue one batch for `next_batch()`.
    pub async fn push_batch(&self, events: Vec<TransportEvent>) {
        self.batches.lock().await.push_back(events);
        self.notify.notify_one();
    }

    /// End the event stream once the queued batches are drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Bytes to return for the message with `id`.
    pub async fn set_media(&self, id: &str, bytes: Vec<u8>) {
        self.media.lock().await.insert(id.to_string(), bytes);
    }

    /// Make every subsequent `fetch_media()` fail.
    pub fn fail_media(&self, fail: bool) {
        self.fail_media.store(fail, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub async fn fetches(&self) -> Vec<MediaRef> {
        self.fetches.lock().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.lock().await.len()
    }

    pub async fn presence_updates(&self) -> Vec<PresenceState> {
        self.presence.lock().await.clone()
    }

    pub async fn read_receipts(&self) -> Vec<Vec<MessageKey>> {
        self.receipts.lock().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), LookoutError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn next_batch(&self) -> Result<Vec<TransportEvent>, LookoutError> {
        loop {
            {
                let mut queue = self.batches.lock().await;
                if let Some(batch) = queue.pop_front() {
                    return Ok(batch);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(LookoutError::Transport {
                    message: "mock event stream closed".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, LookoutError> {
        self.fetches.lock().await.push(media.clone());
        if self.fail_media.load(Ordering::SeqCst) {
            return Err(LookoutError::Transport {
                message: format!("mock download failed for {}", media.key.id),
                source: None,
            });
        }
        Ok(self
            .media
            .lock()
            .await
            .get(&media.key.id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MEDIA.to_vec()))
    }

    async fn send_presence(&self, state: PresenceState) -> Result<(), LookoutError> {
        self.presence.lock().await.push(state);
        Ok(())
    }

    async fn send_read_receipt(&self, keys: &[MessageKey]) -> Result<(), LookoutError> {
        self.receipts.lock().await.push(keys.to_vec());
        Ok(())
    }
}
