// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery sink that captures payloads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use lookout_core::traits::adapter::PluginAdapter;
use lookout_core::traits::sink::DeliverySink;
use lookout_core::types::{AdapterType, ForwardPayload, HealthStatus, MessageId};
use lookout_core::LookoutError;

/// A mock messaging gateway.
///
/// Every `deliver()` call is captured together with the (tokio) instant it
/// happened, whether or not the delivery is configured to fail.
pub struct MockSink {
    delivered: Mutex<Vec<(Instant, ForwardPayload)>>,
    fail: AtomicBool,
    next_id: AtomicU64,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Make subsequent deliveries fail the way a gateway `ok: false` does.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Payloads passed to `deliver()`, in call order.
    pub async fn deliveries(&self) -> Vec<ForwardPayload> {
        self.delivered
            .lock()
            .await
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub async fn delivery_count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    /// When each `deliver()` call happened.
    pub async fn delivery_times(&self) -> Vec<Instant> {
        self.delivered.lock().await.iter().map(|(at, _)| *at).collect()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSink {
    fn name(&self) -> &str {
        "mock-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for MockSink {
    async fn deliver(&self, payload: ForwardPayload) -> Result<MessageId, LookoutError> {
        self.delivered.lock().await.push((Instant::now(), payload));
        if self.fail.load(Ordering::SeqCst) {
            return Err(LookoutError::Delivery {
                message: "mock gateway returned ok=false".into(),
                source: None,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(id.to_string()))
    }
}
