// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` wires a [`StatusRelay`] to a mock transport, a mock sink
//! and an in-memory session store, and exposes the mocks for assertions.

use std::sync::Arc;
use std::time::Duration;

use lookout_core::types::{Credentials, InboundEvent, TransportEvent};
use lookout_core::{DeliverySink, LookoutError, SessionStore, Transport};
use lookout_relay::{ProcessOutcome, RelaySettings, StatusRelay};

use crate::memory_store::MemorySessionStore;
use crate::mock_sink::MockSink;
use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    settings: RelaySettings,
    credentials: Option<Credentials>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            settings: RelaySettings {
                throttle: Duration::ZERO,
                ..RelaySettings::default()
            },
            credentials: Some(Credentials(serde_json::json!({"registered": true}))),
        }
    }

    /// Pause after each sink submission (zero by default).
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.settings.throttle = throttle;
        self
    }

    pub fn with_dedup_window(mut self, window: usize) -> Self {
        self.settings.dedup_window = window;
        self
    }

    pub fn with_caption_text_limit(mut self, limit: usize) -> Self {
        self.settings.caption_text_limit = limit;
        self
    }

    /// Start without stored credentials.
    pub fn unpaired(mut self) -> Self {
        self.credentials = None;
        self
    }

    pub fn build(self) -> TestHarness {
        let transport = Arc::new(MockTransport::new());
        let sink = Arc::new(MockSink::new());
        let paired = self.credentials.is_some();
        let store = Arc::new(match self.credentials {
            Some(credentials) => MemorySessionStore::with_credentials(credentials),
            None => MemorySessionStore::new(),
        });

        let relay = StatusRelay::new(
            transport.clone() as Arc<dyn Transport>,
            sink.clone() as Arc<dyn DeliverySink>,
            store.clone() as Arc<dyn SessionStore>,
            self.settings,
            paired,
        );

        TestHarness {
            transport,
            sink,
            store,
            relay,
        }
    }
}

/// A relay wired to mock adapters.
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub sink: Arc<MockSink>,
    pub store: Arc<MemorySessionStore>,
    pub relay: StatusRelay,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs one inbound message through the pipeline.
    pub async fn process(&mut self, event: &InboundEvent) -> ProcessOutcome {
        self.relay.process(event).await
    }

    /// Dispatches one transport event.
    pub async fn send(&mut self, event: TransportEvent) -> Result<(), LookoutError> {
        self.relay.handle_event(event).await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::builder().build()
    }
}
