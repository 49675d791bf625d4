// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The status relay: one sequential loop from transport events to the sink.
//!
//! Exactly one event is in flight at a time. Batches are handled in arrival
//! order and each status runs classify, dedup, fetch, forward and throttle
//! to completion before the next one starts. Cancellation is only observed
//! between events.
//!
//! Delivery is best-effort and at-most-once: a status is marked seen before
//! it is fetched or forwarded, and failures are logged and dropped without
//! retry.

use std::sync::Arc;
use std::time::Duration;

use lookout_config::model::RelayConfig;
use lookout_core::types::{InboundEvent, MessageId, TransportEvent, UpsertKind};
use lookout_core::{DeliverySink, LookoutError, SessionStore, Transport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::caption::CaptionBuilder;
use crate::classifier::{classify, DropReason};
use crate::contacts::ContactDirectory;
use crate::dedup::DedupCache;
use crate::forward::{ForwardError, Forwarder};
use crate::lifecycle::{ConnectionManager, SessionState};
use crate::media::MediaRetriever;

/// Tunables for the relay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    /// Pause after every sink submission.
    pub throttle: Duration,
    /// Dedup recency window; `0` keeps every key.
    pub dedup_window: usize,
    /// Maximum status text characters inside a media caption.
    pub caption_text_limit: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            throttle: Duration::from_millis(config.throttle_ms),
            dedup_window: config.dedup_window,
            caption_text_limit: config.caption_text_limit,
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Forwarded(MessageId),
    Dropped(DropReason),
    Duplicate,
    FetchFailed,
    DeliveryFailed,
}

/// Owns all relay state and drives events through the pipeline.
pub struct StatusRelay {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    contacts: ContactDirectory,
    dedup: DedupCache,
    lifecycle: ConnectionManager,
    forwarder: Forwarder,
    cancel: CancellationToken,
}

impl StatusRelay {
    /// Creates a relay over an already connected transport.
    ///
    /// `paired` tells whether the session store held credentials at startup.
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn DeliverySink>,
        store: Arc<dyn SessionStore>,
        settings: RelaySettings,
        paired: bool,
    ) -> Self {
        let lifecycle = ConnectionManager::new(transport, paired);
        let transport = lifecycle.transport();
        let forwarder = Forwarder::new(
            sink,
            MediaRetriever::new(transport.clone()),
            CaptionBuilder::new(settings.caption_text_limit),
            settings.throttle,
        );
        Self {
            lifecycle,
            transport,
            store,
            contacts: ContactDirectory::new(),
            dedup: DedupCache::new(settings.dedup_window),
            forwarder,
            cancel: CancellationToken::new(),
        }
    }

    pub fn contacts(&self) -> &ContactDirectory {
        &self.contacts
    }

    pub fn dedup(&self) -> &DedupCache {
        &self.dedup
    }

    pub fn session_state(&self) -> SessionState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &ConnectionManager {
        &self.lifecycle
    }

    /// The transport as the relay uses it, behind the presence gate.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Runs until `cancel` fires or the transport's event stream ends.
    ///
    /// Returns `Ok(())` on cancellation. A logged-out session or a closed
    /// event stream is returned as an error.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), LookoutError> {
        self.cancel = cancel;
        info!("listening for status updates");

        loop {
            let batch = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("shutdown requested, relay stopping");
                    return Ok(());
                }
                batch = self.transport.next_batch() => batch,
            };

            match batch {
                Ok(events) => self.handle_batch(events).await?,
                Err(e) => {
                    error!(error = %e, "transport event stream ended");
                    return Err(e);
                }
            }
        }
    }

    /// Handles every event of one batch in order.
    pub async fn handle_batch(&mut self, events: Vec<TransportEvent>) -> Result<(), LookoutError> {
        for event in events {
            if self.cancel.is_cancelled() {
                debug!("shutdown requested, skipping rest of batch");
                break;
            }
            self.handle_event(event).await?;
        }
        Ok(())
    }

    /// Dispatches one transport event.
    ///
    /// Only [`LookoutError::Session`] is returned; everything else is logged.
    pub async fn handle_event(&mut self, event: TransportEvent) -> Result<(), LookoutError> {
        match event {
            TransportEvent::CredsUpdate(credentials) => {
                if let Err(e) = self.store.save(&credentials).await {
                    error!(error = %e, "failed to persist rotated credentials");
                } else {
                    debug!("credentials persisted");
                }
            }
            TransportEvent::ConnectionUpdate(update) => {
                self.lifecycle.handle_update(&update).await?;
            }
            TransportEvent::ContactsUpdate(batch) => {
                self.contacts.update(&batch);
                info!(
                    updated = batch.len(),
                    known = self.contacts.len(),
                    "contact directory updated"
                );
            }
            TransportEvent::MessagesUpsert(upsert) => {
                if upsert.kind != UpsertKind::Notify {
                    debug!(kind = %upsert.kind, count = upsert.messages.len(), "ignoring non-live upsert");
                    return Ok(());
                }
                for message in &upsert.messages {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    self.process(message).await;
                }
            }
        }
        Ok(())
    }

    /// Runs one inbound message through classify, dedup and forward.
    ///
    /// Best-effort: fetch and delivery failures are logged and reported in
    /// the outcome, never retried, and the status stays marked as seen.
    pub async fn process(&mut self, event: &InboundEvent) -> ProcessOutcome {
        let status = match classify(event, &self.contacts) {
            Ok(status) => status,
            Err(reason) => {
                match reason {
                    DropReason::Unsupported | DropReason::NestedEphemeral => {
                        info!(id = %event.key.id, %reason, "unsupported status type, skipping");
                    }
                    _ => debug!(id = %event.key.id, %reason, "event dropped"),
                }
                return ProcessOutcome::Dropped(reason);
            }
        };

        let key = status.dedup_key();
        if !self.dedup.check_and_mark(&key) {
            debug!(key = %key, "duplicate status ignored");
            return ProcessOutcome::Duplicate;
        }

        info!(
            phone = %status.sender_phone,
            name = %status.sender_name,
            kind = %status.kind,
            "new status"
        );

        match self.forwarder.forward(&status).await {
            Ok(id) => {
                info!(key = %key, kind = %status.kind, "status forwarded");
                ProcessOutcome::Forwarded(id)
            }
            Err(ForwardError::Fetch(e)) => {
                warn!(key = %key, error = %e, "media download failed, status dropped");
                ProcessOutcome::FetchFailed
            }
            Err(ForwardError::Delivery(e)) => {
                warn!(key = %key, error = %e, "delivery failed, status dropped");
                ProcessOutcome::DeliveryFailed
            }
            Err(e @ ForwardError::NotForwardable(_)) => {
                warn!(key = %key, error = %e, "status dropped");
                ProcessOutcome::Dropped(DropReason::Unsupported)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_config() {
        let config = RelayConfig {
            throttle_ms: 2000,
            dedup_window: 50,
            caption_text_limit: 300,
        };
        let settings = RelaySettings::from(&config);
        assert_eq!(settings.throttle, Duration::from_secs(2));
        assert_eq!(settings.dedup_window, 50);
        assert_eq!(settings.caption_text_limit, 300);
    }

    #[test]
    fn default_settings_throttle_one_second() {
        assert_eq!(RelaySettings::default().throttle, Duration::from_millis(1000));
    }
}
