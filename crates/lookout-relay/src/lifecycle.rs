// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session state machine driven by `connection.update` events.
//!
//! States: AwaitingPairing -> Connecting -> Open -> Closed. On the first
//! `open` the account announces itself unavailable exactly once; from then
//! on [`PresenceGate`] swallows every outgoing presence update and read
//! receipt, so the account never appears online and never marks a status
//! as viewed. The relay only ever talks to the transport through the gate.
//!
//! A close with reason `LoggedOut` is fatal. Any other close is logged and
//! left to the transport to recover from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lookout_core::types::{
    AdapterType, ConnectionPhase, ConnectionUpdate, DisconnectReason, HealthStatus, MediaRef,
    MessageKey, PresenceState, TransportEvent,
};
use lookout_core::{LookoutError, PluginAdapter, Transport};
use tracing::{debug, error, info, warn};

/// States in the session FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No linked credentials; a pairing code must be scanned.
    AwaitingPairing,
    /// Credentials present, handshake in progress.
    Connecting,
    /// Live and receiving events.
    Open,
    /// Connection closed for the given reason.
    Closed { reason: DisconnectReason },
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingPairing => write!(f, "awaiting_pairing"),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Open => write!(f, "open"),
            SessionState::Closed { reason } => write!(f, "closed({reason})"),
        }
    }
}

/// [`Transport`] wrapper that turns presence updates and read receipts into
/// no-ops once muted. Everything else passes through.
pub struct PresenceGate {
    inner: Arc<dyn Transport>,
    muted: AtomicBool,
}

impl PresenceGate {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            muted: AtomicBool::new(false),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Mutes for the rest of the process. There is no unmute.
    fn mute(&self) {
        self.muted.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for PresenceGate {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl Transport for PresenceGate {
    async fn connect(&mut self) -> Result<(), LookoutError> {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => inner.connect().await,
            None => Err(LookoutError::Internal(
                "shared transport must be connected before it is gated".to_string(),
            )),
        }
    }

    async fn next_batch(&self) -> Result<Vec<TransportEvent>, LookoutError> {
        self.inner.next_batch().await
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, LookoutError> {
        self.inner.fetch_media(media).await
    }

    async fn send_presence(&self, state: PresenceState) -> Result<(), LookoutError> {
        if self.is_muted() {
            debug!(%state, "presence update suppressed");
            return Ok(());
        }
        self.inner.send_presence(state).await
    }

    async fn send_read_receipt(&self, keys: &[MessageKey]) -> Result<(), LookoutError> {
        if self.is_muted() {
            debug!(count = keys.len(), "read receipts suppressed");
            return Ok(());
        }
        self.inner.send_read_receipt(keys).await
    }
}

/// Owns the [`SessionState`] and the [`PresenceGate`] all transport traffic
/// goes through.
pub struct ConnectionManager {
    state: SessionState,
    gate: Arc<PresenceGate>,
}

impl ConnectionManager {
    /// `paired` tells whether stored credentials exist.
    pub fn new(transport: Arc<dyn Transport>, paired: bool) -> Self {
        let state = if paired {
            SessionState::Connecting
        } else {
            SessionState::AwaitingPairing
        };
        Self {
            state,
            gate: Arc::new(PresenceGate::new(transport)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The gated transport. Hand this, not the raw transport, to anything
    /// that talks to the chat network.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.gate.clone()
    }

    /// Whether outgoing presence and read receipts are being swallowed.
    pub fn is_muted(&self) -> bool {
        self.gate.is_muted()
    }

    /// Applies one connection update.
    ///
    /// Returns [`LookoutError::Session`] when the session was logged out.
    pub async fn handle_update(&mut self, update: &ConnectionUpdate) -> Result<(), LookoutError> {
        if update.qr.is_some() {
            self.transition(SessionState::AwaitingPairing);
            warn!("session is not linked; run `lookout login` to pair this device");
        }

        match update.connection {
            Some(ConnectionPhase::Connecting) => self.transition(SessionState::Connecting),
            Some(ConnectionPhase::Open) => self.on_open(update).await,
            Some(ConnectionPhase::Close) => {
                let last = update.last_disconnect.clone().unwrap_or_default();
                let reason = last.reason();
                self.transition(SessionState::Closed { reason });

                if reason == DisconnectReason::LoggedOut {
                    error!("logged out; delete the auth directory and run `lookout login` again");
                    return Err(LookoutError::Session {
                        message: "logged out by the chat network".to_string(),
                    });
                }
                warn!(
                    reason = %reason,
                    code = ?last.status_code,
                    detail = last.message.as_deref().unwrap_or_default(),
                    "connection closed"
                );
            }
            None => {}
        }
        Ok(())
    }

    async fn on_open(&mut self, update: &ConnectionUpdate) {
        self.transition(SessionState::Open);
        match &update.me {
            Some(me) => info!(
                account = %me.id.phone(),
                name = me.name.as_deref().unwrap_or_default(),
                "connected"
            ),
            None => info!("connected"),
        }

        if self.gate.is_muted() {
            return;
        }
        if let Err(e) = self.gate.send_presence(PresenceState::Unavailable).await {
            warn!(error = %e, "failed to announce unavailable presence");
        }
        self.gate.mute();
        debug!("outgoing presence and read receipts disabled");
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session state changed");
            self.state = next;
        }
    }
}
