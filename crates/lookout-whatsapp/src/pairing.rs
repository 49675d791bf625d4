// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot device pairing.
//!
//! Drives a connected transport until the session opens, handing every
//! pairing code to a callback and persisting rotated credentials as they
//! arrive. `RestartRequired` and lost-stream closes are expected mid-pairing
//! and are waited out; any other close ends pairing with an error.

use lookout_core::error::LookoutError;
use lookout_core::traits::{SessionStore, Transport};
use lookout_core::types::{
    AccountInfo, ConnectionPhase, Credentials, DisconnectReason, TransportEvent,
};
use qrcode::render::unicode;
use qrcode::QrCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a pairing run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingOutcome {
    /// The session opened; credentials are on disk.
    Linked { account: Option<AccountInfo> },
    /// Shutdown was requested before the session opened.
    Cancelled,
}

/// Renders a pairing code as a terminal QR block.
pub fn render_qr(code: &str) -> Result<String, LookoutError> {
    let qr = QrCode::new(code.as_bytes())
        .map_err(|e| LookoutError::Internal(format!("cannot encode pairing code: {e}")))?;
    Ok(qr
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}

/// Runs pairing to completion over an already connected transport.
pub async fn pair(
    transport: &dyn Transport,
    store: &dyn SessionStore,
    cancel: &CancellationToken,
    mut on_qr: impl FnMut(&str),
) -> Result<PairingOutcome, LookoutError> {
    let mut latest: Option<Credentials> = None;

    loop {
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PairingOutcome::Cancelled),
            batch = transport.next_batch() => batch?,
        };

        for event in batch {
            match event {
                TransportEvent::CredsUpdate(credentials) => {
                    store.save(&credentials).await?;
                    debug!("pairing credentials saved");
                    latest = Some(credentials);
                }
                TransportEvent::ConnectionUpdate(update) => {
                    if let Some(code) = update.qr.as_deref() {
                        info!("scan the pairing code with WhatsApp > Linked devices");
                        on_qr(code);
                    }
                    match update.connection {
                        Some(ConnectionPhase::Open) => {
                            if let Some(credentials) = &latest {
                                store.save(credentials).await?;
                            }
                            match &update.me {
                                Some(me) => info!(
                                    account = %me.id,
                                    name = me.name.as_deref().unwrap_or_default(),
                                    "device linked"
                                ),
                                None => info!("device linked"),
                            }
                            return Ok(PairingOutcome::Linked { account: update.me });
                        }
                        Some(ConnectionPhase::Close) => {
                            let last = update.last_disconnect.unwrap_or_default();
                            match last.reason() {
                                DisconnectReason::RestartRequired
                                | DisconnectReason::ConnectionLost => {
                                    warn!(reason = %last.reason(), "connection restarting, pairing continues");
                                }
                                reason => {
                                    return Err(LookoutError::Session {
                                        message: format!(
                                            "pairing failed: connection closed ({reason})"
                                        ),
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }
}
