// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lookout serve` command implementation.
//!
//! Wires the file session store, the WhatsApp bridge transport and the
//! Telegram sink into a [`StatusRelay`] and runs it until a signal arrives
//! or the session is lost.

use std::sync::Arc;

use lookout_config::LookoutConfig;
use lookout_core::types::HealthStatus;
use lookout_core::{LookoutError, PluginAdapter, SessionStore, Transport};
use lookout_relay::{install_signal_handler, RelaySettings, StatusRelay};
use lookout_telegram::TelegramSink;
use lookout_whatsapp::{BridgeTransport, FileSessionStore};
use tracing::{info, warn};

/// Runs the relay. Returns `Ok(())` after a requested shutdown.
pub async fn run_serve(config: LookoutConfig) -> Result<(), LookoutError> {
    info!("starting lookout serve");

    let store = Arc::new(FileSessionStore::new(&config.session.auth_dir));
    let credentials = store.load().await?;
    let paired = credentials.is_some();
    if !paired {
        warn!(
            auth_dir = %config.session.auth_dir,
            "no stored credentials; run `lookout login` to pair this device"
        );
    }

    let sink = Arc::new(TelegramSink::new(&config.telegram)?);
    match sink.health_check().await? {
        HealthStatus::Healthy => info!("Telegram bot reachable"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = %reason, "Telegram bot check failed; deliveries may fail");
        }
    }

    let mut transport = BridgeTransport::new(
        &config.bridge,
        &config.session.device_name,
        credentials,
    )?;
    transport.connect().await?;
    let transport = Arc::new(transport);

    let mut relay = StatusRelay::new(
        transport.clone(),
        sink.clone(),
        store.clone(),
        RelaySettings::from(&config.relay),
        paired,
    );

    let cancel = install_signal_handler();
    let result = relay.run(cancel).await;

    transport.shutdown().await?;
    sink.shutdown().await?;
    info!(seen_statuses = relay.dedup().len(), "lookout serve stopped");
    result
}
