// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lookout login`: pair this device with a WhatsApp account.

use lookout_config::LookoutConfig;
use lookout_core::{LookoutError, PluginAdapter, SessionStore, Transport};
use lookout_relay::install_signal_handler;
use lookout_whatsapp::{pair, render_qr, BridgeTransport, FileSessionStore, PairingOutcome};
use tracing::{info, warn};

/// Runs pairing. Returns `true` once the device is linked and `false` when
/// interrupted before that.
pub async fn run_login(config: LookoutConfig) -> Result<bool, LookoutError> {
    let store = FileSessionStore::new(&config.session.auth_dir);
    let credentials = store.load().await?;
    if credentials.is_some() {
        info!("stored credentials found, reconnecting");
    }

    let mut transport = BridgeTransport::new(
        &config.bridge,
        &config.session.device_name,
        credentials,
    )?;
    transport.connect().await?;

    let cancel = install_signal_handler();
    let outcome = pair(&transport, &store, &cancel, |code| match render_qr(code) {
        Ok(qr) => println!("\n{qr}"),
        Err(e) => {
            warn!(error = %e, "cannot render pairing code, printing it raw");
            println!("\n{code}");
        }
    })
    .await;
    transport.shutdown().await?;

    match outcome? {
        PairingOutcome::Linked { account } => {
            let who = account
                .map(|me| match me.name {
                    Some(name) => format!("{name} (+{})", me.id.phone()),
                    None => format!("+{}", me.id.phone()),
                })
                .unwrap_or_else(|| "account".to_string());
            println!("linked {who}; credentials saved to {}", store.dir().display());
            Ok(true)
        }
        PairingOutcome::Cancelled => {
            println!("pairing cancelled");
            Ok(false)
        }
    }
}
