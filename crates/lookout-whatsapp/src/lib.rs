// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp side of the Lookout status relay.
//!
//! - [`BridgeTransport`]: event stream and control calls against a WhatsApp
//!   Web bridge.
//! - [`FileSessionStore`]: durable `creds.json` storage.
//! - [`pairing`]: the `lookout login` flow and terminal QR rendering.

pub mod pairing;
pub mod protocol;
pub mod session;
pub mod transport;

pub use pairing::{pair, render_qr, PairingOutcome};
pub use session::FileSessionStore;
pub use transport::BridgeTransport;
