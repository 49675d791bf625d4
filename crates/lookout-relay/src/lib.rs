// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status interception and forwarding pipeline.
//!
//! [`StatusRelay`] consumes transport events, keeps the contact directory
//! and the dedup window, classifies status broadcasts and forwards them to
//! a delivery sink with a fixed pause between submissions. The
//! [`ConnectionManager`](lifecycle::ConnectionManager) keeps the account
//! invisible once the session is open.

pub mod caption;
pub mod classifier;
pub mod contacts;
pub mod dedup;
pub mod forward;
pub mod lifecycle;
pub mod media;
pub mod relay;
pub mod shutdown;

pub use classifier::{classify, DropReason};
pub use contacts::ContactDirectory;
pub use dedup::DedupCache;
pub use lifecycle::{ConnectionManager, PresenceGate, SessionState};
pub use relay::{ProcessOutcome, RelaySettings, StatusRelay};
pub use shutdown::install_signal_handler;
