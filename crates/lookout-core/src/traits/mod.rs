// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the relay's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod session;
pub mod sink;
pub mod transport;

pub use adapter::PluginAdapter;
pub use session::SessionStore;
pub use sink::DeliverySink;
pub use transport::Transport;
