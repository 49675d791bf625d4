// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lookout status relay.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the relay pipeline and its adapters (transport, delivery sink,
//! session store).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LookoutError;
pub use types::{AdapterType, HealthStatus, Jid, MessageId};

// Re-export all adapter traits at crate root.
pub use traits::{DeliverySink, PluginAdapter, SessionStore, Transport};
