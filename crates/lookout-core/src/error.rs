// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lookout status relay.

use thiserror::Error;

/// The primary error type used across all Lookout adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LookoutError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The chat session is no longer usable (credentials revoked, logged out).
    ///
    /// This is the only error that terminates the relay.
    #[error("session error: {message}")]
    Session { message: String },

    /// Transport errors (bridge unreachable, event stream closed, media download failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery sink errors (network failure, `ok: false` from the gateway).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential storage errors (I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LookoutError {
    /// Returns `true` if this error must terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LookoutError::Session { .. })
    }
}
