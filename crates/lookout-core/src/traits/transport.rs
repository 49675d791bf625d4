// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for the chat network client.

use async_trait::async_trait;

use crate::error::LookoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MediaRef, MessageKey, PresenceState, TransportEvent};

/// Adapter for the live chat network connection.
///
/// The transport owns the protocol; the relay only consumes its event
/// stream and asks it for media and presence changes.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Establishes the connection and starts the event stream.
    async fn connect(&mut self) -> Result<(), LookoutError>;

    /// Receives the next batch of events, waiting until one is available.
    ///
    /// Returns an error once the event stream has closed for good.
    async fn next_batch(&self) -> Result<Vec<TransportEvent>, LookoutError>;

    /// Downloads the bytes behind a media reference without sending a
    /// read or viewed acknowledgement.
    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, LookoutError>;

    /// Broadcasts the account's presence.
    async fn send_presence(&self, state: PresenceState) -> Result<(), LookoutError>;

    /// Marks messages as read.
    async fn send_read_receipt(&self, keys: &[MessageKey]) -> Result<(), LookoutError>;
}
