// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery sink trait for the messaging gateway that receives relayed statuses.

use async_trait::async_trait;

use crate::error::LookoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ForwardPayload, MessageId};

/// Adapter for the outbound messaging gateway.
///
/// A sink delivers to exactly one destination chat, chosen at construction.
#[async_trait]
pub trait DeliverySink: PluginAdapter {
    /// Delivers one payload using the send method implied by its kind.
    ///
    /// Returns [`LookoutError::Delivery`] on network failure or when the
    /// gateway rejects the request.
    async fn deliver(&self, payload: ForwardPayload) -> Result<MessageId, LookoutError>;
}
