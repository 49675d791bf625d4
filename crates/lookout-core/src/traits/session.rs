// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store trait for persisting transport credentials.

use async_trait::async_trait;

use crate::error::LookoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Credentials;

/// Durable storage for the credentials of one paired account.
#[async_trait]
pub trait SessionStore: PluginAdapter {
    /// Loads stored credentials, or `None` when the account is not paired yet.
    async fn load(&self) -> Result<Option<Credentials>, LookoutError>;

    /// Persists rotated credentials. Must be durable when it returns.
    async fn save(&self, credentials: &Credentials) -> Result<(), LookoutError>;

    /// Removes stored credentials.
    async fn clear(&self) -> Result<(), LookoutError>;
}
