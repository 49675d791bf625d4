// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lookout_core::traits::adapter::PluginAdapter;
use lookout_core::traits::session::SessionStore;
use lookout_core::types::{AdapterType, Credentials, HealthStatus};
use lookout_core::LookoutError;

/// Keeps credentials in memory and counts saves.
#[derive(Default)]
pub struct MemorySessionStore {
    credentials: Mutex<Option<Credentials>>,
    saves: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out paired.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(Some(credentials)),
            saves: AtomicUsize::new(0),
        }
    }

    pub async fn current(&self) -> Option<Credentials> {
        self.credentials.lock().await.clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MemorySessionStore {
    fn name(&self) -> &str {
        "memory-session"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SessionStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Credentials>, LookoutError> {
        Ok(self.current().await)
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), LookoutError> {
        *self.credentials.lock().await = Some(credentials.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), LookoutError> {
        *self.credentials.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());
        let creds = Credentials(serde_json::json!({"me": {"id": "1555@s.whatsapp.net"}}));
        store.save(&creds).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(creds));
        assert_eq!(store.save_count(), 1);
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
