// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed [`SessionStore`] keeping `creds.json` in the auth directory.
//!
//! Saves write a temporary file in the same directory, fsync it and rename it
//! over `creds.json`, so a crash never leaves a half-written credential file.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lookout_core::error::LookoutError;
use lookout_core::traits::{PluginAdapter, SessionStore};
use lookout_core::types::{AdapterType, Credentials, HealthStatus};
use tracing::{debug, info};

pub const CREDENTIALS_FILE: &str = "creds.json";

/// Credential store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }
}

fn storage_error(e: impl std::error::Error + Send + Sync + 'static) -> LookoutError {
    LookoutError::Storage {
        source: Box::new(e),
    }
}

fn write_atomically(dir: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| e.error)?;
    // The rename is only durable once the directory entry is on disk.
    #[cfg(unix)]
    std::fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[async_trait]
impl PluginAdapter for FileSessionStore {
    fn name(&self) -> &str {
        "file-session"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SessionStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.dir.display()
            ))),
            Err(_) => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.dir.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Credentials>, LookoutError> {
        let path = self.credentials_path();
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored credentials");
                return Ok(None);
            }
            Err(e) => return Err(storage_error(e)),
        };
        let credentials = serde_json::from_slice(&raw).map_err(storage_error)?;
        Ok(Some(credentials))
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), LookoutError> {
        let contents = serde_json::to_vec_pretty(credentials).map_err(storage_error)?;
        let dir = self.dir.clone();
        let target = self.credentials_path();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &contents))
            .await
            .map_err(|e| LookoutError::Internal(format!("credential writer panicked: {e}")))?
            .map_err(storage_error)?;
        debug!(dir = %self.dir.display(), "credentials saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), LookoutError> {
        match tokio::fs::remove_file(self.credentials_path()).await {
            Ok(()) => {
                info!(dir = %self.dir.display(), "stored credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(id: &str) -> Credentials {
        Credentials(serde_json::json!({"me": {"id": id}, "noiseKey": "abc"}))
    }

    #[tokio::test]
    async fn load_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("auth"));
        store.save(&creds("1@s.whatsapp.net")).await.unwrap();
        store.save(&creds("2@s.whatsapp.net")).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(creds("2@s.whatsapp.net")));
        let leftovers: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(CREDENTIALS_FILE)]);
    }

    #[test]
    fn atomic_write_replaces_target_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(CREDENTIALS_FILE);
        write_atomically(dir.path(), &target, b"{\"v\":1}").unwrap();
        write_atomically(dir.path(), &target, b"{\"v\":2}").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"{\"v\":2}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.credentials_path(), b"{not json").unwrap();
        assert!(matches!(
            store.load().await,
            Err(LookoutError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&creds("1@s.whatsapp.net")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn health_reflects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            FileSessionStore::new(dir.path()).health_check().await.unwrap(),
            HealthStatus::Healthy
        );
        assert!(matches!(
            FileSessionStore::new(dir.path().join("missing"))
                .health_check()
                .await
                .unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
