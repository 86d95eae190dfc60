//! Session token storage.
//!
//! Backends:
//! - [`KeyringTokenStore`]: OS keychain (Credential Manager, Keychain, Secret Service)
//! - [`FileTokenStore`]: `auth.json` in the app home, owner-only permissions
//! - [`MemoryTokenStore`]: process memory only
//!
//! [`FallbackTokenStore`] combines a primary and a secondary backend, which
//! is how the keyring-then-file setup is built.

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{KEYRING_ACCOUNT, KEYRING_SERVICE};
use crate::utils::write_private_file;

/// Errors that can occur while storing or loading the token.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The OS keychain rejected the operation.
    #[error("Failed to access keyring: {0}")]
    Keyring(String),

    /// Reading or writing the token file failed.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file exists but is not valid JSON.
    #[error("Corrupt token file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every configured backend failed.
    #[error("Failed to save token: {0}")]
    Unavailable(String),
}

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoStorageAccess(_) => {
                StorageError::Keyring("Cannot access keyring storage".to_string())
            }
            keyring::Error::PlatformFailure(_) => {
                StorageError::Keyring("Platform-specific keyring failure".to_string())
            }
            _ => StorageError::Keyring(err.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence for the session token issued at login.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist the token, replacing any previous one.
    async fn save_auth_token(&self, token: SecretString) -> Result<()>;

    /// Load the stored token, if any.
    async fn load_auth_token(&self) -> Result<Option<SecretString>>;

    /// Remove the stored token. Returns true if one was removed.
    async fn clear_auth_token(&self) -> Result<bool>;
}

/// Token store backed by the OS keychain.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    account: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Create a store under a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    /// Run a blocking keyring operation off the async runtime.
    async fn with_entry<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(keyring::Entry) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let account = self.account.clone();
        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &account)?;
            op(entry)
        })
        .await
        .map_err(|e| StorageError::Keyring(format!("keyring task failed: {e}")))?
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn save_auth_token(&self, token: SecretString) -> Result<()> {
        self.with_entry(move |entry| {
            entry.set_password(token.expose_secret())?;
            debug!("Stored token in keyring");
            Ok(())
        })
        .await
    }

    async fn load_auth_token(&self) -> Result<Option<SecretString>> {
        self.with_entry(|entry| match entry.get_password() {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn clear_auth_token(&self) -> Result<bool> {
        self.with_entry(|entry| match entry.delete_credential() {
            Ok(()) => {
                debug!("Deleted token from keyring");
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.into()),
        })
        .await
    }
}

/// On-disk format of the token file.
#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: i64,
}

/// Token store backed by a JSON file with 0600 permissions.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a blocking file operation off the async runtime.
    async fn with_file<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(&path))
            .await
            .map_err(|e| io_error(&self.path, std::io::Error::other(e)))?
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn corrupt(path: &Path, source: serde_json::Error) -> StorageError {
    StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save_auth_token(&self, token: SecretString) -> Result<()> {
        self.with_file(move |path| {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
            }

            let stored = StoredToken {
                token: token.expose_secret().to_string(),
                saved_at: chrono::Utc::now().timestamp(),
            };
            let json = serde_json::to_vec_pretty(&stored).map_err(|e| corrupt(path, e))?;
            write_private_file(path, &json).map_err(|e| io_error(path, e))?;
            debug!(path = %path.display(), "Stored token in file");
            Ok(())
        })
        .await
    }

    async fn load_auth_token(&self) -> Result<Option<SecretString>> {
        self.with_file(|path| {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(io_error(path, e)),
            };
            let stored: StoredToken =
                serde_json::from_str(&content).map_err(|e| corrupt(path, e))?;
            Ok(Some(SecretString::from(stored.token)))
        })
        .await
    }

    async fn clear_auth_token(&self) -> Result<bool> {
        self.with_file(|path| match std::fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted token file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, e)),
        })
        .await
    }
}

/// Token store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_auth_token(&self, token: SecretString) -> Result<()> {
        *self.token.lock() = Some(token);
        Ok(())
    }

    async fn load_auth_token(&self) -> Result<Option<SecretString>> {
        Ok(self
            .token
            .lock()
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_string())))
    }

    async fn clear_auth_token(&self) -> Result<bool> {
        Ok(self.token.lock().take().is_some())
    }
}

/// Primary store with a secondary fallback.
///
/// Saving clears both locations first so a stale token in one backend can
/// never shadow a fresh one in the other.
pub struct FallbackTokenStore {
    primary: Arc<dyn TokenStore>,
    secondary: Arc<dyn TokenStore>,
}

impl FallbackTokenStore {
    pub fn new(primary: Arc<dyn TokenStore>, secondary: Arc<dyn TokenStore>) -> Self {
        Self { primary, secondary }
    }

    /// Keyring first, then `auth.json` at the given path.
    pub fn system(auth_file: impl Into<PathBuf>) -> Self {
        Self::new(
            Arc::new(KeyringTokenStore::new()),
            Arc::new(FileTokenStore::new(auth_file)),
        )
    }

    async fn clear_all(&self) {
        if let Err(e) = self.primary.clear_auth_token().await {
            debug!(error = %e, "Failed to clear primary token store (may not exist)");
        }
        if let Err(e) = self.secondary.clear_auth_token().await {
            debug!(error = %e, "Failed to clear secondary token store (may not exist)");
        }
    }
}

#[async_trait]
impl TokenStore for FallbackTokenStore {
    async fn save_auth_token(&self, token: SecretString) -> Result<()> {
        self.clear_all().await;

        let copy = SecretString::from(token.expose_secret().to_string());
        let primary_err = match self.primary.save_auth_token(token).await {
            Ok(()) => {
                info!("Token saved to primary store");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Primary token store failed, trying fallback");
                e
            }
        };

        match self.secondary.save_auth_token(copy).await {
            Ok(()) => {
                info!("Token saved to fallback store");
                Ok(())
            }
            Err(e) => Err(StorageError::Unavailable(format!(
                "primary: {primary_err}; fallback: {e}"
            ))),
        }
    }

    async fn load_auth_token(&self) -> Result<Option<SecretString>> {
        match self.primary.load_auth_token().await {
            Ok(Some(token)) => return Ok(Some(token)),
            Ok(None) => debug!("No token in primary store"),
            Err(e) => debug!(error = %e, "Primary token store unavailable, trying fallback"),
        }
        self.secondary.load_auth_token().await
    }

    async fn clear_auth_token(&self) -> Result<bool> {
        let primary = self.primary.clear_auth_token().await;
        let secondary = self.secondary.clear_auth_token().await;
        match (primary, secondary) {
            (Err(p), Err(s)) => Err(StorageError::Unavailable(format!(
                "primary: {p}; fallback: {s}"
            ))),
            (p, s) => Ok(p.unwrap_or(false) | s.unwrap_or(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every operation.
    struct BrokenStore;

    #[async_trait]
    impl TokenStore for BrokenStore {
        async fn save_auth_token(&self, _token: SecretString) -> Result<()> {
            Err(StorageError::Keyring("no secret service".to_string()))
        }
        async fn load_auth_token(&self) -> Result<Option<SecretString>> {
            Err(StorageError::Keyring("no secret service".to_string()))
        }
        async fn clear_auth_token(&self) -> Result<bool> {
            Err(StorageError::Keyring("no secret service".to_string()))
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    async fn loaded(store: &dyn TokenStore) -> Option<String> {
        store
            .load_auth_token()
            .await
            .expect("load")
            .map(|t| t.expose_secret().to_string())
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(tmp.path().join("nested").join("auth.json"));

        assert_eq!(loaded(&store).await, None);
        store.save_auth_token(secret("abc")).await.expect("save");
        assert_eq!(loaded(&store).await, Some("abc".to_string()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path())
                .expect("meta")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        assert!(store.clear_auth_token().await.expect("clear"));
        assert!(!store.clear_auth_token().await.expect("clear again"));
        assert_eq!(loaded(&store).await, None);
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn test_file_store_io_errors_name_the_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // A directory where the token file should be.
        let store = FileTokenStore::new(tmp.path());

        match store.load_auth_token().await {
            Err(StorageError::Io { path, .. }) => assert_eq!(path, tmp.path()),
            other => panic!("expected io error, got {:?}", other.map(|t| t.is_some())),
        }
        match store.clear_auth_token().await {
            Err(StorageError::Io { path, .. }) => assert_eq!(path, tmp.path()),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("auth.json");
        std::fs::write(&path, "not json").expect("write");
        let store = FileTokenStore::new(&path);
        assert!(matches!(
            store.load_auth_token().await,
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        store.save_auth_token(secret("abc")).await.expect("save");
        assert_eq!(loaded(&store).await, Some("abc".to_string()));
        assert!(store.clear_auth_token().await.expect("clear"));
        assert_eq!(loaded(&store).await, None);
    }

    #[tokio::test]
    async fn test_fallback_prefers_primary() {
        let primary = Arc::new(MemoryTokenStore::new());
        let secondary = Arc::new(MemoryTokenStore::new());
        let store = FallbackTokenStore::new(primary.clone(), secondary.clone());

        store.save_auth_token(secret("abc")).await.expect("save");
        assert_eq!(loaded(primary.as_ref()).await, Some("abc".to_string()));
        assert_eq!(loaded(secondary.as_ref()).await, None);
        assert_eq!(loaded(&store).await, Some("abc".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_used_when_primary_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let file = Arc::new(FileTokenStore::new(tmp.path().join("auth.json")));
        let store = FallbackTokenStore::new(Arc::new(BrokenStore), file.clone());

        store.save_auth_token(secret("abc")).await.expect("save");
        assert_eq!(loaded(file.as_ref()).await, Some("abc".to_string()));
        assert_eq!(loaded(&store).await, Some("abc".to_string()));
        assert!(store.clear_auth_token().await.expect("clear"));
        assert_eq!(loaded(&store).await, None);
    }

    #[tokio::test]
    async fn test_fallback_clears_stale_token_before_save() {
        let primary = Arc::new(MemoryTokenStore::new());
        let secondary = Arc::new(MemoryTokenStore::new());
        secondary.save_auth_token(secret("stale")).await.expect("seed");

        let store = FallbackTokenStore::new(primary.clone(), secondary.clone());
        store.save_auth_token(secret("fresh")).await.expect("save");

        assert_eq!(loaded(secondary.as_ref()).await, None);
        assert_eq!(loaded(&store).await, Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_loads_secondary_when_primary_empty() {
        let primary = Arc::new(MemoryTokenStore::new());
        let secondary = Arc::new(MemoryTokenStore::new());
        secondary.save_auth_token(secret("old")).await.expect("seed");

        let store = FallbackTokenStore::new(primary, secondary);
        assert_eq!(loaded(&store).await, Some("old".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_both_fail() {
        let store = FallbackTokenStore::new(Arc::new(BrokenStore), Arc::new(BrokenStore));
        assert!(matches!(
            store.save_auth_token(secret("abc")).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.clear_auth_token().await.is_err());
    }

    // Requires a working keyring on the system.
    #[tokio::test]
    #[ignore]
    async fn test_keyring_round_trip() {
        let store = KeyringTokenStore::with_service("portal-test");
        store.save_auth_token(secret("abc")).await.expect("save");
        assert_eq!(loaded(&store).await, Some("abc".to_string()));
        assert!(store.clear_auth_token().await.expect("clear"));
    }
}
