//! Durable user credential store.
//!
//! Credentials live in a single JSON snapshot on disk, loaded lazily on
//! first use and held in memory afterwards. Registration rewrites the
//! whole snapshot through a temp file and rename, and only acknowledges
//! after the data is on disk. The write lock is held across the
//! check-persist-insert sequence, so concurrent registrations serialize
//! and a lookup right after a successful register sees the new record.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

/// One registered credential: the salt and verifier replace the password.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub salt: String,
    pub verifier: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    /// The username already has a record; the stored one is untouched.
    Conflict,
}

pub struct UserStore {
    path: PathBuf,
    users: OnceCell<RwLock<HashMap<String, UserRecord>>>,
}

impl UserStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            users: OnceCell::new(),
        }
    }

    /// Snapshot cache, loaded exactly once even under concurrent callers.
    async fn users(&self) -> &RwLock<HashMap<String, UserRecord>> {
        self.users
            .get_or_init(|| async { RwLock::new(load_snapshot(&self.path).await) })
            .await
    }

    /// Look up a user by exact, case-sensitive username.
    pub async fn lookup(&self, username: &str) -> Option<UserRecord> {
        let users = self.users().await.read().await;
        users.get(username).cloned()
    }

    /// Store a new credential record, first registration wins.
    ///
    /// The snapshot is rewritten before the in-memory map changes; if the
    /// rewrite fails the store is exactly as it was.
    ///
    /// # Errors
    /// Returns an error when the snapshot cannot be written.
    pub async fn register(&self, record: UserRecord) -> Result<RegisterOutcome> {
        let mut users = self.users().await.write().await;
        if users.contains_key(&record.username) {
            return Ok(RegisterOutcome::Conflict);
        }

        let mut next = users.clone();
        next.insert(record.username.clone(), record.clone());
        persist_snapshot(&self.path, &next).await?;

        users.insert(record.username.clone(), record);
        Ok(RegisterOutcome::Registered)
    }

    /// Number of registered users; forces the lazy load.
    pub async fn user_count(&self) -> usize {
        self.users().await.read().await.len()
    }
}

/// Read the snapshot, treating a missing or broken file as an empty store.
async fn load_snapshot(path: &Path) -> HashMap<String, UserRecord> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("No user snapshot at {}, starting empty", path.display());
            return HashMap::new();
        }
        Err(err) => {
            warn!(
                "Failed to read user snapshot {}: {err}, starting empty",
                path.display()
            );
            return HashMap::new();
        }
    };

    match serde_json::from_slice::<HashMap<String, UserRecord>>(&raw) {
        Ok(users) => {
            info!("Loaded {} users from {}", users.len(), path.display());
            users
        }
        Err(err) => {
            warn!(
                "Ignoring malformed user snapshot {}: {err}",
                path.display()
            );
            HashMap::new()
        }
    }
}

/// Rewrite the whole snapshot durably: temp file, fsync, rename.
async fn persist_snapshot(path: &Path, users: &HashMap<String, UserRecord>) -> Result<()> {
    let json = serde_json::to_string_pretty(users).context("Failed to serialize user snapshot")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)
        .await
        .with_context(|| format!("Failed to create {}", tmp.display()))?;
    file.write_all(json.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("Failed to sync {}", tmp.display()))?;
    drop(file);

    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move {} into place", tmp.display()))?;
    Ok(())
}
