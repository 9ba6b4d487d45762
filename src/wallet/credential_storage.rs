// src/wallet/credential_storage.rs
//! Single-slot credential storage.
//!
//! Holds at most one delegated [`Credential`]. Writing a new one replaces
//! the previous record as a whole. Reads never fail: a missing, truncated or
//! otherwise malformed record reads back as absent.

use crate::error::Result;
use crate::models::credential::Credential;
use crate::wallet::key_management::KeyPair;
use log::warn;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed key the credential record is stored under.
pub const STORAGE_KEY: &str = "near-access-key";

/// Durable single-slot storage for the delegated credential.
///
/// Operations are synchronous and visible to the next call immediately.
/// There is no isolation between concurrent writers; callers serialize
/// issuance, revocation and signing themselves.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, or `None` when absent or unreadable.
    fn get(&self) -> Option<Credential>;

    /// Replaces the stored credential.
    fn put(&self, credential: &Credential) -> Result<()>;

    /// Removes the stored credential. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()>;
}

/// Parses a persisted record, treating anything incomplete as absent.
///
/// A record whose private key cannot be decoded would fail at signing time
/// after authorization already succeeded, so it is discarded here instead.
fn decode_record(raw: &str) -> Option<Credential> {
    let credential: Credential = match serde_json::from_str(raw) {
        Ok(credential) => credential,
        Err(e) => {
            warn!("Discarding malformed access key record: {}", e);
            return None;
        }
    };

    if let Err(e) = credential.secret_key.parse::<KeyPair>() {
        warn!("Discarding access key record with unusable private key: {}", e);
        return None;
    }

    Some(credential)
}

/// Credential store backed by a JSON file.
///
/// The record lives at `<dir>/near-access-key.json` and survives process
/// restarts. Writes go through a temporary file followed by a rename so a
/// crash mid-write never leaves a half-written record behind.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(FileCredentialStore {
            path: dir.join(format!("{}.json", STORAGE_KEY)),
        })
    }

    /// Location of the record file.
    ///
    /// # Returns
    /// `<dir>/near-access-key.json` for the directory given to [`Self::open`]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credential> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode_record(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn put(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string(credential)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local credential store.
///
/// Keeps the serialized record rather than the struct so reads go through
/// the same decoding path as the file store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    record: Mutex<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with raw record text, bypassing validation.
    pub fn with_raw_record(raw: impl Into<String>) -> Self {
        InMemoryCredentialStore {
            record: Mutex::new(Some(raw.into())),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.as_deref().and_then(decode_record)
    }

    fn put(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string(credential)?;
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
