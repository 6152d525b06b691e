// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Key/value persistence over a session-scoped and a durable store.
//!
//! Keys are plain literals with no versioning; a schema change needs a new
//! key name.

mod flat_file;
mod memory;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::rc::Rc;

pub const SESSION_KEY: &str = "cms_login";
pub const CONTENT_LATEST_KEY: &str = "cms_content_latest";
pub const IMAGES_KEY: &str = "cms_images";
pub const BACKUP_KEY_PREFIX: &str = "cms_backup_";
pub const DEBUG_MODE_KEY: &str = "cms_debug_mode";

#[derive(Debug)]
pub enum StorageError {
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    Serialization(String),
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QuotaExceeded {
                key,
                needed,
                available,
            } => write!(
                f,
                "storage quota exceeded writing '{}' ({} bytes needed, {} available)",
                key, needed, available
            ),
            StorageError::Serialization(message) => {
                write!(f, "storage serialization failed: {}", message)
            }
            StorageError::Io(err) => write!(f, "storage I/O failed: {}", err),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// String-keyed blob store with the semantics of web storage: methods take
/// `&self`, writes replace the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Total bytes held by keys and values.
    fn used_bytes(&self) -> Result<usize, StorageError> {
        let mut total = 0;
        for key in self.keys()? {
            let value = self.get(&key)?.unwrap_or_default();
            total += key.len() + value.len();
        }
        Ok(total)
    }
}

pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let decoded = serde_json::from_str(&raw)?;
    Ok(Some(decoded))
}

pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value)?;
    store.set(key, &encoded)
}

/// The two stores the editing core persists to.
#[derive(Clone)]
pub struct Stores {
    /// Cleared when the browsing session ends; holds the login ticket.
    pub session: Rc<dyn KeyValueStore>,
    /// Survives restarts; holds content, images, backups and flags.
    pub durable: Rc<dyn KeyValueStore>,
}

impl Stores {
    pub fn new(session: Rc<dyn KeyValueStore>, durable: Rc<dyn KeyValueStore>) -> Self {
        Self { session, durable }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::new()), Rc::new(MemoryStore::new()))
    }
}
