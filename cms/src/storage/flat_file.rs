// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{KeyValueStore, StorageError};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENTRY_SUFFIX: &str = ".json";
const MAX_TEMP_ATTEMPTS: u32 = 100;

/// Durable store keeping one file per key under a directory.
///
/// File names are the URL-safe base64 of the key so backup keys with
/// timestamps stay portable.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    dir: PathBuf,
}

impl FlatFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", URL_SAFE_NO_PAD.encode(key), ENTRY_SUFFIX))
    }
}

impl KeyValueStore for FlatFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        let (mut file, temp_path) = create_temp_file(&self.dir, key)?;
        if let Err(err) = file.write_all(value.as_bytes()).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let Some(encoded) = name.strip_suffix(ENTRY_SUFFIX) else {
                continue;
            };
            match URL_SAFE_NO_PAD
                .decode(encoded)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
            {
                Some(key) => keys.push(key),
                None => log::warn!("Skipping unrecognized store entry: {}", name),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn create_temp_file(dir: &Path, key: &str) -> Result<(fs::File, PathBuf), StorageError> {
    let stem = URL_SAFE_NO_PAD.encode(key);
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = dir.join(format!(".{}.tmp.{}.{}", stem, std::process::id(), attempt));
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path);
        match file {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(StorageError::Io(std::io::Error::other(format!(
        "failed to create temp file for '{}' after multiple attempts",
        key
    ))))
}
