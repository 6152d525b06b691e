// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::UploadConfig;
use crate::error::{CmsError, CmsResult};
use crate::util::format_file_size;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file handed to the upload pipeline, with the type and size the picker
/// reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub source: UploadSource,
}

impl UploadFile {
    pub fn from_bytes(name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            source: UploadSource::Bytes(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mime_type: &str, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type: mime_type.to_string(),
            size,
            source: UploadSource::Path(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_file_size_bytes,
            allowed_types: config.allowed_types.clone(),
        }
    }
}

impl UploadPolicy {
    pub fn validate(&self, file: &UploadFile) -> CmsResult<()> {
        if !self.allowed_types.iter().any(|allowed| *allowed == file.mime_type) {
            return Err(CmsError::validation(format!(
                "Unsupported file type: {} ({})",
                file.name, file.mime_type
            )));
        }
        if file.size > self.max_bytes {
            return Err(CmsError::validation(format!(
                "File is too large: {} ({})",
                file.name,
                format_file_size(file.size)
            )));
        }
        Ok(())
    }
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Reads the file and encodes it as a base64 data URL.
pub async fn read_data_url(file: &UploadFile) -> CmsResult<String> {
    let bytes = match &file.source {
        UploadSource::Bytes(bytes) => {
            tokio::task::yield_now().await;
            bytes.clone()
        }
        UploadSource::Path(path) => tokio::fs::read(path).await.map_err(|err| {
            warn!("Failed to read {}: {}", path.display(), err);
            CmsError::validation(format!("Upload failed: {} could not be read", file.name))
        })?,
    };
    debug!("Read {} ({} bytes)", file.name, bytes.len());
    Ok(to_data_url(&file.mime_type, &bytes))
}
