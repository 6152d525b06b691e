// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::error::{CmsError, CmsResult};
use crate::storage::{self, KeyValueStore, StorageError};
use crate::util::strip_extension;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: String,
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub upload_date: DateTime<Utc>,
}

impl UploadedImage {
    pub fn default_alt(&self) -> String {
        strip_extension(&self.name).to_string()
    }
}

/// Uploaded and generated images keyed by id, mirrored wholesale into
/// [`storage::IMAGES_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageCatalog {
    images: BTreeMap<String, UploadedImage>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unreadable catalogs load as empty so the page keeps working.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match storage::read_json::<BTreeMap<String, UploadedImage>>(store, storage::IMAGES_KEY) {
            Ok(Some(images)) => {
                debug!("Loaded {} stored images", images.len());
                Self { images }
            }
            Ok(None) => Self::default(),
            Err(err) => {
                error!("Failed to load stored images: {}", err);
                Self::default()
            }
        }
    }

    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        storage::write_json(store, storage::IMAGES_KEY, &self.images)?;
        debug!("Persisted {} images", self.images.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UploadedImage> {
        self.images.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadedImage> {
        self.images.values()
    }

    pub fn insert(&mut self, image: UploadedImage) {
        self.images.insert(image.id.clone(), image);
    }

    pub fn remove(&mut self, id: &str) -> Option<UploadedImage> {
        self.images.remove(id)
    }

    pub fn total_bytes(&self) -> u64 {
        self.images.values().map(|image| image.size).sum()
    }

    /// Adds every entry of `imported`; imported entries replace existing ones
    /// with the same id. Returns how many entries were merged.
    pub fn merge(&mut self, imported: BTreeMap<String, UploadedImage>) -> usize {
        let count = imported.len();
        self.images.extend(imported);
        count
    }

    pub fn to_export_json(&self) -> CmsResult<String> {
        serde_json::to_string_pretty(&self.images)
            .map_err(|err| CmsError::storage(format!("Failed to serialize images: {}", err)))
    }
}

pub fn parse_import(json: &str) -> CmsResult<BTreeMap<String, UploadedImage>> {
    serde_json::from_str(json)
        .map_err(|err| CmsError::validation(format!("Image data could not be imported: {}", err)))
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("cms_images_{}.json", date.format("%Y-%m-%d"))
}
