// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::path::Path;

/// Detect MIME type from the file's magic bytes, falling back to its extension.
pub fn detect_mime_type(file_path: &Path, file_content: &[u8]) -> String {
    if let Some(kind) = infer::get(file_content) {
        return kind.mime_type().to_string();
    }

    if let Some(guessed) = mime_guess::from_path(file_path).first() {
        return guessed.to_string();
    }

    "application/octet-stream".to_string()
}

/// Splits a `data:<mime>;base64,<payload>` URL.
pub fn parse_data_url(data_url: &str) -> Option<(&str, &str)> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    Some((mime, payload))
}
