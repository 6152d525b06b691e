// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod file_utils;
pub mod ids;
pub mod mime_helper;
pub mod test_fixtures;

// Re-export commonly used items for convenience
pub use file_utils::{format_file_size, strip_extension};
pub use ids::generate_image_id;
pub use mime_helper::detect_mime_type;
