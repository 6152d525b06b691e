// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use uuid::Uuid;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// `img_<unix millis>_<9 base-36 chars>`.
pub fn generate_image_id(now: DateTime<Utc>) -> String {
    format!("img_{}_{}", now.timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    let bytes = random_bytes::<SUFFIX_LEN>();
    bytes
        .iter()
        .map(|byte| SUFFIX_ALPHABET[*byte as usize % SUFFIX_ALPHABET.len()] as char)
        .collect()
}

/// OS randomness, falling back to a v4 UUID when the OS source fails.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    if let Err(err) = getrandom::fill(&mut buf) {
        log::warn!("OS random source unavailable ({}), using UUID bytes", err);
        let mut filled = 0;
        while filled < N {
            let uuid = Uuid::new_v4();
            let chunk = uuid.as_bytes();
            let take = chunk.len().min(N - filled);
            buf[filled..filled + take].copy_from_slice(&chunk[..take]);
            filled += take;
        }
    }
    buf
}
