// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Login check and the session ticket kept in session storage.
//!
//! The credential table is fixed and there is no lockout or rate limit.

use crate::error::{CmsError, CmsResult};
use crate::storage::{self, KeyValueStore, StorageError};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SESSION_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CREDENTIALS: [(&str, &str, Role); 2] = [
    ("admin", "leewookyu2026!", Role::Admin),
    ("editor", "jinan2026!", Role::Editor),
];

/// Exact match against the credential table.
pub fn authenticate(username: &str, password: &str) -> CmsResult<Role> {
    if username.is_empty() || password.is_empty() {
        return Err(CmsError::validation("Enter a username and password."));
    }
    CREDENTIALS
        .iter()
        .find(|(user, secret, _)| *user == username && *secret == password)
        .map(|(_, _, role)| *role)
        .ok_or_else(|| {
            debug!("Rejected login for '{}'", username);
            CmsError::authentication("Invalid username or password.")
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl Session {
    pub fn new(user: &str, now: DateTime<Utc>) -> Self {
        Self {
            user: user.to_string(),
            timestamp: now,
            version: SESSION_VERSION.to_string(),
        }
    }

    /// Expired once `ttl` has fully elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp >= ttl
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        storage::write_json(store, storage::SESSION_KEY, self)
    }

    /// Returns the stored session while it is still fresh. An expired record
    /// stays in storage until it is cleared explicitly.
    pub fn load_valid(store: &dyn KeyValueStore, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let session = match storage::read_json::<Session>(store, storage::SESSION_KEY) {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(err) => {
                warn!("Ignoring unreadable session record: {}", err);
                return None;
            }
        };
        if session.is_expired(now, ttl) {
            info!("Session for '{}' has expired", session.user);
            return None;
        }
        Some(session)
    }

    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(storage::SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::MemoryStore;

    #[test]
    fn credential_table_is_matched_exactly() {
        assert_eq!(authenticate("editor", "jinan2026!").expect("editor"), Role::Editor);
        assert_eq!(authenticate("admin", "leewookyu2026!").expect("admin"), Role::Admin);
        let err = authenticate("editor", "wrongpass").expect_err("bad password");
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(authenticate("Editor", "jinan2026!").is_err());
        assert_eq!(
            authenticate("", "x").expect_err("empty").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn session_record_uses_the_stored_field_names() {
        let now = Utc::now();
        let json = serde_json::to_value(Session::new("editor", now)).expect("serialize");
        assert_eq!(json["user"], "editor");
        assert_eq!(json["version"], "1.0");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn expired_sessions_stay_stored_but_are_not_valid() {
        let store = MemoryStore::new();
        let start = Utc::now();
        let ttl = Duration::hours(24);
        Session::new("admin", start).save(&store).expect("save");

        let fresh = start + Duration::hours(23);
        assert_eq!(
            Session::load_valid(&store, fresh, ttl).map(|s| s.user),
            Some("admin".to_string())
        );
        let stale = start + Duration::hours(24) + Duration::seconds(1);
        assert!(Session::load_valid(&store, stale, ttl).is_none());
        assert!(store.get(storage::SESSION_KEY).expect("get").is_some());

        Session::clear(&store).expect("clear");
        assert!(store.get(storage::SESSION_KEY).expect("get").is_none());
    }
}
