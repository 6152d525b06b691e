// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::storage::StorageError;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the operator; nothing was mutated.
    Validation,
    /// Expected page markup is missing; a template defect, logged only.
    MissingDom,
    /// A durable write failed; in-memory state is ahead of storage.
    Storage,
    /// Login rejected.
    Authentication,
}

#[derive(Debug, Clone)]
pub struct CmsError {
    kind: ErrorKind,
    message: String,
}

impl CmsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn missing_dom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingDom, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the operator should see this failure.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self.kind, ErrorKind::MissingDom)
    }
}

impl fmt::Display for CmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)
    }
}

impl Error for CmsError {}

impl From<StorageError> for CmsError {
    fn from(err: StorageError) -> Self {
        CmsError::storage(err.to_string())
    }
}

pub type CmsResult<T> = Result<T, CmsError>;
