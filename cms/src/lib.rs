// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod admin;
pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dom;
pub mod editor;
pub mod error;
pub mod host;
pub mod images;
pub mod notify;
pub mod registry;
pub mod storage;
pub mod util;

pub use app::{CmsApp, CmsAppBuilder};
pub use config::CmsConfig;
pub use error::{CmsError, CmsResult, ErrorKind};
