// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Collaborators owned by the surrounding page.

use crate::dom::Document;
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::time::Duration;

pub const DEFAULT_SECTION: &str = "home";
pub const ADMIN_SECTION: &str = "admin";

/// The page's primary application object.
pub trait HostApp {
    fn is_initialized(&self) -> bool;
    fn current_section(&self) -> Option<String>;
    fn show_section(&self, section: &str);
}

/// Receives the "mode changed" broadcast so independently owned renderers
/// can re-run their own marking pass.
pub trait ModeListener {
    fn mode_changed(&self, doc: &mut Document, active: bool);
}

/// A host whose readiness and section are set by hand.
#[derive(Debug)]
pub struct StaticHost {
    initialized: Cell<bool>,
    section: RefCell<Option<String>>,
    shown: RefCell<Vec<String>>,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self::ready()
    }
}

impl StaticHost {
    pub fn ready() -> Self {
        Self {
            initialized: Cell::new(true),
            section: RefCell::new(Some(DEFAULT_SECTION.to_string())),
            shown: RefCell::new(Vec::new()),
        }
    }

    pub fn pending() -> Self {
        let host = Self::ready();
        host.initialized.set(false);
        host
    }

    pub fn mark_initialized(&self) {
        self.initialized.set(true);
    }

    pub fn set_section(&self, section: &str) {
        *self.section.borrow_mut() = Some(section.to_string());
    }

    /// Sections navigated to through `show_section`, in order.
    pub fn shown_sections(&self) -> Vec<String> {
        self.shown.borrow().clone()
    }
}

impl HostApp for StaticHost {
    fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    fn current_section(&self) -> Option<String> {
        self.section.borrow().clone()
    }

    fn show_section(&self, section: &str) {
        self.set_section(section);
        self.shown.borrow_mut().push(section.to_string());
    }
}

/// Polls the host until it reports ready or the attempts run out.
///
/// Returns whether the host was ready; callers proceed either way.
pub async fn wait_for_host(host: &dyn HostApp, interval: Duration, attempts: u32) -> bool {
    for attempt in 0..attempts {
        if host.is_initialized() {
            debug!("Host ready after {} polls", attempt);
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    if host.is_initialized() {
        return true;
    }
    warn!(
        "Host not initialized after {} polls, wiring the editing layer anyway",
        attempts
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_for_host_gives_up_after_bounded_attempts() {
        let host = StaticHost::pending();
        let started = tokio::time::Instant::now();
        let ready = wait_for_host(&host, Duration::from_millis(100), 50).await;
        assert!(!ready);
        assert_eq!(started.elapsed(), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_host_returns_immediately_when_ready() {
        let host = StaticHost::ready();
        let started = tokio::time::Instant::now();
        assert!(wait_for_host(&host, Duration::from_millis(100), 50).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn show_section_records_navigation() {
        let host = StaticHost::ready();
        host.show_section(ADMIN_SECTION);
        assert_eq!(host.current_section().as_deref(), Some(ADMIN_SECTION));
        assert_eq!(host.shown_sections(), vec![ADMIN_SECTION.to_string()]);
    }
}
