// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Admin mode: login, the activation gesture and the click routers.
//!
//! Login persists across reloads through the session ticket; admin mode
//! itself always starts off.

pub mod affordance;
pub mod gesture;
pub mod routers;
pub mod session;

pub use affordance::Highlighted;
pub use gesture::ActivationGesture;
pub use routers::{AdminFlag, ClickAction};
pub use session::{Role, Session};

use crate::clock::Clock;
use crate::config::CmsConfig;
use crate::dom::events::{ClickEvent, ClickPipeline, ListenerId, Phase};
use crate::dom::{Document, NodeId, Selector};
use crate::error::{CmsError, CmsResult, ErrorKind};
use crate::host::{ADMIN_SECTION, DEFAULT_SECTION, HostApp, ModeListener};
use crate::registry::sweep::{MarkerSweep, SweepReport};
use crate::storage::KeyValueStore;
use chrono::Duration;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const TOGGLE_ID: &str = "admin-toggle";
pub const NAV_ID: &str = "admin-nav";
pub const USERNAME_ID: &str = "admin-username";
pub const PASSWORD_ID: &str = "admin-password";
pub const ADMIN_MODE_CLASS: &str = "admin-mode";

const HIDDEN_CLASS: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Anonymous,
    /// The login modal is showing.
    Authenticating,
    AuthenticatedInactive,
    AuthenticatedActive,
}

pub struct AdminController {
    state: AdminState,
    session: Option<Session>,
    active: AdminFlag,
    gesture: Rc<RefCell<ActivationGesture>>,
    clock: Rc<dyn Clock>,
    session_ttl: Duration,
    sweep: MarkerSweep,
    mode_listeners: Vec<Rc<dyn ModeListener>>,
    pipeline: ClickPipeline<ClickAction>,
    routers: Option<(ListenerId, ListenerId)>,
}

impl AdminController {
    pub fn new(config: &CmsConfig, clock: Rc<dyn Clock>) -> Self {
        let active: AdminFlag = Rc::new(Cell::new(false));
        let gesture = Rc::new(RefCell::new(ActivationGesture::from_config(&config.gesture)));
        let mut pipeline = ClickPipeline::new();
        pipeline.add(
            Phase::Capture,
            Box::new(routers::LogoGesture::new(
                active.clone(),
                gesture.clone(),
                clock.clone(),
            )),
        );
        pipeline.add(Phase::Bubble, Box::new(routers::AdminButton));
        pipeline.add(Phase::Bubble, Box::new(routers::ModalControls));
        Self {
            state: AdminState::Anonymous,
            session: None,
            active,
            gesture,
            clock,
            session_ttl: config.session_ttl(),
            sweep: MarkerSweep::default(),
            mode_listeners: Vec::new(),
            pipeline,
            routers: None,
        }
    }

    pub fn with_sweep(mut self, sweep: MarkerSweep) -> Self {
        self.sweep = sweep;
        self
    }

    pub fn add_mode_listener(&mut self, listener: Rc<dyn ModeListener>) {
        self.mode_listeners.push(listener);
    }

    pub fn state(&self) -> AdminState {
        self.state
    }

    /// Checks the session's age on every call, so a ticket that expired
    /// while the page was open reads as logged out.
    pub fn is_logged_in(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.is_expired(self.clock.now(), self.session_ttl))
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn flag(&self) -> AdminFlag {
        self.active.clone()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.user.as_str())
    }

    pub fn routers_installed(&self) -> bool {
        self.routers.is_some()
    }

    pub fn gesture_count(&self) -> u32 {
        self.gesture.borrow().count_at(self.clock.now())
    }

    pub fn dispatch(&self, doc: &Document, target: NodeId) -> (ClickEvent, Vec<ClickAction>) {
        self.pipeline.dispatch(doc, target)
    }

    /// Picks up a fresh session ticket. Admin mode stays off either way.
    pub fn restore_session(&mut self, store: &dyn KeyValueStore) -> bool {
        match Session::load_valid(store, self.clock.now(), self.session_ttl) {
            Some(session) => {
                info!("Restored session for '{}'", session.user);
                self.session = Some(session);
                self.state = AdminState::AuthenticatedInactive;
                true
            }
            None => false,
        }
    }

    pub fn reveal_toggle(&self, doc: &mut Document) -> CmsResult<()> {
        let toggle = lookup(doc, TOGGLE_ID)?;
        doc.remove_class(toggle, HIDDEN_CLASS);
        info!("Admin toggle revealed");
        Ok(())
    }

    pub fn show_login(&mut self, doc: &mut Document) -> CmsResult<()> {
        let modal = lookup(doc, routers::LOGIN_MODAL_ID)?;
        doc.remove_class(modal, HIDDEN_CLASS);
        if let Some(username) = doc.element_by_id(USERNAME_ID) {
            doc.focus(username);
        }
        if self.state == AdminState::Anonymous {
            self.state = AdminState::Authenticating;
        }
        Ok(())
    }

    /// Hides the login modal and resets its form.
    pub fn hide_login(&mut self, doc: &mut Document) {
        if let Some(modal) = doc.element_by_id(routers::LOGIN_MODAL_ID) {
            doc.add_class(modal, HIDDEN_CLASS);
        }
        for id in [USERNAME_ID, PASSWORD_ID] {
            if let Some(field) = doc.element_by_id(id) {
                doc.set_value(field, "");
            }
        }
        if self.state == AdminState::Authenticating {
            self.state = AdminState::Anonymous;
        }
    }

    /// Logs in with the values typed into the login modal.
    pub fn submit_login(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
    ) -> CmsResult<Role> {
        let read = |id: &str| {
            doc.element_by_id(id)
                .and_then(|field| doc.value(field))
                .unwrap_or_default()
        };
        let username = read(USERNAME_ID).trim().to_string();
        let password = read(PASSWORD_ID);
        self.login(doc, store, &username, &password)
    }

    /// On success records the session and turns admin mode on. A rejected
    /// password is cleared from the form.
    pub fn login(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
        username: &str,
        password: &str,
    ) -> CmsResult<Role> {
        let role = match session::authenticate(username, password) {
            Ok(role) => role,
            Err(err) => {
                if err.kind() == ErrorKind::Authentication
                    && let Some(field) = doc.element_by_id(PASSWORD_ID)
                {
                    doc.set_value(field, "");
                }
                return Err(err);
            }
        };

        let session = Session::new(username, self.clock.now());
        if let Err(err) = session.save(store) {
            warn!("Session could not be stored: {}", err);
        }
        info!("Logged in as '{}' ({})", username, role);
        self.session = Some(session);
        self.hide_login(doc);
        self.state = AdminState::AuthenticatedInactive;
        self.enter(doc)?;
        Ok(role)
    }

    /// Turns admin mode on: page class, marker sweep, the mode broadcast,
    /// visual cues and, on first use, the click routers.
    pub fn enter(&mut self, doc: &mut Document) -> CmsResult<Highlighted> {
        if !self.is_logged_in() {
            return Err(CmsError::authentication("Log in to use admin mode."));
        }
        self.active.set(true);
        self.state = AdminState::AuthenticatedActive;
        let body = doc.body();
        doc.add_class(body, ADMIN_MODE_CLASS);
        if let Some(nav) = doc.element_by_id(NAV_ID) {
            doc.remove_class(nav, HIDDEN_CLASS);
        }

        self.sweep.reconcile(doc);
        self.broadcast(doc, true);
        let highlighted = affordance::highlight(doc);
        self.install_routers();
        self.update_button(doc);
        info!(
            "Admin mode on ({} groups, {} image triggers)",
            highlighted.groups, highlighted.triggers
        );
        Ok(highlighted)
    }

    /// Turns admin mode off and leaves the admin-only section.
    pub fn exit(&mut self, doc: &mut Document, host: &dyn HostApp) {
        self.active.set(false);
        if self.state == AdminState::AuthenticatedActive {
            self.state = AdminState::AuthenticatedInactive;
        }
        let body = doc.body();
        doc.remove_class(body, ADMIN_MODE_CLASS);
        if let Some(nav) = doc.element_by_id(NAV_ID) {
            doc.add_class(nav, HIDDEN_CLASS);
        }
        affordance::clear(doc);
        self.broadcast(doc, false);
        if host.current_section().as_deref() == Some(ADMIN_SECTION) {
            host.show_section(DEFAULT_SECTION);
        }
        self.update_button(doc);
        info!("Admin mode off");
    }

    /// Returns whether admin mode is on afterwards.
    pub fn toggle(&mut self, doc: &mut Document, host: &dyn HostApp) -> CmsResult<bool> {
        if self.is_active() {
            self.exit(doc, host);
        } else {
            self.enter(doc)?;
        }
        Ok(self.is_active())
    }

    pub fn logout(&mut self, doc: &mut Document, store: &dyn KeyValueStore, host: &dyn HostApp) {
        if self.is_active() {
            self.exit(doc, host);
        }
        if let Err(err) = Session::clear(store) {
            warn!("Session could not be cleared: {}", err);
        }
        if let Some(session) = self.session.take() {
            info!("Logged out '{}'", session.user);
        }
        self.state = AdminState::Anonymous;
        self.update_button(doc);
    }

    /// Re-runs the marker sweep; while admin mode is on, new groups get
    /// their cues too.
    pub fn resweep(&self, doc: &mut Document) -> SweepReport {
        let report = self.sweep.reconcile(doc);
        if self.is_active() {
            affordance::highlight(doc);
        }
        report
    }

    pub fn button_label(&self) -> &'static str {
        if !self.is_logged_in() {
            "Admin"
        } else if self.is_active() {
            "Exit"
        } else {
            "Manage"
        }
    }

    pub fn update_button(&self, doc: &mut Document) {
        let Some(button) = doc.element_by_id(routers::ADMIN_BUTTON_ID) else {
            return;
        };
        let label = doc.query(button, &Selector::tag("span")).unwrap_or(button);
        doc.set_text_content(label, self.button_label());
    }

    fn broadcast(&self, doc: &mut Document, active: bool) {
        for listener in &self.mode_listeners {
            listener.mode_changed(doc, active);
        }
    }

    fn install_routers(&mut self) {
        if self.routers.is_some() {
            return;
        }
        let image = self.pipeline.add(
            Phase::Capture,
            Box::new(routers::ImageRouter::new(self.active.clone())),
        );
        let content = self.pipeline.add(
            Phase::Capture,
            Box::new(routers::ContentRouter::new(self.active.clone())),
        );
        debug!("Click routers installed");
        self.routers = Some((image, content));
    }
}

fn lookup(doc: &Document, id: &str) -> CmsResult<NodeId> {
    doc.element_by_id(id)
        .ok_or_else(|| CmsError::missing_dom(format!("admin element #{} not found", id)))
}
