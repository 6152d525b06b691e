// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Document-level click listeners.
//!
//! Listeners only inspect the page and the event; each returns the action its
//! owner performs once dispatch has finished. Every router reads the admin
//! flag at click time.

use super::gesture::ActivationGesture;
use crate::clock::Clock;
use crate::dom::events::{ClickEvent, ClickListener};
use crate::dom::{Document, NodeId, Selector};
use crate::editor;
use crate::images;
use crate::registry::{group_selector, image_trigger_selector};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const LOGO_ID: &str = "app-logo";
pub const ADMIN_BUTTON_ID: &str = "admin-mode-btn";
pub const LOGIN_MODAL_ID: &str = "admin-login-modal";
pub const LOGIN_CANCEL_ID: &str = "admin-login-cancel";
pub const LOGIN_SUBMIT_ID: &str = "admin-login-submit";
pub const SAVE_CONTENT_ID: &str = "save-content";
pub const CANCEL_EDIT_ID: &str = "cancel-edit";

/// Shared "admin mode is on" flag.
pub type AdminFlag = Rc<Cell<bool>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// `region` is the nearest group around `trigger`, or the trigger itself.
    OpenImageManager { region: NodeId, trigger: NodeId },
    EditGroup(NodeId),
    RevealAdminToggle,
    AdminButton,
    SubmitLogin,
    CancelLogin,
    SaveEdit,
    CancelEdit,
    /// A click somewhere inside the image manager modal.
    ImageModal(NodeId),
}

fn within(doc: &Document, target: NodeId, dom_id: &str) -> bool {
    doc.closest(target, &Selector::id(dom_id)).is_some()
}

/// Wins every click on an image trigger, including clicks on triggers nested
/// inside editable groups.
pub struct ImageRouter {
    active: AdminFlag,
}

impl ImageRouter {
    pub fn new(active: AdminFlag) -> Self {
        Self { active }
    }
}

impl ClickListener<ClickAction> for ImageRouter {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<ClickAction> {
        if !self.active.get() {
            return None;
        }
        let trigger = doc.closest(event.target(), &image_trigger_selector())?;
        event.prevent_default();
        event.stop_immediate_propagation();
        let region = doc.closest(trigger, &group_selector()).unwrap_or(trigger);
        Some(ClickAction::OpenImageManager { region, trigger })
    }
}

pub struct ContentRouter {
    active: AdminFlag,
}

impl ContentRouter {
    pub fn new(active: AdminFlag) -> Self {
        Self { active }
    }
}

impl ClickListener<ClickAction> for ContentRouter {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<ClickAction> {
        if !self.active.get() {
            return None;
        }
        let target = event.target();
        if doc.closest(target, &image_trigger_selector()).is_some() {
            return None;
        }
        let group = doc.closest(target, &group_selector())?;
        event.prevent_default();
        event.stop_propagation();
        Some(ClickAction::EditGroup(group))
    }
}

/// Counts logo clicks while admin mode is off; the completing click is
/// swallowed so the logo's own navigation does not run.
pub struct LogoGesture {
    active: AdminFlag,
    gesture: Rc<RefCell<ActivationGesture>>,
    clock: Rc<dyn Clock>,
}

impl LogoGesture {
    pub fn new(
        active: AdminFlag,
        gesture: Rc<RefCell<ActivationGesture>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            active,
            gesture,
            clock,
        }
    }
}

impl ClickListener<ClickAction> for LogoGesture {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<ClickAction> {
        if self.active.get() || !within(doc, event.target(), LOGO_ID) {
            return None;
        }
        if !self.gesture.borrow_mut().register(self.clock.now()) {
            return None;
        }
        event.prevent_default();
        event.stop_propagation();
        Some(ClickAction::RevealAdminToggle)
    }
}

pub struct AdminButton;

impl ClickListener<ClickAction> for AdminButton {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<ClickAction> {
        if !within(doc, event.target(), ADMIN_BUTTON_ID) {
            return None;
        }
        event.prevent_default();
        event.stop_propagation();
        Some(ClickAction::AdminButton)
    }
}

/// Buttons and backdrops of the login, editor and image modals.
pub struct ModalControls;

impl ClickListener<ClickAction> for ModalControls {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<ClickAction> {
        let target = event.target();
        let backdrop = doc.has_class(target, "popup-overlay");
        let action = match doc.dom_id(target) {
            Some(LOGIN_MODAL_ID) if backdrop => ClickAction::CancelLogin,
            Some(editor::MODAL_ID) if backdrop => ClickAction::CancelEdit,
            _ if within(doc, target, LOGIN_CANCEL_ID) => ClickAction::CancelLogin,
            _ if within(doc, target, LOGIN_SUBMIT_ID) => ClickAction::SubmitLogin,
            _ if within(doc, target, SAVE_CONTENT_ID) => ClickAction::SaveEdit,
            _ if within(doc, target, CANCEL_EDIT_ID) => ClickAction::CancelEdit,
            _ if within(doc, target, images::MODAL_ID) => ClickAction::ImageModal(target),
            _ => return None,
        };
        Some(action)
    }
}
