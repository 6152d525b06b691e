// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use campaign_cms::admin::routers::{
    ADMIN_BUTTON_ID, CANCEL_EDIT_ID, LOGIN_CANCEL_ID, LOGIN_MODAL_ID, LOGIN_SUBMIT_ID, LOGO_ID,
    SAVE_CONTENT_ID,
};
use campaign_cms::admin::{NAV_ID, PASSWORD_ID, TOGGLE_ID, USERNAME_ID};
use campaign_cms::clock::{Clock, ManualClock};
use campaign_cms::dom::{Document, NodeId, Selector};
use campaign_cms::editor;
use campaign_cms::host::StaticHost;
use campaign_cms::notify::RecordingAffordances;
use campaign_cms::registry::{
    FIELD_ATTR, GROUP_ATTR, IMAGE_ROLE_ATTR, IMAGE_TRIGGER_CLASS, PLACEHOLDER_CLASS,
    REGION_ID_ATTR,
};
use campaign_cms::storage::{MemoryStore, Stores};
use campaign_cms::{CmsApp, CmsConfig};
use chrono::{TimeZone, Utc};
use std::rc::Rc;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "leewookyu2026!";
pub const EDITOR_USER: &str = "editor";
pub const EDITOR_PASSWORD: &str = "jinan2026!";

pub const HEADER_REGION_ID: &str = "header-top-banner";

/// A campaign landing page with every piece of markup the editing layer
/// expects, wired to in-memory stores and a manual clock.
pub struct TestPage {
    pub app: CmsApp,
    pub clock: Rc<ManualClock>,
    pub affordances: Rc<RecordingAffordances>,
    pub session: Rc<MemoryStore>,
    pub durable: Rc<MemoryStore>,
    pub host: Rc<StaticHost>,
}

impl TestPage {
    pub fn new() -> Self {
        Self::with_stores(Rc::new(MemoryStore::new()), Rc::new(MemoryStore::new()))
    }

    /// Builds the page over existing stores, as a reload would.
    pub fn with_stores(session: Rc<MemoryStore>, durable: Rc<MemoryStore>) -> Self {
        Self::build(campaign_page(), session, durable, start_clock())
    }

    /// Builds a page from custom markup with fresh stores.
    pub fn with_document(doc: Document) -> Self {
        let stores = (Rc::new(MemoryStore::new()), Rc::new(MemoryStore::new()));
        Self::build(doc, stores.0, stores.1, start_clock())
    }

    pub fn reload(&self) -> Self {
        let clock = Rc::new(ManualClock::new(self.clock.now()));
        Self::build(campaign_page(), self.session.clone(), self.durable.clone(), clock)
    }

    fn build(
        doc: Document,
        session: Rc<MemoryStore>,
        durable: Rc<MemoryStore>,
        clock: Rc<ManualClock>,
    ) -> Self {
        let affordances = Rc::new(RecordingAffordances::new(true));
        let host = Rc::new(StaticHost::ready());
        let mut app = CmsApp::builder(doc)
            .config(CmsConfig::default())
            .stores(Stores::new(session.clone(), durable.clone()))
            .clock(clock.clone())
            .affordances(affordances.clone())
            .host(host.clone())
            .build();
        app.initialize();
        Self {
            app,
            clock,
            affordances,
            session,
            durable,
            host,
        }
    }

    pub fn by_id(&self, id: &str) -> NodeId {
        self.app
            .doc()
            .element_by_id(id)
            .unwrap_or_else(|| panic!("#{} missing", id))
    }

    pub fn group(&self, group_id: &str) -> NodeId {
        let doc = self.app.doc();
        doc.query(doc.root(), &Selector::attr_eq(GROUP_ATTR, group_id))
            .unwrap_or_else(|| panic!("group '{}' missing", group_id))
    }

    pub fn field(&self, group_id: &str, field: &str) -> NodeId {
        let group = self.group(group_id);
        self.app
            .doc()
            .query(group, &Selector::attr_eq(FIELD_ATTR, field))
            .unwrap_or_else(|| panic!("field '{}.{}' missing", group_id, field))
    }

    pub fn text(&self, node: NodeId) -> String {
        self.app.doc().text_content(node)
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        let node = self.by_id(id);
        self.app.doc().has_class(node, "hidden")
    }

    pub fn type_into(&mut self, id: &str, value: &str) {
        let node = self.by_id(id);
        self.app.doc_mut().set_value(node, value);
    }

    pub fn click_id(&mut self, id: &str) {
        let node = self.by_id(id);
        self.app.click(node);
    }

    /// Opens the login modal from the admin button and submits it.
    pub fn log_in_through_modal(&mut self, user: &str, password: &str) {
        self.click_id(ADMIN_BUTTON_ID);
        self.type_into(USERNAME_ID, user);
        self.type_into(PASSWORD_ID, password);
        self.click_id(LOGIN_SUBMIT_ID);
    }

    pub fn header_region(&self) -> NodeId {
        let doc = self.app.doc();
        doc.query(doc.root(), &Selector::attr_eq(REGION_ID_ATTR, HEADER_REGION_ID))
            .expect("header region")
    }

    /// Inline images (`img` elements) directly or indirectly inside `node`.
    pub fn images_in(&self, node: NodeId) -> Vec<NodeId> {
        self.app.doc().query_all(node, &Selector::tag("img"))
    }
}

fn start_clock() -> Rc<ManualClock> {
    Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ))
}

/// PNG signature padded to `size` bytes.
pub fn png_bytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(size.max(bytes.len()), 0);
    bytes
}

pub fn campaign_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let header = doc.append_element(body, "header", &[("class", "app-header")]);
    let logo = doc.append_element(header, "a", &[("id", LOGO_ID), ("href", "#home")]);
    let logo_text = doc.append_element(logo, "span", &[("class", "logo-text")]);
    doc.append_text(logo_text, "Lee for Mayor");

    let toggle = doc.append_element(header, "div", &[("id", TOGGLE_ID), ("class", "hidden")]);
    let button = doc.append_element(toggle, "button", &[("id", ADMIN_BUTTON_ID)]);
    doc.append_element(button, "span", &[]);
    let nav = doc.append_element(header, "nav", &[("id", NAV_ID), ("class", "hidden")]);
    doc.append_text(nav, "Dashboard");

    let banner_classes = format!("header-top {}", IMAGE_TRIGGER_CLASS);
    let banner = doc.append_element(
        body,
        "div",
        &[
            ("class", banner_classes.as_str()),
            (IMAGE_ROLE_ATTR, "header-top"),
            (REGION_ID_ATTR, HEADER_REGION_ID),
        ],
    );
    let placeholder = doc.append_element(banner, "div", &[("class", PLACEHOLDER_CLASS)]);
    doc.append_text(placeholder, "Add header image");

    let hero = doc.append_element(
        body,
        "section",
        &[("class", "hero-section"), (GROUP_ATTR, "hero")],
    );
    let title = doc.append_element(hero, "h1", &[(FIELD_ATTR, "title")]);
    doc.append_text(title, "A city that works for everyone");
    let subtitle = doc.append_element(hero, "p", &[(FIELD_ATTR, "subtitle")]);
    doc.append_text(subtitle, "Vote on June 3rd");

    let policies = doc.append_element(body, "section", &[("id", "policies")]);
    for (heading, summary) in [
        ("Clean water", "Replace every lead pipe by 2030."),
        ("Safe roads", "Protected bike lanes on all arterials."),
    ] {
        let card = doc.append_element(policies, "div", &[("class", "policy-card")]);
        let h4 = doc.append_element(card, "h4", &[]);
        doc.append_text(h4, heading);
        let p = doc.append_element(card, "p", &[]);
        doc.append_text(p, summary);
    }

    let notice = doc.append_element(body, "div", &[(GROUP_ATTR, "notice")]);
    doc.append_text(notice, "Polls open at 7am.");

    let login = doc.append_element(
        body,
        "div",
        &[("id", LOGIN_MODAL_ID), ("class", "popup-overlay hidden")],
    );
    doc.append_element(login, "input", &[("id", USERNAME_ID), ("type", "text")]);
    doc.append_element(login, "input", &[("id", PASSWORD_ID), ("type", "password")]);
    let cancel = doc.append_element(login, "button", &[("id", LOGIN_CANCEL_ID)]);
    doc.append_text(cancel, "Cancel");
    let submit = doc.append_element(login, "button", &[("id", LOGIN_SUBMIT_ID)]);
    doc.append_text(submit, "Log in");

    let editor_modal = doc.append_element(
        body,
        "div",
        &[("id", editor::MODAL_ID), ("class", "popup-overlay hidden")],
    );
    doc.append_element(editor_modal, "h3", &[("id", editor::TITLE_ID)]);
    doc.append_element(editor_modal, "div", &[("id", editor::BODY_ID)]);
    let save = doc.append_element(editor_modal, "button", &[("id", SAVE_CONTENT_ID)]);
    doc.append_text(save, "Save");
    let cancel_edit = doc.append_element(editor_modal, "button", &[("id", CANCEL_EDIT_ID)]);
    doc.append_text(cancel_edit, "Cancel");

    doc
}
