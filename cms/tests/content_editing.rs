// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use campaign_cms::admin::routers::{ADMIN_BUTTON_ID, CANCEL_EDIT_ID, SAVE_CONTENT_ID};
use campaign_cms::dom::Selector;
use campaign_cms::dom::events::KeyEvent;
use campaign_cms::editor;
use campaign_cms::registry::{
    self, ContentSnapshot, FIELD_ATTR, GROUP_ATTR, IMAGE_ROLE_ATTR, IMAGE_TRIGGER_CLASS,
    REGION_ID_ATTR,
};
use campaign_cms::storage::{self, KeyValueStore};
use common::{ADMIN_PASSWORD, ADMIN_USER, EDITOR_PASSWORD, EDITOR_USER, TestPage, campaign_page};

fn logged_in(user: &str, password: &str) -> TestPage {
    let mut page = TestPage::new();
    page.log_in_through_modal(user, password);
    assert!(page.app.is_admin_mode_active());
    page
}

fn latest_snapshot(page: &TestPage) -> ContentSnapshot {
    storage::read_json(page.durable.as_ref(), storage::CONTENT_LATEST_KEY)
        .expect("read snapshot")
        .expect("snapshot stored")
}

#[test]
fn saving_an_edit_round_trips_field_values() {
    let mut page = logged_in(EDITOR_USER, EDITOR_PASSWORD);
    let title = page.field("hero", "title");
    page.app.click(title);
    assert_eq!(page.app.editor().editing_group_id(), Some("hero"));
    assert!(!page.is_hidden(editor::MODAL_ID));

    page.type_into("edit-title", "Safer streets, cleaner water");
    page.type_into("edit-subtitle", "Early voting starts <strong>May 28</strong>");
    page.click_id(SAVE_CONTENT_ID);

    assert!(!page.app.editor().is_open());
    assert!(page.is_hidden(editor::MODAL_ID));
    let hero = page.group("hero");
    let group = registry::discover_group(page.app.doc(), hero).expect("hero group");
    assert_eq!(group.values()["title"], "Safer streets, cleaner water");
    assert_eq!(
        group.values()["subtitle"],
        "Early voting starts <strong>May 28</strong>"
    );

    let snapshot = latest_snapshot(&page);
    assert_eq!(snapshot.user.as_deref(), Some(EDITOR_USER));
    assert_eq!(snapshot.content["hero"]["title"], "Safer streets, cleaner water");
    assert_eq!(snapshot.content["notice"]["text"], "Polls open at 7am.");
}

#[test]
fn whole_content_groups_edit_their_markup() {
    let mut page = logged_in(ADMIN_USER, ADMIN_PASSWORD);
    let notice = page.group("notice");
    page.app.click(notice);
    page.type_into("edit-content", "Polls open at <em>6am</em>.");

    let mut save = KeyEvent::new("s").with_ctrl();
    page.app.key_down(&mut save);

    assert!(save.default_prevented());
    assert_eq!(page.app.doc().inner_html(notice), "Polls open at <em>6am</em>.");
    let snapshot = latest_snapshot(&page);
    assert_eq!(snapshot.content["notice"]["html"], "Polls open at <em>6am</em>.");
}

#[test]
fn saving_a_whole_content_group_keeps_nested_groups_and_triggers() {
    let mut doc = campaign_page();
    let body = doc.body();
    let about = doc.append_element(body, "section", &[(GROUP_ATTR, "about")]);
    let trigger_classes = format!("candidate-photo {}", IMAGE_TRIGGER_CLASS);
    doc.append_element(
        about,
        "div",
        &[
            ("class", trigger_classes.as_str()),
            (IMAGE_ROLE_ATTR, "candidate"),
            (REGION_ID_ATTR, "about-photo"),
        ],
    );
    let inner = doc.append_element(about, "div", &[(GROUP_ATTR, "inner")]);
    let title = doc.append_element(inner, "h3", &[(FIELD_ATTR, "title")]);
    doc.append_text(title, "Twenty years in Jinan");

    let mut page = TestPage::with_document(doc);
    page.log_in_through_modal(ADMIN_USER, ADMIN_PASSWORD);
    let about = page.group("about");
    page.app.open_content_editor(about).expect("open");
    assert_eq!(page.app.editor().editing_group_id(), Some("about"));
    page.app.save_edit().expect("save").expect("snapshot");

    let doc = page.app.doc();
    let nested: Vec<&str> = doc
        .query_all(about, &Selector::attr(GROUP_ATTR))
        .into_iter()
        .filter_map(|node| doc.attribute(node, GROUP_ATTR))
        .collect();
    assert_eq!(nested, vec!["inner"]);
    let triggers = doc.query_all(about, &Selector::class(IMAGE_TRIGGER_CLASS));
    assert_eq!(triggers.len(), 1);
    assert_eq!(doc.attribute(triggers[0], REGION_ID_ATTR), Some("about-photo"));

    let title = page.field("inner", "title");
    assert_eq!(page.text(title), "Twenty years in Jinan");
    let inner = page.group("inner");
    page.app.click(title);
    assert_eq!(page.app.editor().editing_group(), Some(inner));
}

#[test]
fn cancel_and_escape_leave_the_page_untouched() {
    let mut page = logged_in(ADMIN_USER, ADMIN_PASSWORD);
    let title = page.field("hero", "title");
    let before = page.text(title);

    page.app.click(title);
    page.type_into("edit-title", "Discarded");
    page.click_id(CANCEL_EDIT_ID);
    assert!(!page.app.editor().is_open());
    assert_eq!(page.text(title), before);

    page.app.click(title);
    page.type_into("edit-title", "Also discarded");
    let mut escape = KeyEvent::new("Escape");
    page.app.key_down(&mut escape);
    assert!(escape.default_prevented());
    assert!(!page.app.editor().is_open());
    assert_eq!(page.text(title), before);
    assert_eq!(
        page.durable.get(storage::CONTENT_LATEST_KEY).expect("get"),
        None
    );
}

#[test]
fn rendered_policy_cards_become_editable_in_admin_mode() {
    let mut page = TestPage::new();
    let doc = page.app.doc();
    let cards = doc.query_all(doc.root(), &Selector::class("policy-card"));
    assert!(cards.iter().all(|card| !doc.has_attribute(*card, GROUP_ATTR)));

    page.log_in_through_modal(ADMIN_USER, ADMIN_PASSWORD);
    let card = page.group("policy-card-1");
    assert_eq!(page.text(page.field("policy-card-1", "title")), "Safe roads");
    assert_eq!(page.app.stats().editable_groups, 5);

    let summary = page.field("policy-card-1", "summary");
    page.app.click(summary);
    assert_eq!(page.app.editor().editing_group(), Some(card));
}

#[test]
fn clicks_do_not_edit_outside_admin_mode() {
    let mut page = logged_in(ADMIN_USER, ADMIN_PASSWORD);
    page.click_id(ADMIN_BUTTON_ID);
    assert!(!page.app.is_admin_mode_active());

    let title = page.field("hero", "title");
    let event = page.app.click(title);
    assert!(!event.default_prevented());
    assert!(!page.app.editor().is_open());
}

#[test]
fn backups_capture_the_page_at_that_moment() {
    let mut page = logged_in(ADMIN_USER, ADMIN_PASSWORD);
    let first = page.app.create_backup().expect("backup");

    let title = page.field("hero", "title");
    page.app.click(title);
    page.type_into("edit-title", "Changed later");
    page.click_id(SAVE_CONTENT_ID);
    page.clock.advance(chrono::Duration::minutes(1));
    let second = page.app.create_backup().expect("backup");

    assert_eq!(page.app.list_backups().expect("list"), vec![first.clone(), second]);
    let snapshot = page.app.load_backup(&first).expect("load");
    assert_eq!(
        snapshot.content["hero"]["title"],
        "A city that works for everyone"
    );
}
