// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Generated edit form over the fields of one editable group.

use crate::dom::{Document, NodeId, Selector};
use crate::error::{CmsError, CmsResult};
use crate::registry::{self, ContentSnapshot, EditableGroup, FieldMap};
use crate::storage::{self, KeyValueStore};
use chrono::{DateTime, Utc};
use log::{debug, info};

pub const MODAL_ID: &str = "content-editor-modal";
pub const TITLE_ID: &str = "editor-title";
pub const BODY_ID: &str = "editor-content";
pub const HIDDEN_CLASS: &str = "hidden";

#[derive(Debug, Clone)]
struct EditSession {
    group: NodeId,
    group_id: String,
    /// Values at open time. Captured for diffing, not compared on cancel.
    original: FieldMap,
}

#[derive(Debug, Clone, Copy)]
struct EditorModal {
    modal: NodeId,
    title: NodeId,
    body: NodeId,
}

fn find_modal(doc: &Document) -> CmsResult<EditorModal> {
    let lookup = |id: &str| {
        doc.element_by_id(id)
            .ok_or_else(|| CmsError::missing_dom(format!("editor element #{} not found", id)))
    };
    Ok(EditorModal {
        modal: lookup(MODAL_ID)?,
        title: lookup(TITLE_ID)?,
        body: lookup(BODY_ID)?,
    })
}

/// At most one group is edited at a time; opening another replaces the
/// current session without asking.
#[derive(Debug, Default)]
pub struct ContentEditor {
    session: Option<EditSession>,
}

impl ContentEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn editing_group(&self) -> Option<NodeId> {
        self.session.as_ref().map(|session| session.group)
    }

    pub fn editing_group_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.group_id.as_str())
    }

    pub fn original_values(&self) -> Option<&FieldMap> {
        self.session.as_ref().map(|session| &session.original)
    }

    pub fn open(&mut self, doc: &mut Document, group_node: NodeId) -> CmsResult<()> {
        let group = registry::discover_group(doc, group_node).ok_or_else(|| {
            CmsError::validation(format!("node {} is not an editable group", group_node))
        })?;
        let modal = find_modal(doc)?;

        doc.set_text_content(modal.title, &format!("Edit {}", group.label()));
        doc.clear_children(modal.body);
        let form = build_form(doc, &group);
        doc.append_child(modal.body, form);
        doc.remove_class(modal.modal, HIDDEN_CLASS);

        let first_control = doc.query(
            form,
            &Selector::tag("input").or(Selector::tag("textarea")),
        );
        if let Some(control) = first_control {
            doc.focus_and_select(control);
        }

        debug!("Editing group '{}' ({} fields)", group.id, group.fields.len());
        self.session = Some(EditSession {
            group: group.node,
            group_id: group.id.clone(),
            original: group.values(),
        });
        Ok(())
    }

    /// Applies the form to the page and closes the editor.
    ///
    /// Returns `Ok(None)` when nothing is being edited. The caller persists
    /// the page afterwards.
    pub fn apply(&mut self, doc: &mut Document) -> CmsResult<Option<String>> {
        let Some(session) = self.session.clone() else {
            return Ok(None);
        };
        let modal = find_modal(doc)?;
        let Some(form) = doc.query(modal.body, &Selector::tag("form")) else {
            return Err(CmsError::missing_dom("editor form not found"));
        };
        let Some(group) = registry::discover_group(doc, session.group) else {
            self.close(doc);
            return Err(CmsError::missing_dom(format!(
                "group '{}' left the page while it was being edited",
                session.group_id
            )));
        };

        let mut applied = 0;
        for field in &group.fields {
            let Some(control) = doc.query(form, &Selector::attr_eq("name", &field.name)) else {
                continue;
            };
            let value = doc.value(control).unwrap_or_default();
            registry::write_field(doc, field, &value);
            applied += 1;
        }
        if applied == 0 {
            return Err(CmsError::validation("The edit form has no values to save."));
        }

        info!("Saved {} field(s) of '{}'", applied, session.group_id);
        self.close(doc);
        Ok(Some(session.group_id))
    }

    /// Closes without touching the page or storage.
    pub fn cancel(&mut self, doc: &mut Document) {
        if let Some(session) = &self.session {
            debug!("Edit of '{}' cancelled", session.group_id);
        }
        self.close(doc);
    }

    fn close(&mut self, doc: &mut Document) {
        if let Some(modal) = doc.element_by_id(MODAL_ID) {
            doc.add_class(modal, HIDDEN_CLASS);
        }
        self.session = None;
    }
}

fn build_form(doc: &mut Document, group: &EditableGroup) -> NodeId {
    let form = doc.create_element("form");
    doc.set_attribute(form, "class", "admin-form");
    let rows = if group.whole_content { "5" } else { "4" };
    for field in &group.fields {
        let control_id = format!("edit-{}", field.name);
        let row = doc.append_element(form, "div", &[("class", "form-group")]);
        let label = doc.append_element(row, "label", &[("for", control_id.as_str())]);
        doc.append_text(label, &format!("{}:", field.label()));
        if field.is_multiline() {
            let area = doc.append_element(
                row,
                "textarea",
                &[
                    ("id", control_id.as_str()),
                    ("name", field.name.as_str()),
                    ("rows", rows),
                ],
            );
            doc.append_text(area, &field.value);
        } else {
            doc.append_element(
                row,
                "input",
                &[
                    ("type", "text"),
                    ("id", control_id.as_str()),
                    ("name", field.name.as_str()),
                    ("value", field.value.as_str()),
                ],
            );
        }
    }
    form
}

/// Writes the whole page as the latest content snapshot.
pub fn persist_snapshot(
    doc: &Document,
    store: &dyn KeyValueStore,
    user: Option<&str>,
    now: DateTime<Utc>,
) -> CmsResult<ContentSnapshot> {
    let snapshot = registry::extract_all(doc, user, now);
    storage::write_json(store, storage::CONTENT_LATEST_KEY, &snapshot)?;
    debug!("Content snapshot written ({} groups)", snapshot.content.len());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FIELD_ATTR, GROUP_ATTR};
    use crate::storage::MemoryStore;

    struct Page {
        doc: Document,
        card: NodeId,
        title: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let modal = doc.append_element(body, "div", &[("id", MODAL_ID), ("class", "popup-overlay hidden")]);
        doc.append_element(modal, "h3", &[("id", TITLE_ID)]);
        doc.append_element(modal, "div", &[("id", BODY_ID)]);
        let card = doc.append_element(body, "div", &[(GROUP_ATTR, "policy")]);
        let title = doc.append_element(card, "h4", &[(FIELD_ATTR, "title")]);
        doc.append_text(title, "Clean water");
        let summary = doc.append_element(card, "p", &[(FIELD_ATTR, "summary")]);
        doc.append_text(summary, &"long ".repeat(30));
        Page { doc, card, title }
    }

    fn control(doc: &Document, name: &str) -> NodeId {
        doc.query(doc.root(), &Selector::attr_eq("name", name))
            .expect("form control")
    }

    #[test]
    fn open_builds_labelled_form_and_focuses_first_input() {
        let mut page = page();
        let mut editor = ContentEditor::new();
        editor.open(&mut page.doc, page.card).expect("open");

        let doc = &page.doc;
        let modal = doc.element_by_id(MODAL_ID).expect("modal");
        assert!(!doc.has_class(modal, HIDDEN_CLASS));
        let title = doc.element_by_id(TITLE_ID).expect("title");
        assert_eq!(doc.text_content(title), "Edit Policy");

        let first = control(doc, "title");
        assert_eq!(doc.tag(first), Some("input"));
        assert_eq!(doc.value(first).as_deref(), Some("Clean water"));
        assert_eq!(doc.focused(), Some(first));
        assert_eq!(doc.selection(), Some(first));
        assert_eq!(doc.tag(control(doc, "summary")), Some("textarea"));
        assert_eq!(
            editor.original_values().expect("original")["title"],
            "Clean water"
        );
    }

    #[test]
    fn apply_writes_values_back_and_closes() {
        let mut page = page();
        let mut editor = ContentEditor::new();
        editor.open(&mut page.doc, page.card).expect("open");
        let input = control(&page.doc, "title");
        page.doc.set_value(input, "Clean <em>water</em>");

        let saved = editor.apply(&mut page.doc).expect("apply");
        assert_eq!(saved.as_deref(), Some("policy"));
        assert!(!editor.is_open());
        assert_eq!(page.doc.inner_html(page.title), "Clean <em>water</em>");
        let modal = page.doc.element_by_id(MODAL_ID).expect("modal");
        assert!(page.doc.has_class(modal, HIDDEN_CLASS));
    }

    #[test]
    fn cancel_leaves_the_page_untouched() {
        let mut page = page();
        let mut editor = ContentEditor::new();
        editor.open(&mut page.doc, page.card).expect("open");
        let input = control(&page.doc, "title");
        page.doc.set_value(input, "Changed");
        editor.cancel(&mut page.doc);
        assert!(!editor.is_open());
        assert_eq!(page.doc.inner_html(page.title), "Clean water");
        assert_eq!(editor.apply(&mut page.doc).expect("no session"), None);
    }

    #[test]
    fn missing_modal_is_a_missing_dom_error() {
        let mut doc = Document::new();
        let body = doc.body();
        let group = doc.append_element(body, "div", &[(GROUP_ATTR, "about")]);
        let mut editor = ContentEditor::new();
        let err = editor.open(&mut doc, group).expect_err("no modal");
        assert_eq!(err.kind(), crate::error::ErrorKind::MissingDom);
        assert!(!editor.is_open());
    }

    #[test]
    fn persist_snapshot_writes_latest_key() {
        let page = page();
        let store = MemoryStore::new();
        let now = Utc::now();
        let snapshot = persist_snapshot(&page.doc, &store, Some("admin"), now).expect("persist");
        let stored: ContentSnapshot = storage::read_json(&store, storage::CONTENT_LATEST_KEY)
            .expect("read")
            .expect("present");
        assert_eq!(stored, snapshot);
        assert_eq!(stored.content["policy"]["title"], "Clean water");
    }

    #[test]
    fn persist_snapshot_reports_quota_failures() {
        let page = page();
        let store = MemoryStore::with_quota(8);
        let err = persist_snapshot(&page.doc, &store, None, Utc::now()).expect_err("quota");
        assert_eq!(err.kind(), crate::error::ErrorKind::Storage);
    }
}
