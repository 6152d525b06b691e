// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! The editable-marker contract and the typed view over it.
//!
//! A node is an editable group iff it carries [`GROUP_ATTR`]; a descendant is
//! one of its fields iff it carries [`FIELD_ATTR`], is not a group itself, and
//! has no closer group ancestor. Everything else in the crate goes through
//! [`discover_group`] and [`write_field`] instead of reading attributes.

pub mod sweep;

use crate::dom::{Document, NodeId, Selector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GROUP_ATTR: &str = "data-editable";
pub const FIELD_ATTR: &str = "data-editable-field";
pub const IMAGE_TRIGGER_CLASS: &str = "cms-image-trigger";
pub const IMAGE_ROLE_ATTR: &str = "data-image-type";
pub const REGION_ID_ATTR: &str = "data-image-id";
pub const PLACEHOLDER_CLASS: &str = "image-placeholder";

/// Name of the single field of a group without marked fields.
pub const WHOLE_CONTENT_FIELD: &str = "content";

/// Longer values get a multi-line input.
const LONG_TEXT_THRESHOLD: usize = 100;

pub fn group_selector() -> Selector {
    Selector::attr(GROUP_ATTR)
}

pub fn field_selector() -> Selector {
    Selector::attr(FIELD_ATTR)
}

pub fn image_trigger_selector() -> Selector {
    Selector::class(IMAGE_TRIGGER_CLASS)
}

/// Where a field's value lives on its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBacking {
    /// The `value` property of an input or textarea.
    FormControl,
    /// The node's inner HTML.
    Markup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableField {
    pub name: String,
    pub node: NodeId,
    pub value: String,
    pub backing: FieldBacking,
}

impl EditableField {
    /// Whether the editor should offer a textarea for this field.
    pub fn is_multiline(&self) -> bool {
        self.value.chars().count() > LONG_TEXT_THRESHOLD || self.value.contains("<br")
    }

    pub fn label(&self) -> &str {
        field_label(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableGroup {
    pub id: String,
    pub node: NodeId,
    /// Empty fields on the page collapse into one [`WHOLE_CONTENT_FIELD`].
    pub fields: Vec<EditableField>,
    pub whole_content: bool,
}

impl EditableGroup {
    pub fn field(&self, name: &str) -> Option<&EditableField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    pub fn label(&self) -> &str {
        group_label(&self.id)
    }
}

pub fn is_group(doc: &Document, node: NodeId) -> bool {
    doc.has_attribute(node, GROUP_ATTR)
}

/// Fields owned by `group`, in document order.
pub fn field_nodes(doc: &Document, group: NodeId) -> Vec<NodeId> {
    let groups = group_selector();
    doc.query_all(group, &field_selector())
        .into_iter()
        .filter(|node| !is_group(doc, *node))
        .filter(|node| {
            doc.parent(*node)
                .and_then(|parent| doc.closest(parent, &groups))
                == Some(group)
        })
        .collect()
}

pub fn discover_group(doc: &Document, node: NodeId) -> Option<EditableGroup> {
    let id = doc.attribute(node, GROUP_ATTR)?.to_string();
    let nodes = field_nodes(doc, node);
    if nodes.is_empty() {
        return Some(EditableGroup {
            id,
            node,
            fields: vec![EditableField {
                name: WHOLE_CONTENT_FIELD.to_string(),
                node,
                value: doc.inner_html(node).trim().to_string(),
                backing: FieldBacking::Markup,
            }],
            whole_content: true,
        });
    }

    let fields = nodes
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let name = match doc.attribute(field, FIELD_ATTR) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("field_{}", index),
            };
            let (value, backing) = if doc.is_form_control(field) {
                (doc.value(field).unwrap_or_default(), FieldBacking::FormControl)
            } else {
                (doc.inner_html(field), FieldBacking::Markup)
            };
            EditableField {
                name,
                node: field,
                value,
                backing,
            }
        })
        .collect();

    Some(EditableGroup {
        id,
        node,
        fields,
        whole_content: false,
    })
}

/// Markup-backed fields take the value verbatim as HTML.
pub fn write_field(doc: &mut Document, field: &EditableField, value: &str) {
    match field.backing {
        FieldBacking::FormControl => doc.set_value(field.node, value),
        FieldBacking::Markup => doc.set_inner_html(field.node, value),
    }
}

/// Every group currently attached to the page, in document order.
pub fn all_groups(doc: &Document) -> Vec<EditableGroup> {
    doc.query_all(doc.root(), &group_selector())
        .into_iter()
        .filter_map(|node| discover_group(doc, node))
        .collect()
}

/// Serialized values of one group: its fields by name, or `text` and `html`
/// for a group without marked fields.
pub type FieldMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub timestamp: DateTime<Utc>,
    pub user: Option<String>,
    pub content: BTreeMap<String, FieldMap>,
}

/// Serializes every group on the page. Duplicate ids keep the last group,
/// matching a keyed object written in document order.
pub fn extract_all(doc: &Document, user: Option<&str>, timestamp: DateTime<Utc>) -> ContentSnapshot {
    let mut content = BTreeMap::new();
    for group in all_groups(doc) {
        let values = if group.whole_content {
            let mut values = FieldMap::new();
            values.insert("text".to_string(), doc.text_content(group.node).trim().to_string());
            values.insert("html".to_string(), doc.inner_html(group.node).trim().to_string());
            values
        } else {
            group.values()
        };
        content.insert(group.id, values);
    }
    ContentSnapshot {
        timestamp,
        user: user.map(str::to_string),
        content,
    }
}

pub fn field_label(name: &str) -> &str {
    match name {
        "title" => "Title",
        "subtitle" => "Subtitle",
        "heading" => "Heading",
        "content" => "Content",
        "description" => "Description",
        "question" => "Question",
        "answer" => "Answer",
        other => other,
    }
}

pub fn group_label(id: &str) -> &'static str {
    match id {
        "hero" => "Main hero",
        "main-message" => "Main message",
        "about" => "About",
        "news" => "News",
        "policy" => "Policy",
        "header-top-image" => "Header image",
        _ => "Content",
    }
}
