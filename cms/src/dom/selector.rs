// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{Document, NodeId};

/// The subset of CSS simple selectors the editing core needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
    All(Vec<Selector>),
    Any(Vec<Selector>),
    Not(Box<Selector>),
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Selector::Tag(tag.to_ascii_lowercase())
    }

    pub fn id(id: &str) -> Self {
        Selector::Id(id.to_string())
    }

    pub fn class(class: &str) -> Self {
        Selector::Class(class.to_string())
    }

    pub fn attr(name: &str) -> Self {
        Selector::HasAttribute(name.to_string())
    }

    pub fn attr_eq(name: &str, value: &str) -> Self {
        Selector::AttributeEquals(name.to_string(), value.to_string())
    }

    pub fn and(self, other: Selector) -> Self {
        match self {
            Selector::All(mut parts) => {
                parts.push(other);
                Selector::All(parts)
            }
            first => Selector::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Selector) -> Self {
        match self {
            Selector::Any(mut parts) => {
                parts.push(other);
                Selector::Any(parts)
            }
            first => Selector::Any(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Selector::Not(Box::new(self))
    }

    /// Only elements match; text and markup nodes never do.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        match self {
            Selector::Tag(expected) => tag == expected,
            Selector::Id(expected) => doc.dom_id(id) == Some(expected.as_str()),
            Selector::Class(class) => doc.has_class(id, class),
            Selector::HasAttribute(name) => doc.has_attribute(id, name),
            Selector::AttributeEquals(name, value) => {
                doc.attribute(id, name) == Some(value.as_str())
            }
            Selector::All(parts) => parts.iter().all(|part| part.matches(doc, id)),
            Selector::Any(parts) => parts.iter().any(|part| part.matches(doc, id)),
            Selector::Not(inner) => !inner.matches(doc, id),
        }
    }
}
