// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Visual cues on editable groups and image triggers while admin mode is on.

use crate::dom::Document;
use crate::registry::{group_selector, image_trigger_selector};

pub const GROUP_TITLE: &str = "Click to edit";
pub const TRIGGER_TITLE: &str = "Click to add or replace the image";
pub const TRIGGER_BORDER: &str = "3px dashed rgba(0, 123, 255, 0.6)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlighted {
    pub groups: usize,
    pub triggers: usize,
}

/// Marks every current group and trigger. Safe to re-run.
pub fn highlight(doc: &mut Document) -> Highlighted {
    let root = doc.root();
    let groups = doc.query_all(root, &group_selector());
    for group in &groups {
        doc.set_style(*group, "cursor", "pointer");
        doc.set_style(*group, "position", "relative");
        doc.set_attribute(*group, "title", GROUP_TITLE);
    }
    let triggers = doc.query_all(root, &image_trigger_selector());
    for trigger in &triggers {
        doc.set_style(*trigger, "border", TRIGGER_BORDER);
        doc.set_style(*trigger, "cursor", "pointer");
        doc.set_attribute(*trigger, "title", TRIGGER_TITLE);
    }
    Highlighted {
        groups: groups.len(),
        triggers: triggers.len(),
    }
}

pub fn clear(doc: &mut Document) {
    let root = doc.root();
    for group in doc.query_all(root, &group_selector()) {
        doc.clear_style(group, "cursor");
        doc.clear_style(group, "position");
        doc.remove_attribute(group, "title");
    }
    for trigger in doc.query_all(root, &image_trigger_selector()) {
        for property in ["border", "cursor", "background-color", "transform"] {
            doc.clear_style(trigger, property);
        }
        doc.remove_attribute(trigger, "title");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{GROUP_ATTR, IMAGE_TRIGGER_CLASS};

    #[test]
    fn highlight_and_clear_are_symmetric_for_cues() {
        let mut doc = Document::new();
        let body = doc.body();
        let group = doc.append_element(body, "section", &[(GROUP_ATTR, "about")]);
        let trigger = doc.append_element(group, "div", &[("class", IMAGE_TRIGGER_CLASS)]);

        let counts = highlight(&mut doc);
        assert_eq!(counts, Highlighted { groups: 1, triggers: 1 });
        assert_eq!(doc.attribute(group, "title"), Some(GROUP_TITLE));
        assert_eq!(doc.style(trigger, "border").as_deref(), Some(TRIGGER_BORDER));

        clear(&mut doc);
        assert_eq!(doc.attribute(group, "title"), None);
        assert_eq!(doc.style(group, "cursor"), None);
        assert_eq!(doc.style(trigger, "border"), None);
        assert_eq!(doc.attribute(trigger, "title"), None);
    }

    #[test]
    fn clear_drops_the_positioning_added_for_groups() {
        let mut doc = Document::new();
        let body = doc.body();
        let group = doc.append_element(body, "section", &[(GROUP_ATTR, "about")]);
        doc.set_style(group, "color", "navy");

        highlight(&mut doc);
        assert_eq!(doc.style(group, "position").as_deref(), Some("relative"));

        clear(&mut doc);
        assert_eq!(doc.style(group, "position"), None);
        assert_eq!(doc.style(group, "color").as_deref(), Some("navy"));
    }
}
