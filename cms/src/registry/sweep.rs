// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Idempotent reconciliation of markers on template output that was rendered
//! without them.

use super::{
    FIELD_ATTR, GROUP_ATTR, IMAGE_ROLE_ATTR, IMAGE_TRIGGER_CLASS, PLACEHOLDER_CLASS,
    REGION_ID_ATTR,
};
use crate::dom::{Document, NodeId, Selector};
use crate::host::ModeListener;
use log::debug;

pub const HERO_BACKGROUND_ID: &str = "hero-background";

/// Marks every node reached by `path` as a group named `<id_prefix><index>`.
///
/// `path` is a descendant chain: each selector is matched below the nodes
/// found by the previous one. The index counts every matched node, marked or
/// not, so ids stay stable across repeated passes over the same render.
#[derive(Debug, Clone)]
pub struct MarkerRule {
    pub path: Vec<Selector>,
    pub id_prefix: &'static str,
    /// First descendant matching the selector becomes the named field.
    pub fields: Vec<(Selector, &'static str)>,
    /// Field name put on the group node itself.
    pub self_field: Option<&'static str>,
}

impl MarkerRule {
    pub fn new(path: Vec<Selector>, id_prefix: &'static str) -> Self {
        Self {
            path,
            id_prefix,
            fields: Vec::new(),
            self_field: None,
        }
    }

    pub fn with_field(mut self, selector: Selector, name: &'static str) -> Self {
        self.fields.push((selector, name));
        self
    }

    pub fn with_self_field(mut self, name: &'static str) -> Self {
        self.self_field = Some(name);
        self
    }

    pub fn matches(&self, doc: &Document) -> Vec<NodeId> {
        query_chain(doc, &self.path)
    }

    /// Returns how many nodes were newly marked. Fields are only added to
    /// nodes this pass marks.
    pub fn apply(&self, doc: &mut Document) -> usize {
        let mut marked = 0;
        for (index, node) in self.matches(doc).into_iter().enumerate() {
            if doc.has_attribute(node, GROUP_ATTR) {
                continue;
            }
            doc.set_attribute(node, GROUP_ATTR, &format!("{}{}", self.id_prefix, index));
            if let Some(name) = self.self_field {
                doc.set_attribute(node, FIELD_ATTR, name);
            }
            for (selector, name) in &self.fields {
                if let Some(field) = doc.query(node, selector)
                    && !doc.has_attribute(field, FIELD_ATTR)
                {
                    doc.set_attribute(field, FIELD_ATTR, name);
                }
            }
            marked += 1;
        }
        marked
    }
}

fn query_chain(doc: &Document, path: &[Selector]) -> Vec<NodeId> {
    let mut current = vec![doc.root()];
    for selector in path {
        let mut next = Vec::new();
        for scope in &current {
            for found in doc.query_all(*scope, selector) {
                if !next.contains(&found) {
                    next.push(found);
                }
            }
        }
        current = next;
    }
    if path.is_empty() {
        return Vec::new();
    }
    let order = doc.descendants(doc.root());
    current.sort_by_key(|node| {
        order
            .iter()
            .position(|candidate| candidate == node)
            .unwrap_or(usize::MAX)
    });
    current
}

/// Policy cards and FAQ entries rendered by the listing templates.
pub fn listing_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::new(vec![Selector::class("policy-card")], "policy-card-")
            .with_field(Selector::tag("h4"), "title")
            .with_field(Selector::tag("p"), "summary"),
        MarkerRule::new(
            vec![Selector::id("faq-container"), Selector::class("faq-item")],
            "faq-item-",
        )
        .with_field(Selector::tag("strong"), "question")
        .with_field(Selector::tag("p"), "answer"),
    ]
}

/// Experience and contact lines of the candidate profile.
pub fn candidate_profile_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::new(
            vec![
                Selector::id("candidate-profile"),
                Selector::tag("ul"),
                Selector::tag("li"),
            ],
            "experience-item-",
        )
        .with_self_field("content"),
        MarkerRule::new(
            vec![
                Selector::id("candidate-profile"),
                Selector::class("contact-info"),
                Selector::tag("p"),
            ],
            "contact-item-",
        )
        .with_self_field("content"),
    ]
}

/// Gives a `.hero-section` without a background slot a `hero` image region.
pub fn ensure_hero_background(doc: &mut Document) -> Option<NodeId> {
    let hero = doc.query(doc.root(), &Selector::class("hero-section"))?;
    if doc.query(hero, &Selector::class("hero-background")).is_some() {
        return None;
    }
    let background = doc.create_element("div");
    doc.set_attribute(background, "class", "hero-background");
    doc.set_attribute(background, GROUP_ATTR, HERO_BACKGROUND_ID);
    doc.append_element(background, "div", &[("class", "hero-overlay")]);
    let classes = format!("{} {}", PLACEHOLDER_CLASS, IMAGE_TRIGGER_CLASS);
    let placeholder = doc.append_element(
        background,
        "div",
        &[
            ("class", classes.as_str()),
            (IMAGE_ROLE_ATTR, "hero"),
            (REGION_ID_ATTR, HERO_BACKGROUND_ID),
        ],
    );
    doc.set_css_text(
        placeholder,
        "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: rgba(255,255,255,0.3); text-align: center; cursor: pointer;",
    );
    let caption = doc.append_element(placeholder, "p", &[]);
    doc.append_text(caption, "Add hero background image");
    doc.prepend_child(hero, background);
    debug!("Inserted hero background region");
    Some(background)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub marked: usize,
    pub hero_inserted: bool,
}

/// The controller's own pass over known template containers.
#[derive(Debug, Clone)]
pub struct MarkerSweep {
    rules: Vec<MarkerRule>,
}

impl Default for MarkerSweep {
    fn default() -> Self {
        Self::new(listing_rules())
    }
}

impl MarkerSweep {
    pub fn new(rules: Vec<MarkerRule>) -> Self {
        Self { rules }
    }

    pub fn reconcile(&self, doc: &mut Document) -> SweepReport {
        let marked = self.rules.iter().map(|rule| rule.apply(doc)).sum();
        let hero_inserted = ensure_hero_background(doc).is_some();
        if marked > 0 || hero_inserted {
            debug!(
                "Marker sweep labelled {} groups (hero inserted: {})",
                marked, hero_inserted
            );
        }
        SweepReport {
            marked,
            hero_inserted,
        }
    }
}

/// A renderer's own marking pass, re-run whenever admin mode turns on.
#[derive(Debug, Clone)]
pub struct RendererMarkerPass {
    name: &'static str,
    rules: Vec<MarkerRule>,
}

impl RendererMarkerPass {
    pub fn new(name: &'static str, rules: Vec<MarkerRule>) -> Self {
        Self { name, rules }
    }

    pub fn candidate_profile() -> Self {
        Self::new("candidate-profile", candidate_profile_rules())
    }
}

impl ModeListener for RendererMarkerPass {
    fn mode_changed(&self, doc: &mut Document, active: bool) {
        if !active {
            return;
        }
        let marked: usize = self.rules.iter().map(|rule| rule.apply(doc)).sum();
        debug!("{} pass marked {} groups", self.name, marked);
    }
}
