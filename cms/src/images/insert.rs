// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Region-specific image insertion.
//!
//! Every strategy replaces the image it inserted earlier, so repeated
//! insertions into one region never stack.

use super::catalog::UploadedImage;
use crate::dom::{Document, NodeId, Selector};
use crate::registry::{IMAGE_ROLE_ATTR, PLACEHOLDER_CLASS};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    HeaderTop,
    Hero,
    Candidate,
    Policy,
    PolicyDetail,
    Vision,
    VisionDetail,
    /// Any role this crate does not recognize.
    Generic,
}

impl ImageRole {
    pub fn parse(role: Option<&str>) -> Self {
        match role {
            Some("header-top") => ImageRole::HeaderTop,
            Some("hero") => ImageRole::Hero,
            Some("candidate") => ImageRole::Candidate,
            Some("policy") => ImageRole::Policy,
            Some("policy-detail") => ImageRole::PolicyDetail,
            Some("vision") => ImageRole::Vision,
            Some("vision-detail") => ImageRole::VisionDetail,
            _ => ImageRole::Generic,
        }
    }

    pub fn of_region(doc: &Document, region: NodeId) -> Self {
        Self::parse(doc.attribute(region, IMAGE_ROLE_ATTR))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRole::HeaderTop => "header-top",
            ImageRole::Hero => "hero",
            ImageRole::Candidate => "candidate",
            ImageRole::Policy => "policy",
            ImageRole::PolicyDetail => "policy-detail",
            ImageRole::Vision => "vision",
            ImageRole::VisionDetail => "vision-detail",
            ImageRole::Generic => "generic",
        }
    }

    fn strategy(&self) -> Strategy {
        match self {
            ImageRole::HeaderTop => Strategy::Fixed {
                class: "header-top-img",
                css: "width: 100%; height: 120px; object-fit: cover; display: block; border-radius: 0 0 10px 10px;",
            },
            ImageRole::Hero => Strategy::Fixed {
                class: "hero-bg-image",
                css: "position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: cover; z-index: 1; opacity: 0.7;",
            },
            ImageRole::Candidate => Strategy::Fixed {
                class: "candidate-bg-image",
                css: "position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: cover; border-radius: 15px; opacity: 0.4; z-index: 1;",
            },
            ImageRole::Policy | ImageRole::PolicyDetail => Strategy::Fixed {
                class: "policy-detail-img",
                css: DETAIL_CSS,
            },
            ImageRole::Vision | ImageRole::VisionDetail => Strategy::Fixed {
                class: "vision-detail-img",
                css: DETAIL_CSS,
            },
            ImageRole::Generic => Strategy::Captioned,
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DETAIL_CSS: &str =
    "width: 100%; height: 200px; object-fit: cover; border-radius: 15px; margin-bottom: 1rem;";

enum Strategy {
    /// Hide the placeholder and put a styled `img.<class>` first.
    Fixed {
        class: &'static str,
        css: &'static str,
    },
    /// Wrap the image and a caption in a sized, positioned container.
    Captioned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl ImageSize {
    pub const ALL: [ImageSize; 4] = [
        ImageSize::Small,
        ImageSize::Medium,
        ImageSize::Large,
        ImageSize::Full,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
            ImageSize::Full => "full",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageSize::Small => "Small (200px)",
            ImageSize::Medium => "Medium (400px)",
            ImageSize::Large => "Large (600px)",
            ImageSize::Full => "Full width",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePosition {
    Left,
    #[default]
    Center,
    Right,
}

impl ImagePosition {
    pub const ALL: [ImagePosition; 3] = [
        ImagePosition::Left,
        ImagePosition::Center,
        ImagePosition::Right,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|position| position.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePosition::Left => "left",
            ImagePosition::Center => "center",
            ImagePosition::Right => "right",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImagePosition::Left => "Left",
            ImagePosition::Center => "Center",
            ImagePosition::Right => "Right",
        }
    }
}

/// Only the generic strategy reads size and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertSettings {
    pub alt: String,
    pub size: ImageSize,
    pub position: ImagePosition,
}

impl InsertSettings {
    pub fn new(alt: &str) -> Self {
        Self {
            alt: alt.to_string(),
            size: ImageSize::default(),
            position: ImagePosition::default(),
        }
    }
}

/// Inserts `image` into `region` according to the region's role and returns
/// the inserted node.
pub fn insert_image(
    doc: &mut Document,
    region: NodeId,
    image: &UploadedImage,
    settings: &InsertSettings,
) -> NodeId {
    match ImageRole::of_region(doc, region).strategy() {
        Strategy::Fixed { class, css } => insert_fixed(doc, region, image, &settings.alt, class, css),
        Strategy::Captioned => insert_captioned(doc, region, image, settings),
    }
}

fn insert_fixed(
    doc: &mut Document,
    region: NodeId,
    image: &UploadedImage,
    alt: &str,
    class: &str,
    css: &str,
) -> NodeId {
    if let Some(placeholder) = doc.query(region, &Selector::class(PLACEHOLDER_CLASS)) {
        doc.set_style(placeholder, "display", "none");
    }
    if let Some(previous) = doc.query(region, &Selector::class(class)) {
        doc.remove(previous);
    }
    let img = doc.create_element("img");
    doc.set_attribute(img, "src", &image.data_url);
    doc.set_attribute(img, "alt", alt);
    doc.set_attribute(img, "class", class);
    doc.set_css_text(img, css);
    doc.prepend_child(region, img);
    img
}

fn insert_captioned(
    doc: &mut Document,
    region: NodeId,
    image: &UploadedImage,
    settings: &InsertSettings,
) -> NodeId {
    let container = doc.create_element("div");
    doc.set_attribute(
        container,
        "class",
        &format!(
            "content-image-container size-{} position-{}",
            settings.size.as_str(),
            settings.position.as_str()
        ),
    );
    doc.append_element(
        container,
        "img",
        &[
            ("src", image.data_url.as_str()),
            ("alt", settings.alt.as_str()),
            ("class", "content-image"),
        ],
    );
    let caption = doc.append_element(container, "div", &[("class", "image-caption")]);
    doc.append_text(caption, &settings.alt);

    match doc.query(region, &Selector::class("content-image-container")) {
        Some(previous) => doc.replace_with(previous, container),
        None => doc.prepend_child(region, container),
    }
    container
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{GROUP_ATTR, IMAGE_TRIGGER_CLASS, REGION_ID_ATTR};
    use chrono::Utc;

    fn image(id: &str) -> UploadedImage {
        UploadedImage {
            id: id.to_string(),
            name: format!("{}.png", id),
            data_url: format!("data:image/png;base64,{}", id),
            size: 4,
            mime_type: "image/png".to_string(),
            upload_date: Utc::now(),
        }
    }

    fn region(doc: &mut Document, role: &str) -> (NodeId, NodeId) {
        let body = doc.body();
        let region = doc.append_element(
            body,
            "div",
            &[(GROUP_ATTR, "slot"), (IMAGE_ROLE_ATTR, role), (REGION_ID_ATTR, "slot-1")],
        );
        let classes = format!("{} {}", PLACEHOLDER_CLASS, IMAGE_TRIGGER_CLASS);
        let placeholder = doc.append_element(region, "div", &[("class", classes.as_str())]);
        doc.append_element(region, "p", &[]);
        (region, placeholder)
    }

    fn images_in(doc: &Document, region: NodeId) -> Vec<NodeId> {
        doc.query_all(region, &Selector::tag("img"))
    }

    #[test]
    fn header_top_replaces_placeholder_with_single_first_child() {
        let mut doc = Document::new();
        let (region, placeholder) = region(&mut doc, "header-top");
        insert_image(&mut doc, region, &image("a"), &InsertSettings::new("first"));
        let second = insert_image(&mut doc, region, &image("b"), &InsertSettings::new("second"));

        assert_eq!(images_in(&doc, region), vec![second]);
        assert_eq!(doc.first_child(region), Some(second));
        assert_eq!(doc.style(placeholder, "display").as_deref(), Some("none"));
        assert_eq!(doc.attribute(second, "class"), Some("header-top-img"));
        assert_eq!(doc.style(second, "height").as_deref(), Some("120px"));
        assert_eq!(doc.attribute(second, "alt"), Some("second"));
    }

    #[test]
    fn background_roles_use_their_opacity() {
        for (role, class, opacity) in [
            ("hero", "hero-bg-image", "0.7"),
            ("candidate", "candidate-bg-image", "0.4"),
        ] {
            let mut doc = Document::new();
            let (region, _) = region(&mut doc, role);
            let img = insert_image(&mut doc, region, &image("a"), &InsertSettings::new("alt"));
            assert_eq!(doc.attribute(img, "class"), Some(class));
            assert_eq!(doc.style(img, "opacity").as_deref(), Some(opacity));
            assert_eq!(doc.style(img, "position").as_deref(), Some("absolute"));
        }
    }

    #[test]
    fn detail_roles_share_layout_but_not_class() {
        let mut doc = Document::new();
        let (policy, _) = region(&mut doc, "policy-detail");
        let (vision, _) = region(&mut doc, "vision");
        let settings = InsertSettings {
            alt: "x".to_string(),
            size: ImageSize::Small,
            position: ImagePosition::Left,
        };
        let a = insert_image(&mut doc, policy, &image("a"), &settings);
        let b = insert_image(&mut doc, vision, &image("b"), &settings);
        assert_eq!(doc.attribute(a, "class"), Some("policy-detail-img"));
        assert_eq!(doc.attribute(b, "class"), Some("vision-detail-img"));
        assert_eq!(doc.style(b, "margin-bottom").as_deref(), Some("1rem"));
    }

    #[test]
    fn generic_regions_get_a_captioned_container_that_is_replaced() {
        let mut doc = Document::new();
        let (region, placeholder) = region(&mut doc, "gallery-wall");
        let settings = InsertSettings {
            alt: "Rally".to_string(),
            size: ImageSize::Large,
            position: ImagePosition::Right,
        };
        insert_image(&mut doc, region, &image("a"), &settings);
        let container = insert_image(&mut doc, region, &image("b"), &settings);

        let containers = doc.query_all(region, &Selector::class("content-image-container"));
        assert_eq!(containers, vec![container]);
        assert!(doc.has_class(container, "size-large"));
        assert!(doc.has_class(container, "position-right"));
        assert_eq!(images_in(&doc, region).len(), 1);
        let caption = doc
            .query(container, &Selector::class("image-caption"))
            .expect("caption");
        assert_eq!(doc.text_content(caption), "Rally");
        assert_eq!(doc.style(placeholder, "display"), None);
    }

    #[test]
    fn unknown_roles_parse_as_generic() {
        assert_eq!(ImageRole::parse(Some("banner")), ImageRole::Generic);
        assert_eq!(ImageRole::parse(None), ImageRole::Generic);
        assert_eq!(ImageRole::parse(Some("vision-detail")), ImageRole::VisionDetail);
        assert_eq!(ImageSize::parse("full"), Some(ImageSize::Full));
        assert_eq!(ImagePosition::parse("middle"), None);
    }
}
