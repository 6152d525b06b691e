// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use campaign_cms::dom::Selector;
use campaign_cms::images::{self, UploadFile};
use campaign_cms::registry::{IMAGE_ROLE_ATTR, IMAGE_TRIGGER_CLASS, PLACEHOLDER_CLASS, REGION_ID_ATTR};
use campaign_cms::registry::sweep::HERO_BACKGROUND_ID;
use common::{ADMIN_PASSWORD, ADMIN_USER, HEADER_REGION_ID, TestPage, png_bytes};

const TWO_MB: usize = 2 * 1024 * 1024;

async fn page_with_photo() -> (TestPage, String) {
    let mut page = TestPage::new();
    page.log_in_through_modal(ADMIN_USER, ADMIN_PASSWORD);
    let results = page
        .app
        .upload_files(vec![UploadFile::from_bytes(
            "photo.png",
            "image/png",
            png_bytes(TWO_MB),
        )])
        .await;
    let image = results
        .into_iter()
        .next()
        .expect("one result")
        .expect("upload accepted");
    (page, image.id)
}

fn gallery_button(page: &TestPage, image_id: &str, action: &str) -> campaign_cms::dom::NodeId {
    let doc = page.app.doc();
    let item = doc
        .query(doc.root(), &Selector::attr_eq("data-image-id", image_id).and(Selector::class("gallery-item")))
        .expect("gallery item");
    doc.query(item, &Selector::attr_eq("data-action", action))
        .expect("gallery button")
}

#[tokio::test]
async fn photo_upload_inserts_into_the_header_region() {
    let (mut page, image_id) = page_with_photo().await;

    let image = page.app.images().catalog().get(&image_id).expect("stored").clone();
    assert_eq!(image.name, "photo.png");
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.size, TWO_MB as u64);
    assert_eq!(page.text(page.by_id(images::COUNT_ID)), "1");

    let region = page.header_region();
    let event = page.app.click(region);
    assert!(event.default_prevented());
    assert!(page.app.images().is_open(page.app.doc()));
    assert_eq!(page.app.images().target(), Some(region));
    assert_eq!(
        page.text(page.by_id(images::TITLE_ID)),
        format!("Add/replace header-top image ({})", HEADER_REGION_ID)
    );

    let select = gallery_button(&page, &image_id, "select");
    page.app.click(select);
    assert_eq!(page.app.images().selected(), Some(image_id.as_str()));
    page.click_id(images::INSERT_BUTTON_ID);

    assert!(!page.app.images().is_open(page.app.doc()));
    let doc = page.app.doc();
    let first = doc.first_child(region).expect("first child");
    assert_eq!(doc.tag(first), Some("img"));
    assert_eq!(doc.attribute(first, "src"), Some(image.data_url.as_str()));
    assert_eq!(page.images_in(region).len(), 1);
    let placeholder = doc.query(region, &Selector::class(PLACEHOLDER_CLASS)).expect("placeholder");
    assert_eq!(doc.style(placeholder, "display").as_deref(), Some("none"));
}

#[tokio::test]
async fn inserting_twice_replaces_the_previous_image() {
    let (mut page, image_id) = page_with_photo().await;
    let region = page.header_region();
    for _ in 0..2 {
        page.app.click(region);
        page.app.select_image(&image_id).expect("select");
        page.app.insert_selected_image().expect("insert");
    }
    assert_eq!(page.images_in(region).len(), 1);
}

#[test]
fn nested_trigger_opens_only_the_image_manager() {
    let mut page = TestPage::new();
    page.log_in_through_modal(ADMIN_USER, ADMIN_PASSWORD);

    let background = page.group(HERO_BACKGROUND_ID);
    let doc = page.app.doc();
    let trigger = doc
        .query(background, &Selector::class(IMAGE_TRIGGER_CLASS))
        .expect("hero trigger");
    let caption = doc.query(trigger, &Selector::tag("p")).expect("caption");

    let event = page.app.click(caption);

    assert!(event.default_prevented());
    assert!(event.immediate_propagation_stopped());
    assert!(page.app.images().is_open(page.app.doc()));
    assert!(!page.app.editor().is_open());
    assert_eq!(page.app.images().target(), Some(background));
    let doc = page.app.doc();
    assert_eq!(doc.attribute(background, IMAGE_ROLE_ATTR), Some("hero"));
    assert_eq!(doc.attribute(background, REGION_ID_ATTR), Some(HERO_BACKGROUND_ID));
}

#[test]
fn triggers_are_inert_outside_admin_mode() {
    let mut page = TestPage::new();
    let region = page.header_region();
    let event = page.app.click(region);
    assert!(!event.default_prevented());
    assert!(!page.app.images().is_open(page.app.doc()));
}

#[test]
fn test_image_fills_the_targeted_region_and_closes() {
    let mut page = TestPage::new();
    page.log_in_through_modal(ADMIN_USER, ADMIN_PASSWORD);
    let region = page.header_region();
    page.app.click(region);

    page.click_id(images::TEST_IMAGE_BUTTON_ID);

    assert!(!page.app.images().is_open(page.app.doc()));
    assert_eq!(page.app.images().catalog().len(), 1);
    let image = page.app.images().catalog().iter().next().expect("image").clone();
    assert!(image.name.starts_with("test_header-top_"));
    let inserted = page.images_in(region);
    assert_eq!(inserted.len(), 1);
    assert_eq!(
        page.app.doc().attribute(inserted[0], "alt"),
        Some("Test header-top image")
    );
}

#[tokio::test]
async fn escape_and_close_hide_the_image_manager() {
    let (mut page, _) = page_with_photo().await;
    let region = page.header_region();

    page.app.click(region);
    let mut escape = campaign_cms::dom::events::KeyEvent::new("Escape");
    page.app.key_down(&mut escape);
    assert!(!page.app.images().is_open(page.app.doc()));
    assert_eq!(page.app.images().target(), None);

    page.app.click(region);
    page.click_id(images::CLOSE_BUTTON_ID);
    assert!(!page.app.images().is_open(page.app.doc()));
}
