// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Image catalog, upload pipeline and region insertion behind one modal.

pub mod catalog;
pub mod generate;
pub mod insert;
pub mod upload;

pub use catalog::{ImageCatalog, UploadedImage};
pub use insert::{ImagePosition, ImageRole, ImageSize, InsertSettings};
pub use upload::{UploadFile, UploadPolicy, UploadSource};

use crate::dom::{Document, NodeId, Selector};
use crate::error::{CmsError, CmsResult};
use crate::notify::Affordances;
use crate::registry::{IMAGE_ROLE_ATTR, REGION_ID_ATTR};
use crate::storage::KeyValueStore;
use crate::util::{format_file_size, generate_image_id};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

pub const MODAL_ID: &str = "image-manager-modal";
pub const TITLE_ID: &str = "image-modal-title";
pub const UPLOAD_AREA_ID: &str = "image-upload-area";
pub const FILE_INPUT_ID: &str = "image-file-input";
pub const PREVIEW_ID: &str = "upload-preview";
pub const COUNT_ID: &str = "image-count";
pub const GALLERY_ID: &str = "image-gallery";
pub const SETTINGS_ID: &str = "image-settings";
pub const ALT_ID: &str = "image-alt";
pub const SIZE_ID: &str = "image-size";
pub const POSITION_ID: &str = "image-position";
pub const INSERT_BUTTON_ID: &str = "insert-image-btn";
pub const TEST_IMAGE_BUTTON_ID: &str = "create-test-image";
pub const CLOSE_BUTTON_ID: &str = "close-image-manager";

const HIDDEN_CLASS: &str = "hidden";
const SELECTED_CLASS: &str = "selected";
const GALLERY_ITEM_CLASS: &str = "gallery-item";
const DEFAULT_TITLE: &str = "Image manager";

/// What a click inside the image modal asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    Select(String),
    Delete(String),
    Insert,
    CreateTestImage,
    Close,
    /// The dimmed backdrop itself was clicked.
    Overlay,
}

/// Owns the catalog and the modal. The target region and the selection are
/// cleared whenever the modal hides.
#[derive(Debug, Default)]
pub struct ImageManager {
    catalog: ImageCatalog,
    policy: UploadPolicy,
    target: Option<NodeId>,
    selected: Option<String>,
}

impl ImageManager {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Loads the catalog and builds a fresh modal, dropping any stale copy
    /// left in the page.
    pub fn init(&mut self, doc: &mut Document, store: &dyn KeyValueStore) {
        self.catalog = ImageCatalog::load(store);
        if let Some(stale) = doc.element_by_id(MODAL_ID) {
            debug!("Replacing stale image manager modal");
            doc.remove(stale);
        }
        build_modal(doc);
        if let Err(err) = self.refresh_gallery(doc) {
            warn!("Gallery refresh failed during init: {}", err);
        }
        info!("Image manager ready with {} stored images", self.catalog.len());
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.element_by_id(MODAL_ID)
            .is_some_and(|modal| !doc.has_class(modal, HIDDEN_CLASS))
    }

    /// Shows the modal, targeting `region` when one is given.
    pub fn open_for_region(&mut self, doc: &mut Document, region: Option<NodeId>) -> CmsResult<()> {
        let modal = lookup(doc, MODAL_ID)?;
        let title = lookup(doc, TITLE_ID)?;
        let heading = match region {
            Some(region) => {
                let role = ImageRole::of_region(doc, region);
                let region_id = doc.attribute(region, REGION_ID_ATTR).unwrap_or("unnamed");
                format!("Add/replace {} image ({})", role, region_id)
            }
            None => DEFAULT_TITLE.to_string(),
        };
        doc.set_text_content(title, &heading);
        self.target = region;
        self.clear_selection(doc);
        doc.remove_class(modal, HIDDEN_CLASS);
        self.refresh_gallery(doc)?;
        debug!("Image manager opened: {}", heading);
        Ok(())
    }

    pub fn hide(&mut self, doc: &mut Document) {
        if let Some(modal) = doc.element_by_id(MODAL_ID) {
            doc.add_class(modal, HIDDEN_CLASS);
        }
        self.target = None;
        self.clear_selection(doc);
    }

    /// Re-renders the gallery and the image count from the catalog.
    pub fn refresh_gallery(&self, doc: &mut Document) -> CmsResult<()> {
        let gallery = lookup(doc, GALLERY_ID)?;
        let count = lookup(doc, COUNT_ID)?;
        doc.set_text_content(count, &self.catalog.len().to_string());
        doc.clear_children(gallery);

        if self.catalog.is_empty() {
            let empty = doc.append_element(gallery, "div", &[("class", "no-images")]);
            doc.append_text(empty, "No images stored yet.");
            return Ok(());
        }

        for image in self.catalog.iter() {
            let class = if self.selected.as_deref() == Some(image.id.as_str()) {
                "gallery-item selected"
            } else {
                GALLERY_ITEM_CLASS
            };
            let item = doc.append_element(
                gallery,
                "div",
                &[("class", class), ("data-image-id", image.id.as_str())],
            );
            let wrapper = doc.append_element(item, "div", &[("class", "image-wrapper")]);
            doc.append_element(
                wrapper,
                "img",
                &[
                    ("src", image.data_url.as_str()),
                    ("alt", image.name.as_str()),
                    ("loading", "lazy"),
                ],
            );
            let overlay = doc.append_element(wrapper, "div", &[("class", "image-overlay")]);
            let select = doc.append_element(
                overlay,
                "button",
                &[("class", "image-action select-btn"), ("data-action", "select")],
            );
            doc.append_text(select, "Select");
            let delete = doc.append_element(
                overlay,
                "button",
                &[("class", "image-action delete-btn"), ("data-action", "delete")],
            );
            doc.append_text(delete, "Delete");

            let info = doc.append_element(item, "div", &[("class", "image-info")]);
            let name = doc.append_element(
                info,
                "div",
                &[("class", "image-name"), ("title", image.name.as_str())],
            );
            doc.append_text(name, &image.name);
            let meta = doc.append_element(info, "div", &[("class", "image-meta")]);
            doc.append_text(
                meta,
                &format!(
                    "{} • {}",
                    format_file_size(image.size),
                    image.upload_date.format("%Y-%m-%d")
                ),
            );
        }
        Ok(())
    }

    /// Marks `id` as the image to insert and shows its settings.
    pub fn select(&mut self, doc: &mut Document, id: &str) -> CmsResult<()> {
        let Some(image) = self.catalog.get(id) else {
            return Err(CmsError::validation(format!("Image '{}' no longer exists.", id)));
        };
        let alt = image.default_alt();
        let gallery = lookup(doc, GALLERY_ID)?;
        let settings = lookup(doc, SETTINGS_ID)?;
        let alt_input = lookup(doc, ALT_ID)?;
        let insert = lookup(doc, INSERT_BUTTON_ID)?;

        for item in doc.query_all(gallery, &Selector::class(GALLERY_ITEM_CLASS)) {
            if doc.attribute(item, "data-image-id") == Some(id) {
                doc.add_class(item, SELECTED_CLASS);
            } else {
                doc.remove_class(item, SELECTED_CLASS);
            }
        }
        doc.remove_class(settings, HIDDEN_CLASS);
        doc.set_value(alt_input, &alt);
        doc.set_attribute(insert, "data-image-id", id);
        doc.remove_class(insert, HIDDEN_CLASS);
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self, doc: &mut Document) {
        self.selected = None;
        if let Some(gallery) = doc.element_by_id(GALLERY_ID) {
            for item in doc.query_all(gallery, &Selector::class(SELECTED_CLASS)) {
                doc.remove_class(item, SELECTED_CLASS);
            }
        }
        if let Some(settings) = doc.element_by_id(SETTINGS_ID) {
            doc.add_class(settings, HIDDEN_CLASS);
        }
        if let Some(insert) = doc.element_by_id(INSERT_BUTTON_ID) {
            doc.add_class(insert, HIDDEN_CLASS);
            doc.remove_attribute(insert, "data-image-id");
        }
    }

    /// Reads the settings panel; unknown choices fall back to the defaults.
    pub fn current_settings(&self, doc: &Document) -> InsertSettings {
        let read = |id: &str| {
            doc.element_by_id(id)
                .and_then(|control| doc.value(control))
                .unwrap_or_default()
        };
        let mut alt = read(ALT_ID).trim().to_string();
        if alt.is_empty()
            && let Some(image) = self.selected.as_deref().and_then(|id| self.catalog.get(id))
        {
            alt = image.name.clone();
        }
        InsertSettings {
            alt,
            size: ImageSize::parse(&read(SIZE_ID)).unwrap_or_default(),
            position: ImagePosition::parse(&read(POSITION_ID)).unwrap_or_default(),
        }
    }

    /// Inserts the selected image into the target region and closes.
    pub fn insert_selected(&mut self, doc: &mut Document) -> CmsResult<NodeId> {
        let Some(image) = self
            .selected
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .cloned()
        else {
            return Err(CmsError::validation("No image selected."));
        };
        let Some(region) = self.target.filter(|region| doc.is_connected(*region)) else {
            return Err(CmsError::validation("No image region is targeted."));
        };
        let settings = self.current_settings(doc);
        let inserted = insert::insert_image(doc, region, &image, &settings);
        info!("Inserted image '{}' into region {}", image.name, region);
        self.hide(doc);
        Ok(inserted)
    }

    /// Deletes after confirmation. Returns whether the image was removed.
    pub fn delete(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
        affordances: &dyn Affordances,
        id: &str,
    ) -> CmsResult<bool> {
        let Some(name) = self.catalog.get(id).map(|image| image.name.clone()) else {
            return Err(CmsError::validation(format!("Image '{}' no longer exists.", id)));
        };
        if !affordances.confirm(&format!("Delete image '{}'?", name)) {
            debug!("Deletion of '{}' declined", name);
            return Ok(false);
        }
        self.catalog.remove(id);
        if self.selected.as_deref() == Some(id) {
            self.clear_selection(doc);
        }
        let persisted = self.catalog.persist(store);
        self.refresh_gallery(doc)?;
        persisted?;
        info!("Deleted image '{}'", name);
        Ok(true)
    }

    pub fn validate_upload(&self, file: &UploadFile) -> CmsResult<()> {
        self.policy.validate(file)
    }

    /// Validates `file` and shows its in-progress entry. The returned id
    /// names the preview and becomes the image id once the read completes.
    pub fn begin_upload(
        &self,
        doc: &mut Document,
        file: &UploadFile,
        now: DateTime<Utc>,
    ) -> CmsResult<String> {
        self.validate_upload(file)?;
        let id = generate_image_id(now);
        let preview = lookup(doc, PREVIEW_ID)?;
        let preview_id = format!("preview-{}", id);
        let item = doc.append_element(
            preview,
            "div",
            &[("class", "upload-preview-item"), ("id", preview_id.as_str())],
        );
        let info = doc.append_element(item, "div", &[("class", "preview-info")]);
        let name = doc.append_element(info, "div", &[("class", "file-name")]);
        doc.append_text(name, &file.name);
        let size = doc.append_element(info, "div", &[("class", "file-size")]);
        doc.append_text(size, &format_file_size(file.size));
        let progress = doc.append_element(item, "div", &[("class", "upload-progress")]);
        doc.append_element(progress, "div", &[("class", "progress-bar")]);
        debug!("Upload of {} started as {}", file.name, id);
        Ok(id)
    }

    /// Applies a finished read. The preview goes away either way; a failed
    /// read leaves the catalog untouched.
    pub fn finish_upload(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
        id: &str,
        file: &UploadFile,
        read: CmsResult<String>,
        now: DateTime<Utc>,
    ) -> CmsResult<UploadedImage> {
        if let Some(preview) = doc.element_by_id(&format!("preview-{}", id)) {
            doc.remove(preview);
        }
        let data_url = read?;
        let image = UploadedImage {
            id: id.to_string(),
            name: file.name.clone(),
            data_url,
            size: file.size,
            mime_type: file.mime_type.clone(),
            upload_date: now,
        };
        self.catalog.insert(image.clone());
        let persisted = self.catalog.persist(store);
        self.refresh_gallery(doc)?;
        persisted?;
        info!("Stored upload '{}' ({})", image.name, format_file_size(image.size));
        Ok(image)
    }

    /// Renders a placeholder for the targeted role, stores it and, when a
    /// region is targeted, inserts it and closes the modal.
    pub fn create_test_image(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
        now: DateTime<Utc>,
    ) -> CmsResult<UploadedImage> {
        let target = self.target.filter(|region| doc.is_connected(*region));
        let role = target
            .map(|region| ImageRole::of_region(doc, region))
            .unwrap_or(ImageRole::Generic);
        // Names and alt text carry the region's own type, known or not.
        let label = target
            .and_then(|region| doc.attribute(region, IMAGE_ROLE_ATTR))
            .unwrap_or(ImageRole::Generic.as_str())
            .to_string();
        let png = generate::render_test_image(role)?;
        let image = UploadedImage {
            id: generate_image_id(now),
            name: format!("test_{}_{}.png", label, now.timestamp_millis()),
            data_url: upload::to_data_url("image/png", &png),
            size: png.len() as u64,
            mime_type: "image/png".to_string(),
            upload_date: now,
        };
        self.catalog.insert(image.clone());
        let persisted = self.catalog.persist(store);
        self.refresh_gallery(doc)?;

        if let Some(region) = target {
            let settings = InsertSettings::new(&format!("Test {} image", label));
            insert::insert_image(doc, region, &image, &settings);
            self.hide(doc);
        }
        persisted?;
        info!("Created test image '{}'", image.name);
        Ok(image)
    }

    /// Returns the download file name and the pretty-printed catalog.
    pub fn export(&self, now: DateTime<Utc>) -> CmsResult<(String, String)> {
        let json = self.catalog.to_export_json()?;
        Ok((catalog::export_file_name(now.date_naive()), json))
    }

    /// Merges an exported catalog; imported entries win on id collisions.
    pub fn import_json(
        &mut self,
        doc: &mut Document,
        store: &dyn KeyValueStore,
        json: &str,
    ) -> CmsResult<usize> {
        let imported = catalog::parse_import(json)?;
        let merged = self.catalog.merge(imported);
        let persisted = self.catalog.persist(store);
        if let Err(err) = self.refresh_gallery(doc) {
            debug!("Gallery not refreshed after import: {}", err);
        }
        persisted?;
        info!("Imported {} images", merged);
        Ok(merged)
    }

    /// Resolves a click inside the modal to the action it stands for.
    pub fn modal_action(&self, doc: &Document, target: NodeId) -> Option<ModalAction> {
        let modal = doc.element_by_id(MODAL_ID)?;
        if target == modal {
            return Some(ModalAction::Overlay);
        }
        if doc.closest(target, &Selector::id(MODAL_ID)).is_none() {
            return None;
        }
        if let Some(button) = doc.closest(target, &Selector::attr("data-action")) {
            let item = doc.closest(button, &Selector::class(GALLERY_ITEM_CLASS))?;
            let id = doc.attribute(item, "data-image-id")?.to_string();
            return match doc.attribute(button, "data-action") {
                Some("select") => Some(ModalAction::Select(id)),
                Some("delete") => Some(ModalAction::Delete(id)),
                _ => None,
            };
        }
        if doc.closest(target, &Selector::id(INSERT_BUTTON_ID)).is_some() {
            return Some(ModalAction::Insert);
        }
        if doc.closest(target, &Selector::id(TEST_IMAGE_BUTTON_ID)).is_some() {
            return Some(ModalAction::CreateTestImage);
        }
        if doc.closest(target, &Selector::id(CLOSE_BUTTON_ID)).is_some() {
            return Some(ModalAction::Close);
        }
        None
    }
}

fn lookup(doc: &Document, id: &str) -> CmsResult<NodeId> {
    doc.element_by_id(id)
        .ok_or_else(|| CmsError::missing_dom(format!("image manager element #{} not found", id)))
}

fn build_modal(doc: &mut Document) -> NodeId {
    let body = doc.body();
    let modal = doc.append_element(
        body,
        "div",
        &[("id", MODAL_ID), ("class", "popup-overlay hidden")],
    );
    let content = doc.append_element(
        modal,
        "div",
        &[("class", "popup-content image-manager-content")],
    );
    let title = doc.append_element(content, "h3", &[("id", TITLE_ID)]);
    doc.append_text(title, DEFAULT_TITLE);

    let upload = doc.append_element(
        content,
        "div",
        &[("id", UPLOAD_AREA_ID), ("class", "upload-area")],
    );
    doc.append_element(
        upload,
        "input",
        &[
            ("type", "file"),
            ("id", FILE_INPUT_ID),
            ("accept", "image/*"),
            ("multiple", "multiple"),
        ],
    );
    let hint = doc.append_element(upload, "p", &[]);
    doc.append_text(hint, "Click or drop images here (max 5MB each)");
    doc.append_element(content, "div", &[("id", PREVIEW_ID), ("class", "upload-preview")]);

    let header = doc.append_element(content, "div", &[("class", "gallery-header")]);
    let heading = doc.append_element(header, "h4", &[]);
    doc.append_text(heading, "Stored images (");
    let count = doc.append_element(heading, "span", &[("id", COUNT_ID)]);
    doc.append_text(count, "0");
    doc.append_text(heading, ")");
    doc.append_element(content, "div", &[("id", GALLERY_ID), ("class", "image-gallery")]);

    let settings = doc.append_element(
        content,
        "div",
        &[("id", SETTINGS_ID), ("class", "image-settings hidden")],
    );
    let alt_row = doc.append_element(settings, "div", &[("class", "form-group")]);
    let alt_label = doc.append_element(alt_row, "label", &[("for", ALT_ID)]);
    doc.append_text(alt_label, "Alt text:");
    doc.append_element(alt_row, "input", &[("type", "text"), ("id", ALT_ID)]);

    let size_options: Vec<(&str, &str)> = ImageSize::ALL
        .iter()
        .map(|size| (size.as_str(), size.label()))
        .collect();
    append_select(doc, settings, SIZE_ID, "Size:", &size_options, ImageSize::default().as_str());
    let position_options: Vec<(&str, &str)> = ImagePosition::ALL
        .iter()
        .map(|position| (position.as_str(), position.label()))
        .collect();
    append_select(
        doc,
        settings,
        POSITION_ID,
        "Position:",
        &position_options,
        ImagePosition::default().as_str(),
    );

    let buttons = doc.append_element(content, "div", &[("class", "popup-buttons")]);
    for (id, class, label) in [
        (INSERT_BUTTON_ID, "admin-btn primary hidden", "Insert image"),
        (TEST_IMAGE_BUTTON_ID, "admin-btn", "Create test image"),
        (CLOSE_BUTTON_ID, "admin-btn secondary", "Close"),
    ] {
        let button = doc.append_element(buttons, "button", &[("id", id), ("class", class)]);
        doc.append_text(button, label);
    }
    modal
}

fn append_select(
    doc: &mut Document,
    parent: NodeId,
    id: &str,
    label: &str,
    options: &[(&str, &str)],
    selected: &str,
) {
    let row = doc.append_element(parent, "div", &[("class", "form-group")]);
    let label_node = doc.append_element(row, "label", &[("for", id)]);
    doc.append_text(label_node, label);
    let select = doc.append_element(row, "select", &[("id", id)]);
    for &(value, text) in options {
        let option = if value == selected {
            doc.append_element(select, "option", &[("value", value), ("selected", "selected")])
        } else {
            doc.append_element(select, "option", &[("value", value)])
        };
        doc.append_text(option, text);
    }
    doc.set_value(select, selected);
}
