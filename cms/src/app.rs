// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! The editing layer as one object: the page, its stores and every
//! component, with clicks and keys routed through it.
//!
//! Failures never escape as panics. Markup defects are logged; everything
//! else is also shown to the operator.

use crate::admin::{self, AdminController, AdminState, ClickAction, Role};
use crate::clock::{Clock, SystemClock};
use crate::config::CmsConfig;
use crate::dom::events::{ClickEvent, KeyEvent};
use crate::dom::{Document, NodeId, Selector};
use crate::editor::{self, ContentEditor};
use crate::error::{CmsError, CmsResult};
use crate::host::{self, HostApp, ModeListener, StaticHost};
use crate::images::{self, ImageManager, ModalAction, UploadFile, UploadPolicy, UploadedImage};
use crate::notify::{Affordances, LogAffordances, Severity};
use crate::registry::sweep::{RendererMarkerPass, SweepReport};
use crate::registry::{self, ContentSnapshot, IMAGE_ROLE_ATTR, REGION_ID_ATTR};
use crate::storage::{self, Stores};
use chrono::SecondsFormat;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use std::path::Path;
use std::rc::Rc;

const POLICY_CONTAINERS: [&str; 3] = ["policy-detail", "policy-card", "vision-button"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmsStats {
    pub editable_groups: usize,
    /// Groups nested inside policy cards, policy details or vision buttons.
    pub policy_groups: usize,
    pub image_triggers: usize,
    pub stored_images: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub state: AdminState,
    pub logged_in: bool,
    pub admin_active: bool,
    pub user: Option<String>,
    pub editing_group: Option<String>,
    pub image_manager_open: bool,
    pub routers_installed: bool,
    pub debug_mode: bool,
    pub content_saved: bool,
    pub durable_bytes: Option<usize>,
    pub stats: CmsStats,
}

pub struct CmsAppBuilder {
    doc: Document,
    config: CmsConfig,
    stores: Stores,
    clock: Rc<dyn Clock>,
    affordances: Rc<dyn Affordances>,
    host: Rc<dyn HostApp>,
    mode_listeners: Vec<Rc<dyn ModeListener>>,
}

impl CmsAppBuilder {
    pub fn config(mut self, config: CmsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = stores;
        self
    }

    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn affordances(mut self, affordances: Rc<dyn Affordances>) -> Self {
        self.affordances = affordances;
        self
    }

    pub fn host(mut self, host: Rc<dyn HostApp>) -> Self {
        self.host = host;
        self
    }

    /// Adds a renderer to the mode-changed broadcast. The candidate profile
    /// pass is always registered.
    pub fn mode_listener(mut self, listener: Rc<dyn ModeListener>) -> Self {
        self.mode_listeners.push(listener);
        self
    }

    pub fn build(self) -> CmsApp {
        let mut admin = AdminController::new(&self.config, self.clock.clone());
        for listener in self.mode_listeners {
            admin.add_mode_listener(listener);
        }
        let images = ImageManager::new(UploadPolicy::from(&self.config.upload));
        CmsApp {
            doc: self.doc,
            config: self.config,
            stores: self.stores,
            clock: self.clock,
            affordances: self.affordances,
            host: self.host,
            admin,
            editor: ContentEditor::new(),
            images,
            debug_mode: false,
        }
    }
}

pub struct CmsApp {
    doc: Document,
    config: CmsConfig,
    stores: Stores,
    clock: Rc<dyn Clock>,
    affordances: Rc<dyn Affordances>,
    host: Rc<dyn HostApp>,
    admin: AdminController,
    editor: ContentEditor,
    images: ImageManager,
    debug_mode: bool,
}

impl CmsApp {
    pub fn builder(doc: Document) -> CmsAppBuilder {
        let candidate_pass: Rc<dyn ModeListener> = Rc::new(RendererMarkerPass::candidate_profile());
        CmsAppBuilder {
            doc,
            config: CmsConfig::default(),
            stores: Stores::in_memory(),
            clock: Rc::new(SystemClock),
            affordances: Rc::new(LogAffordances),
            host: Rc::new(StaticHost::ready()),
            mode_listeners: vec![candidate_pass],
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    pub fn admin(&self) -> &AdminController {
        &self.admin
    }

    pub fn editor(&self) -> &ContentEditor {
        &self.editor
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Waits for the host application, bounded by the configured poll
    /// budget, then wires the editing layer. Returns whether the host was
    /// ready in time.
    pub async fn start(&mut self) -> bool {
        let host = self.host.clone();
        let ready = host::wait_for_host(
            host.as_ref(),
            self.config.host_poll_interval(),
            self.config.host.poll_attempts,
        )
        .await;
        self.initialize();
        ready
    }

    /// Wires the editing layer without waiting for the host.
    pub fn initialize(&mut self) {
        self.debug_mode = matches!(
            self.stores.durable.get(storage::DEBUG_MODE_KEY),
            Ok(Some(ref flag)) if flag == "true"
        );
        self.images.init(&mut self.doc, self.stores.durable.as_ref());
        self.admin.restore_session(self.stores.session.as_ref());
        self.admin.update_button(&mut self.doc);
        info!(
            "Editing layer ready (logged in: {}, debug: {})",
            self.admin.is_logged_in(),
            self.debug_mode
        );
    }

    /// Dispatches a click on `target` and performs what the listeners ask.
    pub fn click(&mut self, target: NodeId) -> ClickEvent {
        let (event, actions) = self.admin.dispatch(&self.doc, target);
        for action in actions {
            self.perform(action);
        }
        event
    }

    pub fn key_down(&mut self, event: &mut KeyEvent) {
        if self.editor.is_open() {
            if event.is_escape() {
                event.prevent_default();
                event.stop_propagation();
                self.cancel_edit();
                return;
            }
            if event.is_save_shortcut() {
                event.prevent_default();
                event.stop_propagation();
                if let Err(err) = self.save_edit() {
                    self.report(&err);
                }
                return;
            }
        }
        if !event.is_escape() {
            return;
        }
        if self.login_modal_open() {
            event.prevent_default();
            event.stop_propagation();
            self.admin.hide_login(&mut self.doc);
        } else if self.images.is_open(&self.doc) {
            event.prevent_default();
            self.images.hide(&mut self.doc);
        }
    }

    fn perform(&mut self, action: ClickAction) {
        let outcome = match action {
            ClickAction::OpenImageManager { region, trigger } => {
                self.route_image_click(region, trigger)
            }
            ClickAction::EditGroup(group) => self.open_content_editor(group),
            ClickAction::RevealAdminToggle => self.admin.reveal_toggle(&mut self.doc).map(|()| {
                self.affordances.show_message(
                    Severity::Info,
                    "Admin toggle revealed. Use the button to log in.",
                );
            }),
            ClickAction::AdminButton => {
                if self.admin.is_logged_in() {
                    self.toggle_admin_mode().map(|_| ())
                } else {
                    self.admin.show_login(&mut self.doc)
                }
            }
            ClickAction::SubmitLogin => self.submit_login().map(|_| ()),
            ClickAction::CancelLogin => {
                self.admin.hide_login(&mut self.doc);
                Ok(())
            }
            ClickAction::SaveEdit => self.save_edit().map(|_| ()),
            ClickAction::CancelEdit => {
                self.cancel_edit();
                Ok(())
            }
            ClickAction::ImageModal(target) => self.image_modal_click(target),
        };
        if let Err(err) = outcome {
            self.report(&err);
        }
    }

    fn route_image_click(&mut self, region: NodeId, trigger: NodeId) -> CmsResult<()> {
        if region != trigger {
            for attribute in [IMAGE_ROLE_ATTR, REGION_ID_ATTR] {
                if let Some(value) = self.doc.attribute(trigger, attribute).map(str::to_string) {
                    self.doc.set_attribute(region, attribute, &value);
                }
            }
        }
        if self.debug_mode {
            info!(
                "Image trigger {} routed to region {} ({:?})",
                trigger,
                region,
                self.doc.attribute(region, IMAGE_ROLE_ATTR)
            );
        }
        self.open_image_manager_for_region(Some(region))
    }

    fn image_modal_click(&mut self, target: NodeId) -> CmsResult<()> {
        let Some(action) = self.images.modal_action(&self.doc, target) else {
            return Ok(());
        };
        match action {
            ModalAction::Select(id) => self.images.select(&mut self.doc, &id),
            ModalAction::Delete(id) => self.delete_image(&id).map(|_| ()),
            ModalAction::Insert => self.insert_selected_image().map(|_| ()),
            ModalAction::CreateTestImage => self.generate_test_image().map(|_| ()),
            ModalAction::Close | ModalAction::Overlay => {
                self.images.hide(&mut self.doc);
                Ok(())
            }
        }
    }

    fn login_modal_open(&self) -> bool {
        self.doc
            .element_by_id(admin::routers::LOGIN_MODAL_ID)
            .is_some_and(|modal| !self.doc.has_class(modal, "hidden"))
    }

    /// Logs a failure; everything except markup defects also reaches the
    /// operator.
    fn report(&self, err: &CmsError) {
        if err.is_user_facing() {
            warn!("{}", err);
            self.affordances.show_message(Severity::Error, err.message());
        } else {
            error!("{}", err);
        }
    }

    fn close_dialogs(&mut self) {
        if self.editor.is_open() {
            self.editor.cancel(&mut self.doc);
        }
        if self.images.is_open(&self.doc) {
            self.images.hide(&mut self.doc);
        }
    }

    pub fn show_login(&mut self) -> CmsResult<()> {
        self.admin.show_login(&mut self.doc)
    }

    pub fn login(&mut self, username: &str, password: &str) -> CmsResult<Role> {
        let result = self
            .admin
            .login(&mut self.doc, self.stores.session.as_ref(), username, password);
        self.after_login(result)
    }

    pub fn submit_login(&mut self) -> CmsResult<Role> {
        let result = self
            .admin
            .submit_login(&mut self.doc, self.stores.session.as_ref());
        self.after_login(result)
    }

    fn after_login(&self, result: CmsResult<Role>) -> CmsResult<Role> {
        match &result {
            Ok(_) => {
                self.affordances.show_message(Severity::Success, "Login successful.");
                self.announce_admin_mode(true);
            }
            Err(err) => self.report(err),
        }
        result
    }

    pub fn logout(&mut self) {
        self.close_dialogs();
        self.admin.logout(
            &mut self.doc,
            self.stores.session.as_ref(),
            self.host.as_ref(),
        );
        self.affordances.show_message(Severity::Info, "Logged out.");
    }

    /// Returns whether admin mode is on afterwards.
    pub fn toggle_admin_mode(&mut self) -> CmsResult<bool> {
        if self.admin.is_active() {
            self.close_dialogs();
        }
        let active = self.admin.toggle(&mut self.doc, self.host.as_ref())?;
        self.announce_admin_mode(active);
        Ok(active)
    }

    fn announce_admin_mode(&self, active: bool) {
        if active {
            self.affordances.show_message(
                Severity::Success,
                "Admin mode on. Click a highlighted area to add an image, or text to edit it.",
            );
        } else {
            self.affordances.show_message(Severity::Info, "Admin mode off.");
        }
    }

    pub fn is_admin_mode_active(&self) -> bool {
        self.admin.is_active()
    }

    pub fn admin_button_label(&self) -> &'static str {
        self.admin.button_label()
    }

    /// Idempotent; renderers call it after every re-render.
    pub fn resweep_editable_markers(&mut self) -> SweepReport {
        self.admin.resweep(&mut self.doc)
    }

    pub fn open_image_manager_for_region(&mut self, region: Option<NodeId>) -> CmsResult<()> {
        self.images.open_for_region(&mut self.doc, region)
    }

    pub fn open_content_editor(&mut self, group: NodeId) -> CmsResult<()> {
        self.editor.open(&mut self.doc, group)?;
        if self.debug_mode {
            info!("Editor opened for '{}'", self.editor.editing_group_id().unwrap_or_default());
        }
        Ok(())
    }

    /// Applies the open edit and writes the page snapshot. `Ok(None)` when
    /// no edit was open.
    pub fn save_edit(&mut self) -> CmsResult<Option<ContentSnapshot>> {
        if self.editor.apply(&mut self.doc)?.is_none() {
            return Ok(None);
        }
        let snapshot = editor::persist_snapshot(
            &self.doc,
            self.stores.durable.as_ref(),
            self.admin.current_user(),
            self.clock.now(),
        )?;
        self.affordances.show_message(Severity::Success, "Content saved.");
        Ok(Some(snapshot))
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel(&mut self.doc);
    }

    /// Reads every accepted file concurrently and stores each one as soon
    /// as its read finishes. Results follow completion order, rejected
    /// files first.
    pub async fn upload_files(&mut self, files: Vec<UploadFile>) -> Vec<CmsResult<UploadedImage>> {
        let mut results = Vec::with_capacity(files.len());
        let mut started = Vec::new();
        for file in files {
            match self.images.begin_upload(&mut self.doc, &file, self.clock.now()) {
                Ok(id) => started.push((id, file)),
                Err(err) => {
                    self.report(&err);
                    results.push(Err(err));
                }
            }
        }

        let mut reads: FuturesUnordered<_> = started
            .iter()
            .enumerate()
            .map(|(index, (_, file))| async move { (index, images::upload::read_data_url(file).await) })
            .collect();
        while let Some((index, read)) = reads.next().await {
            let (id, file) = &started[index];
            let outcome = self.images.finish_upload(
                &mut self.doc,
                self.stores.durable.as_ref(),
                id,
                file,
                read,
                self.clock.now(),
            );
            match &outcome {
                Ok(image) => self
                    .affordances
                    .show_message(Severity::Success, &format!("Uploaded {}.", image.name)),
                Err(err) => self.report(err),
            }
            results.push(outcome);
        }
        results
    }

    pub fn select_image(&mut self, id: &str) -> CmsResult<()> {
        self.images.select(&mut self.doc, id)
    }

    pub fn insert_selected_image(&mut self) -> CmsResult<NodeId> {
        let inserted = self.images.insert_selected(&mut self.doc)?;
        self.affordances.show_message(Severity::Success, "Image inserted.");
        Ok(inserted)
    }

    pub fn delete_image(&mut self, id: &str) -> CmsResult<bool> {
        let deleted = self.images.delete(
            &mut self.doc,
            self.stores.durable.as_ref(),
            self.affordances.as_ref(),
            id,
        )?;
        if deleted {
            self.affordances.show_message(Severity::Success, "Image deleted.");
        }
        Ok(deleted)
    }

    pub fn generate_test_image(&mut self) -> CmsResult<UploadedImage> {
        let image = self.images.create_test_image(
            &mut self.doc,
            self.stores.durable.as_ref(),
            self.clock.now(),
        )?;
        self.affordances
            .show_message(Severity::Success, &format!("Created {}.", image.name));
        Ok(image)
    }

    /// Download file name and JSON body of the image catalog.
    pub fn export_images(&self) -> CmsResult<(String, String)> {
        self.images.export(self.clock.now())
    }

    pub fn import_images(&mut self, json: &str) -> CmsResult<usize> {
        let merged = self
            .images
            .import_json(&mut self.doc, self.stores.durable.as_ref(), json)?;
        self.affordances
            .show_message(Severity::Success, &format!("Imported {} images.", merged));
        Ok(merged)
    }

    pub async fn import_images_file(&mut self, path: &Path) -> CmsResult<usize> {
        let json = tokio::fs::read_to_string(path).await.map_err(|err| {
            CmsError::validation(format!("Could not read {}: {}", path.display(), err))
        })?;
        self.import_images(&json)
    }

    /// Stores the current page under a timestamped backup key.
    pub fn create_backup(&self) -> CmsResult<String> {
        let now = self.clock.now();
        let snapshot = registry::extract_all(&self.doc, self.admin.current_user(), now);
        let key = format!(
            "{}{}",
            storage::BACKUP_KEY_PREFIX,
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        storage::write_json(self.stores.durable.as_ref(), &key, &snapshot)?;
        info!("Backup written to {}", key);
        self.affordances
            .show_message(Severity::Success, "Backup created.");
        Ok(key)
    }

    /// Backup keys, oldest first.
    pub fn list_backups(&self) -> CmsResult<Vec<String>> {
        list_backups(self.stores.durable.as_ref())
    }

    pub fn load_backup(&self, key: &str) -> CmsResult<ContentSnapshot> {
        load_backup(self.stores.durable.as_ref(), key)
    }

    pub fn set_debug_mode(&mut self, enabled: bool) -> CmsResult<()> {
        set_debug_flag(self.stores.durable.as_ref(), enabled)?;
        self.debug_mode = enabled;
        Ok(())
    }

    pub fn stats(&self) -> CmsStats {
        let root = self.doc.root();
        let groups = self.doc.query_all(root, &registry::group_selector());
        let containers = POLICY_CONTAINERS
            .iter()
            .map(|class| Selector::class(class))
            .fold(Selector::Any(Vec::new()), Selector::or);
        let policy_groups = groups
            .iter()
            .filter(|group| {
                self.doc
                    .parent(**group)
                    .is_some_and(|parent| self.doc.closest(parent, &containers).is_some())
            })
            .count();
        CmsStats {
            editable_groups: groups.len(),
            policy_groups,
            image_triggers: self
                .doc
                .query_all(root, &registry::image_trigger_selector())
                .len(),
            stored_images: self.images.catalog().len(),
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let durable = self.stores.durable.as_ref();
        let content_saved = matches!(durable.get(storage::CONTENT_LATEST_KEY), Ok(Some(_)));
        let durable_bytes = durable
            .used_bytes()
            .map_err(|err| debug!("Storage usage unavailable: {}", err))
            .ok();
        Diagnostics {
            state: self.admin.state(),
            logged_in: self.admin.is_logged_in(),
            admin_active: self.admin.is_active(),
            user: self.admin.current_user().map(str::to_string),
            editing_group: self.editor.editing_group_id().map(str::to_string),
            image_manager_open: self.images.is_open(&self.doc),
            routers_installed: self.admin.routers_installed(),
            debug_mode: self.debug_mode,
            content_saved,
            durable_bytes,
            stats: self.stats(),
        }
    }
}

pub fn list_backups(store: &dyn storage::KeyValueStore) -> CmsResult<Vec<String>> {
    let mut keys: Vec<String> = store
        .keys()?
        .into_iter()
        .filter(|key| key.starts_with(storage::BACKUP_KEY_PREFIX))
        .collect();
    keys.sort();
    Ok(keys)
}

pub fn load_backup(store: &dyn storage::KeyValueStore, key: &str) -> CmsResult<ContentSnapshot> {
    if !key.starts_with(storage::BACKUP_KEY_PREFIX) {
        return Err(CmsError::validation(format!("'{}' is not a backup key.", key)));
    }
    storage::read_json(store, key)?
        .ok_or_else(|| CmsError::validation(format!("Backup '{}' not found.", key)))
}

pub fn set_debug_flag(store: &dyn storage::KeyValueStore, enabled: bool) -> CmsResult<()> {
    if enabled {
        store.set(storage::DEBUG_MODE_KEY, "true")?;
    } else {
        store.remove(storage::DEBUG_MODE_KEY)?;
    }
    info!("Debug mode {}", if enabled { "on" } else { "off" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingAffordances;
    use crate::registry::{FIELD_ATTR, GROUP_ATTR};
    use chrono::{Duration, Utc};

    fn app() -> (CmsApp, Rc<ManualClock>, Rc<RecordingAffordances>) {
        let mut doc = Document::new();
        let body = doc.body();
        let modal = doc.append_element(
            body,
            "div",
            &[("id", editor::MODAL_ID), ("class", "popup-overlay hidden")],
        );
        doc.append_element(modal, "h3", &[("id", editor::TITLE_ID)]);
        doc.append_element(modal, "div", &[("id", editor::BODY_ID)]);
        let card = doc.append_element(body, "div", &[("class", "policy-card")]);
        let about = doc.append_element(card, "div", &[(GROUP_ATTR, "about")]);
        let title = doc.append_element(about, "h2", &[(FIELD_ATTR, "title")]);
        doc.append_text(title, "About us");

        let clock = Rc::new(ManualClock::new(Utc::now()));
        let affordances = Rc::new(RecordingAffordances::default());
        let mut app = CmsApp::builder(doc)
            .clock(clock.clone())
            .affordances(affordances.clone())
            .build();
        app.initialize();
        (app, clock, affordances)
    }

    #[test]
    fn backups_are_listed_oldest_first_and_load_back() {
        let (app, clock, _) = app();
        let first = app.create_backup().expect("first");
        clock.advance(Duration::seconds(5));
        let second = app.create_backup().expect("second");
        assert_eq!(app.list_backups().expect("list"), vec![first.clone(), second]);
        let snapshot = app.load_backup(&first).expect("load");
        assert_eq!(snapshot.content["about"]["title"], "About us");
        assert!(app.load_backup("cms_images").is_err());
    }

    #[test]
    fn debug_flag_round_trips_through_durable_storage() {
        let (mut app, _, _) = app();
        app.set_debug_mode(true).expect("on");
        assert_eq!(
            app.stores.durable.get(storage::DEBUG_MODE_KEY).expect("get").as_deref(),
            Some("true")
        );
        app.initialize();
        assert!(app.debug_mode());
        app.set_debug_mode(false).expect("off");
        assert_eq!(app.stores.durable.get(storage::DEBUG_MODE_KEY).expect("get"), None);
    }

    #[test]
    fn stats_count_policy_groups_by_container() {
        let (app, _, _) = app();
        let stats = app.stats();
        assert_eq!(stats.editable_groups, 1);
        assert_eq!(stats.policy_groups, 1);
        assert_eq!(stats.image_triggers, 0);
        assert_eq!(stats.stored_images, 0);
    }

    #[test]
    fn missing_markup_is_logged_but_not_shown() {
        let (mut app, _, affordances) = app();
        let body = app.doc().body();
        let editor_modal = app.doc().element_by_id(editor::MODAL_ID).expect("modal");
        app.doc_mut().remove(editor_modal);
        app.login("admin", "leewookyu2026!").expect("login");
        affordances.clear();

        let about = app
            .doc()
            .query(body, &Selector::attr_eq(GROUP_ATTR, "about"))
            .expect("about");
        app.click(about);
        assert!(affordances.messages().is_empty());
        assert!(!app.editor().is_open());
    }

    #[test]
    fn diagnostics_reflect_login_and_storage() {
        let (mut app, _, _) = app();
        let before = app.diagnostics();
        assert!(!before.logged_in);
        assert!(!before.content_saved);

        app.login("editor", "jinan2026!").expect("login");
        let after = app.diagnostics();
        assert_eq!(after.state, AdminState::AuthenticatedActive);
        assert_eq!(after.user.as_deref(), Some("editor"));
        assert!(after.routers_installed);
        assert_eq!(app.admin_button_label(), "Exit");
    }
}
