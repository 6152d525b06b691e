// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BackupCommand, CliCommand, CliError, ImageCommand};
use crate::app::{self, CmsApp};
use crate::config::CmsConfig;
use crate::dom::Document;
use crate::images::UploadFile;
use crate::notify::{Affordances, Severity};
use crate::registry::ContentSnapshot;
use crate::storage::{FlatFileStore, MemoryStore, Stores};
use crate::util::{detect_mime_type, format_file_size};
use log::debug;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::io::AsyncReadExt;

/// Enough leading bytes for every signature `infer` knows about images.
const SNIFF_BYTES: usize = 8192;

/// Prints operator messages and answers confirmations from a command flag.
pub struct ConsoleAffordances {
    assume_yes: bool,
}

impl ConsoleAffordances {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Affordances for ConsoleAffordances {
    fn show_message(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => eprintln!("{}", message),
            _ => println!("{}", message),
        }
    }

    fn confirm(&self, message: &str) -> bool {
        debug!("Confirmation '{}' answered {}", message, self.assume_yes);
        self.assume_yes
    }
}

/// Opens the durable store named by the configuration under `root`.
pub fn open_store(root: &Path) -> Result<(CmsConfig, FlatFileStore), CliError> {
    let config = CmsConfig::load_and_validate(root)
        .map_err(|err| CliError::runtime(format!("Configuration error: {}", err)))?;
    let store = FlatFileStore::open(root.join(&config.storage.dir))?;
    Ok((config, store))
}

pub async fn execute(root: &Path, command: CliCommand) -> Result<i32, CliError> {
    let (config, store) = open_store(root)?;
    match command {
        CliCommand::Images(command) => images(config, store, command).await,
        CliCommand::Backups(BackupCommand::List) => {
            let keys = app::list_backups(&store)?;
            if keys.is_empty() {
                println!("No backups.");
            }
            for key in keys {
                println!("{}", key);
            }
            Ok(0)
        }
        CliCommand::Backups(BackupCommand::Show { key }) => {
            let snapshot = app::load_backup(&store, &key)?;
            print_snapshot(&snapshot)?;
            Ok(0)
        }
    }
}

fn print_snapshot(snapshot: &ContentSnapshot) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|err| CliError::runtime(format!("Failed to format content: {}", err)))?;
    println!("{}", json);
    Ok(())
}

async fn images(
    config: CmsConfig,
    store: FlatFileStore,
    command: ImageCommand,
) -> Result<i32, CliError> {
    let assume_yes = matches!(command, ImageCommand::Delete { confirmed: true, .. });
    if let ImageCommand::Delete { id, confirmed: false } = &command {
        return Err(CliError::usage(format!(
            "Deleting '{}' cannot be undone; pass --yes to confirm",
            id
        )));
    }

    let mut app = CmsApp::builder(Document::new())
        .config(config)
        .stores(Stores::new(Rc::new(MemoryStore::new()), Rc::new(store)))
        .affordances(Rc::new(ConsoleAffordances::new(assume_yes)))
        .build();
    app.initialize();

    match command {
        ImageCommand::List => {
            list_images(&app);
            Ok(0)
        }
        ImageCommand::Export { file } => {
            let (default_name, json) = app.export_images()?;
            let path = file.unwrap_or_else(|| PathBuf::from(default_name));
            tokio::fs::write(&path, json).await.map_err(|err| {
                CliError::runtime(format!("Failed to write {}: {}", path.display(), err))
            })?;
            println!(
                "Exported {} images to {}",
                app.images().catalog().len(),
                path.display()
            );
            Ok(0)
        }
        ImageCommand::Import { file } => {
            app.import_images_file(&file).await?;
            Ok(0)
        }
        ImageCommand::Add { files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(sniff(path).await?);
            }
            let results = app.upload_files(uploads).await;
            let failed = results.iter().filter(|result| result.is_err()).count();
            if failed == 0 { Ok(0) } else { Ok(1) }
        }
        ImageCommand::Delete { id, .. } => {
            app.delete_image(&id)?;
            Ok(0)
        }
    }
}

fn list_images(app: &CmsApp) {
    let catalog = app.images().catalog();
    if catalog.is_empty() {
        println!("No images stored.");
        return;
    }
    let mut images: Vec<_> = catalog.iter().collect();
    images.sort_by(|a, b| a.upload_date.cmp(&b.upload_date).then_with(|| a.id.cmp(&b.id)));
    for image in images {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            image.id,
            image.name,
            format_file_size(image.size),
            image.mime_type,
            image.upload_date.format("%Y-%m-%d %H:%M")
        );
    }
    println!(
        "{} images, {} total",
        catalog.len(),
        format_file_size(catalog.total_bytes())
    );
}

/// Describes a file on disk the way a browser picker would, taking the type
/// from its leading bytes and falling back to the extension.
async fn sniff(path: &Path) -> Result<UploadFile, CliError> {
    let io_error = |err: std::io::Error| {
        CliError::runtime(format!("Failed to read {}: {}", path.display(), err))
    };
    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let size = file.metadata().await.map_err(io_error)?.len();
    let mut head = vec![0u8; SNIFF_BYTES];
    let mut filled = 0;
    while filled < head.len() {
        let read = file.read(&mut head[filled..]).await.map_err(io_error)?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    head.truncate(filled);
    let mime_type = detect_mime_type(path, &head);
    Ok(UploadFile::from_path(path, &mime_type, size))
}
