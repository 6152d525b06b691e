// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Maintenance commands that work directly on the durable store directory.

pub mod backups;
pub mod exec;
pub mod images;
pub(crate) mod parse_utils;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    Usage,
    Runtime,
}

#[derive(Debug, Clone)]
pub struct CliError {
    kind: CliErrorKind,
    message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Usage,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Runtime,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> CliErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            CliErrorKind::Usage => 2,
            CliErrorKind::Runtime => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<crate::error::CmsError> for CliError {
    fn from(err: crate::error::CmsError) -> Self {
        CliError::runtime(err.to_string())
    }
}

impl From<crate::storage::StorageError> for CliError {
    fn from(err: crate::storage::StorageError) -> Self {
        CliError::runtime(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Images(ImageCommand),
    Backups(BackupCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCommand {
    List,
    /// `None` writes to the dated default file name in the working directory.
    Export { file: Option<PathBuf> },
    Import { file: PathBuf },
    Add { files: Vec<PathBuf> },
    Delete { id: String, confirmed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupCommand {
    List,
    Show { key: String },
}

/// Shared lookup rules for domains and commands: case-insensitive, exact
/// names and aliases first, then unambiguous prefixes.
trait Named {
    fn name(&self) -> &'static str;
    fn aliases(&self) -> &'static [&'static str];

    fn matches_exact(&self, token: &str) -> bool {
        self.name().eq_ignore_ascii_case(token)
            || self
                .aliases()
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(token))
    }

    fn matches_prefix(&self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        std::iter::once(self.name())
            .chain(self.aliases().iter().copied())
            .any(|name| name.to_ascii_lowercase().starts_with(&token))
    }
}

pub struct DomainSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub commands: Vec<CommandSpec>,
}

impl Named for DomainSpec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

impl DomainSpec {
    fn validate_commands(&self) -> Result<(), CliError> {
        let mut seen = BTreeSet::new();
        for command in &self.commands {
            for label in std::iter::once(command.name).chain(command.aliases.iter().copied()) {
                if !seen.insert(label.to_ascii_lowercase()) {
                    return Err(CliError::usage(format!(
                        "Duplicate command name or alias '{}' in domain '{}'",
                        label, self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static [&'static str],
    pub parser: fn(&[String]) -> Result<CliCommand, CliError>,
}

impl Named for CommandSpec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

#[derive(Default)]
pub struct CliRegistry {
    domains: Vec<DomainSpec>,
    names: BTreeSet<String>,
}

impl CliRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_domain(&mut self, domain: DomainSpec) -> Result<(), CliError> {
        for label in std::iter::once(domain.name).chain(domain.aliases.iter().copied()) {
            if !self.names.insert(label.to_ascii_lowercase()) {
                return Err(CliError::usage(format!(
                    "Duplicate domain name or alias '{}'",
                    label
                )));
            }
        }
        domain.validate_commands()?;
        self.domains.push(domain);
        Ok(())
    }

    pub fn domains(&self) -> &[DomainSpec] {
        &self.domains
    }

    pub fn resolve_command(&self, tokens: &[String]) -> Result<CliCommand, CliError> {
        let Some(domain_token) = tokens.first() else {
            return Err(CliError::usage("Missing command domain"));
        };
        let domain = resolve(domain_token, &self.domains, "domain")?;
        let Some(command_token) = tokens.get(1) else {
            return Err(CliError::usage(format!(
                "Missing command for domain '{}'",
                domain.name
            )));
        };
        let command = resolve(command_token, &domain.commands, "command")?;
        (command.parser)(&tokens[2..])
    }
}

pub fn build_registry() -> Result<CliRegistry, CliError> {
    let mut registry = CliRegistry::new();
    registry.register_domain(images::domain())?;
    registry.register_domain(backups::domain())?;
    Ok(registry)
}

pub fn help_text() -> String {
    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(err) => return format!("Failed to build CLI registry: {}", err),
    };

    let mut out = String::new();
    push_line(&mut out, "Usage:");
    push_line(&mut out, "  campaign-cms [options] <domain> <command> [args]");
    push_line(&mut out, "  campaign-cms help");
    push_line(&mut out, "");
    push_line(&mut out, "Options:");
    push_line(&mut out, "  -C <root>   Set the site root (default: .).");
    push_line(&mut out, "  -h, --help  Show this help.");
    push_line(&mut out, "");
    push_line(&mut out, "Domains and commands:");
    for domain in registry.domains() {
        push_line(
            &mut out,
            &format!("  {}{}", domain.name, format_aliases(domain.aliases)),
        );
        for command in &domain.commands {
            push_line(
                &mut out,
                &format!("    {}{}", command.name, format_aliases(command.aliases)),
            );
            for usage in command.usage {
                push_line(&mut out, &format!("      {}", usage));
            }
        }
    }
    push_line(&mut out, "");
    push_line(&mut out, "Notes:");
    push_line(
        &mut out,
        "  Domains and commands are case-insensitive and accept unambiguous prefixes.",
    );
    push_line(
        &mut out,
        "  Data lives in the storage directory named by cms.yaml under the site root.",
    );
    out
}

pub async fn run_cli(root: &Path, tokens: Vec<String>) -> i32 {
    let command = match build_registry().and_then(|registry| registry.resolve_command(&tokens)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}", err);
            return err.exit_code();
        }
    };

    match exec::execute(root, command).await {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("{}", err);
            err.exit_code()
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn format_aliases(aliases: &[&str]) -> String {
    if aliases.is_empty() {
        String::new()
    } else {
        format!(" (aliases: {})", aliases.join(", "))
    }
}

fn resolve<'a, T: Named>(token: &str, items: &'a [T], kind: &str) -> Result<&'a T, CliError> {
    if let Some(item) = items.iter().find(|item| item.matches_exact(token)) {
        return Ok(item);
    }
    let matched: Vec<&T> = items.iter().filter(|item| item.matches_prefix(token)).collect();
    match matched.as_slice() {
        [item] => Ok(*item),
        [] => Err(CliError::usage(format!("Unknown {} '{}'", kind, token))),
        _ => {
            let mut names: Vec<&str> = matched.iter().map(|item| item.name()).collect();
            names.sort_unstable();
            Err(CliError::usage(format!(
                "Ambiguous {} prefix '{}': {}",
                kind,
                token,
                names.join(", ")
            )))
        }
    }
}
