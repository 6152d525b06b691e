// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::parse_utils::{expect_no_args, expect_no_more_args, parse_required_arg};
use super::{CliCommand, CliError, CommandSpec, DomainSpec, ImageCommand};
use std::path::PathBuf;

pub fn domain() -> DomainSpec {
    DomainSpec {
        name: "images",
        aliases: &["img"],
        commands: vec![
            CommandSpec {
                name: "list",
                aliases: &["ls"],
                usage: &["images list"],
                parser: parse_list,
            },
            CommandSpec {
                name: "export",
                aliases: &[],
                usage: &["images export [file]"],
                parser: parse_export,
            },
            CommandSpec {
                name: "import",
                aliases: &[],
                usage: &["images import <file>"],
                parser: parse_import,
            },
            CommandSpec {
                name: "add",
                aliases: &["upload"],
                usage: &["images add <file>..."],
                parser: parse_add,
            },
            CommandSpec {
                name: "delete",
                aliases: &["rm"],
                usage: &["images delete <id> --yes"],
                parser: parse_delete,
            },
        ],
    }
}

fn parse_list(args: &[String]) -> Result<CliCommand, CliError> {
    expect_no_args(args, "images list")?;
    Ok(CliCommand::Images(ImageCommand::List))
}

fn parse_export(args: &[String]) -> Result<CliCommand, CliError> {
    let file = match args.split_first() {
        None => None,
        Some((file, rest)) => {
            expect_no_more_args(rest, "images export")?;
            Some(PathBuf::from(file))
        }
    };
    Ok(CliCommand::Images(ImageCommand::Export { file }))
}

fn parse_import(args: &[String]) -> Result<CliCommand, CliError> {
    let (file, rest) = parse_required_arg(args, "import file")?;
    expect_no_more_args(rest, "images import")?;
    Ok(CliCommand::Images(ImageCommand::Import {
        file: PathBuf::from(file),
    }))
}

fn parse_add(args: &[String]) -> Result<CliCommand, CliError> {
    if args.is_empty() {
        return Err(CliError::usage("Missing image file"));
    }
    Ok(CliCommand::Images(ImageCommand::Add {
        files: args.iter().map(PathBuf::from).collect(),
    }))
}

fn parse_delete(args: &[String]) -> Result<CliCommand, CliError> {
    let (id, rest) = parse_required_arg(args, "image id")?;
    let mut confirmed = false;
    for flag in rest {
        match flag.as_str() {
            "--yes" | "-y" => confirmed = true,
            other => {
                return Err(CliError::usage(format!(
                    "Unknown flag for images delete: {}",
                    other
                )));
            }
        }
    }
    Ok(CliCommand::Images(ImageCommand::Delete { id, confirmed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn export_file_is_optional() {
        assert_eq!(
            parse_export(&[]).unwrap(),
            CliCommand::Images(ImageCommand::Export { file: None })
        );
        assert_eq!(
            parse_export(&args(&["out.json"])).unwrap(),
            CliCommand::Images(ImageCommand::Export {
                file: Some(PathBuf::from("out.json"))
            })
        );
        assert!(parse_export(&args(&["a", "b"])).is_err());
    }

    #[test]
    fn add_requires_at_least_one_file() {
        assert!(parse_add(&[]).is_err());
        let command = parse_add(&args(&["a.png", "b.jpg"])).unwrap();
        assert_eq!(
            command,
            CliCommand::Images(ImageCommand::Add {
                files: vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]
            })
        );
    }

    #[test]
    fn delete_parses_confirmation_flag() {
        assert_eq!(
            parse_delete(&args(&["img_1", "--yes"])).unwrap(),
            CliCommand::Images(ImageCommand::Delete {
                id: "img_1".to_string(),
                confirmed: true
            })
        );
        assert_eq!(
            parse_delete(&args(&["img_1"])).unwrap(),
            CliCommand::Images(ImageCommand::Delete {
                id: "img_1".to_string(),
                confirmed: false
            })
        );
        let err = parse_delete(&args(&["img_1", "--force"])).unwrap_err();
        assert_eq!(err.to_string(), "Unknown flag for images delete: --force");
    }
}
