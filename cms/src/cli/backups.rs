// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::parse_utils::{expect_no_args, expect_no_more_args, parse_required_arg};
use super::{BackupCommand, CliCommand, CliError, CommandSpec, DomainSpec};

pub fn domain() -> DomainSpec {
    DomainSpec {
        name: "backups",
        aliases: &["backup"],
        commands: vec![
            CommandSpec {
                name: "list",
                aliases: &["ls"],
                usage: &["backups list"],
                parser: parse_list,
            },
            CommandSpec {
                name: "show",
                aliases: &[],
                usage: &["backups show <key>"],
                parser: parse_show,
            },
        ],
    }
}

fn parse_list(args: &[String]) -> Result<CliCommand, CliError> {
    expect_no_args(args, "backups list")?;
    Ok(CliCommand::Backups(BackupCommand::List))
}

fn parse_show(args: &[String]) -> Result<CliCommand, CliError> {
    let (key, rest) = parse_required_arg(args, "backup key")?;
    expect_no_more_args(rest, "backups show")?;
    Ok(CliCommand::Backups(BackupCommand::Show { key }))
}
