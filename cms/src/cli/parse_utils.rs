// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::CliError;

pub(crate) fn parse_required_arg<'a>(
    args: &'a [String],
    label: &str,
) -> Result<(String, &'a [String]), CliError> {
    match args.split_first() {
        Some((first, rest)) => Ok((first.clone(), rest)),
        None => Err(CliError::usage(format!("Missing {}", label))),
    }
}

pub(crate) fn expect_no_args(args: &[String], command: &str) -> Result<(), CliError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CliError::usage(format!(
            "{} does not take any arguments",
            command
        )))
    }
}

pub(crate) fn expect_no_more_args(rest: &[String], command: &str) -> Result<(), CliError> {
    match rest.first() {
        None => Ok(()),
        Some(extra) => Err(CliError::usage(format!(
            "Unexpected argument for {}: {}",
            command, extra
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_arg_splits_off_the_first_token() {
        let args = vec!["a.png".to_string(), "b.png".to_string()];
        let (first, rest) = parse_required_arg(&args, "file").unwrap();
        assert_eq!(first, "a.png");
        assert_eq!(rest, &["b.png".to_string()]);
        let err = parse_required_arg(&[], "file").unwrap_err();
        assert_eq!(err.to_string(), "Missing file");
    }

    #[test]
    fn extra_args_are_usage_errors() {
        let err = expect_no_args(&["x".to_string()], "images list").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(expect_no_more_args(&[], "images import").is_ok());
    }
}
