// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use campaign_cms::cli;
use campaign_cms::config::CmsConfig;
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum RunMode {
    Help,
    Cli(Vec<String>),
}

#[derive(Debug)]
struct ParsedArgs {
    root: PathBuf,
    mode: RunMode,
}

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args_from(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the site root, or -h for help.");
            return 2;
        }
    };

    let RunMode::Cli(tokens) = parsed_args.mode else {
        print!("{}", cli::help_text());
        return 0;
    };

    if let Err(error) = init_logging(&parsed_args.root) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("❌ Failed to start runtime: {}", error);
            return 1;
        }
    };
    runtime.block_on(cli::run_cli(&parsed_args.root, tokens))
}

/// Level comes from `cms.yaml`; `RUST_LOG` directives override it. An
/// unreadable config falls back to `info` here and is reported by the command.
fn init_logging(root: &Path) -> Result<(), log::SetLoggerError> {
    let level = CmsConfig::load(root)
        .ok()
        .and_then(|config| config.log_level_filter().ok())
        .unwrap_or(LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut root = PathBuf::from(".");
    let mut cli_tokens = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            root = PathBuf::from(value);
        } else {
            cli_tokens.push(arg);
        }
    }

    let help_requested =
        cli_tokens.is_empty() || (cli_tokens.len() == 1 && cli_tokens[0].eq_ignore_ascii_case("help"));
    if help_requested {
        return Ok(ParsedArgs {
            root,
            mode: RunMode::Help,
        });
    }

    let root = make_root_absolute(root)?;
    Ok(ParsedArgs {
        root,
        mode: RunMode::Cli(cli_tokens),
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_root_absolute(root: PathBuf) -> Result<PathBuf, String> {
    if root.is_absolute() {
        return Ok(root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(root))
}

#[cfg(test)]
mod tests {
    use super::{RunMode, parse_args_from};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_without_command_shows_help() {
        let parsed = parse_args_from(Vec::new()).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }

    #[test]
    fn parse_args_accepts_root_before_command() {
        let parsed = parse_args_from(args(&["-C", "site", "images", "list"])).expect("parse args");
        assert!(parsed.root.is_absolute());
        assert!(parsed.root.ends_with("site"));
        match parsed.mode {
            RunMode::Cli(tokens) => assert_eq!(tokens, args(&["images", "list"])),
            RunMode::Help => panic!("expected cli mode"),
        }
    }

    #[test]
    fn parse_args_accepts_root_after_command() {
        let parsed = parse_args_from(args(&["backups", "list", "-C", "site"])).expect("parse args");
        assert!(parsed.root.ends_with("site"));
        assert!(matches!(parsed.mode, RunMode::Cli(_)));
    }

    #[test]
    fn parse_args_ignores_double_dash() {
        let parsed = parse_args_from(args(&["--", "backups", "list"])).expect("parse args");
        match parsed.mode {
            RunMode::Cli(tokens) => assert_eq!(tokens, args(&["backups", "list"])),
            RunMode::Help => panic!("expected cli mode"),
        }
    }

    #[test]
    fn parse_args_requires_value_for_root() {
        let error = parse_args_from(args(&["images", "list", "-C"])).unwrap_err();
        assert!(error.contains("-C"));
    }

    #[test]
    fn parse_args_accepts_help_command_and_flag() {
        let parsed = parse_args_from(args(&["-C", "site", "HELP"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
        let parsed = parse_args_from(args(&["--help", "images", "list"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }
}
