/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;

mod config;
mod logger;

mod cmd_listen;
mod cmd_post;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("wbemcli")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("YAML config file with client and listener sections")
                .num_args(1)
                .value_name("CONFIG FILE")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_post::command())
        .subcommand(cmd_listen::command())
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    logger::SyncLogger::new(verbose_level)
        .into_global_logger()
        .map_err(|e| anyhow!("failed to set logger: {e}"))?;

    let config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => config::CliConfig::load(path)
            .context(format!("failed to load config file {}", path.display()))?,
        None => config::CliConfig::default(),
    };

    match args.subcommand() {
        Some((cmd_post::COMMAND, args)) => cmd_post::run(config.client, args),
        Some((cmd_listen::COMMAND, args)) => cmd_listen::run(config.listener, args),
        Some((cmd, _)) => Err(anyhow!("invalid subcommand {cmd}")),
        None => Err(anyhow!("no subcommand found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_args() {
        build_cli_args().debug_assert();
    }
}
