//! `config show` and `config set`

use crate::cli::Cli;
use crate::config::{Config, ConfigKey};
use crate::output::{self, RenderRequest, Tabular};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::io::Write;
use std::path::Path;

pub const NAME: &str = "config";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Show or change saved settings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Show the effective settings"))
        .subcommand(
            Command::new("set")
                .about("Save a setting")
                .arg(
                    Arg::new("key")
                        .value_name("KEY")
                        .required(true)
                        .value_parser(value_parser!(ConfigKey)),
                )
                .arg(Arg::new("value").value_name("VALUE").required(true)),
        )
}

pub fn run(
    matches: &ArgMatches,
    cli: &Cli,
    config: &mut Config,
    path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            let effective =
                config.effective(cli.base_url.as_deref(), cli.api_key.as_deref(), path);
            let tabular = Tabular::fields(vec![
                ("base_url", effective.base_url.clone()),
                ("api_key", effective.api_key.clone().unwrap_or_else(|| "(not set)".into())),
                ("config_file", effective.config_file.clone()),
            ]);
            let request =
                RenderRequest::new(&effective, cli.output, tabular).with_query(cli.query.as_deref());
            output::render(out, request)?;
            Ok(())
        }
        Some(("set", sub)) => {
            let key = sub
                .get_one::<ConfigKey>("key")
                .copied()
                .context("a setting name is required")?;
            let value = sub
                .get_one::<String>("value")
                .context("a value is required")?;
            config.set(key, value, path)?;
            tracing::info!("saved {:?} to {}", key, path.display());
            writeln!(out, "Saved {} to {}", key_name(key), path.display())?;
            Ok(())
        }
        _ => anyhow::bail!("missing config command"),
    }
}

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::BaseUrl => "base-url",
        ConfigKey::ApiKey => "api-key",
    }
}
