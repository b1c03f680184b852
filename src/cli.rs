//! Command tree and dispatch
//!
//! Global flags live on the derived [`Cli`]; resource, passthrough and config
//! subcommands are attached at runtime so every resource can contribute its
//! own command group.

use crate::api::{ApiClient, Credentials, Transport};
use crate::commands::{config as config_cmd, raw};
use crate::config::Config;
use crate::output::query::Query;
use crate::output::{self, OutputFormat, RenderError, RenderRequest, Tabular};
use crate::resource::{registry, ResourceCommands};
use anyhow::{Context, Result};
use clap::{ArgMatches, Command, CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::Serialize;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::Path;
use tracing::Level;

/// Command-line client for the CRM API
#[derive(Parser, Debug)]
#[command(
    name = "crmctl",
    version,
    about,
    long_about = None,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// jq-style filter applied to JSON output, e.g. '.[] | .id'
    #[arg(short, long, global = true)]
    pub query: Option<String>,

    /// API key (overrides the config file)
    #[arg(long, global = true, env = "CRM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true, env = "CRM_BASE_URL")]
    pub base_url: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Everything one command run needs, passed down explicitly
pub struct Invocation<'a> {
    pub transport: &'a dyn Transport,
    pub format: OutputFormat,
    pub query: Option<String>,
    pub out: &'a mut dyn Write,
    pub stdin: &'a mut dyn Read,
}

impl Invocation<'_> {
    /// Render `value` in the selected format
    pub fn render<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
        tabular: Tabular,
    ) -> Result<(), RenderError> {
        let request =
            RenderRequest::new(value, self.format, tabular).with_query(self.query.as_deref());
        output::render(self.out, request)
    }
}

/// Full command tree: global flags plus every command group
pub fn build_cli(resources: &[Box<dyn ResourceCommands>]) -> Command {
    let mut command = Cli::command();
    for resource in resources {
        command = command.subcommand(resource.command());
    }
    command
        .subcommand(raw::api_command())
        .subcommand(raw::graphql_command())
        .subcommand(config_cmd::command())
}

/// Run the command selected in `matches`.
///
/// The config file at `config_path` supplies defaults the flags did not.
pub async fn execute(
    matches: &ArgMatches,
    resources: &[Box<dyn ResourceCommands>],
    config_path: &Path,
    out: &mut dyn Write,
    stdin: &mut dyn Read,
) -> Result<()> {
    let cli = Cli::from_arg_matches(matches)?;
    let mut config = Config::load_from(config_path);
    let (name, sub) = matches.subcommand().context("no command given")?;

    // --query only applies to JSON; reject a bad one before any request
    if cli.output == OutputFormat::Json {
        if let Some(expression) = cli.query.as_deref().filter(|q| !q.trim().is_empty()) {
            Query::parse(expression)?;
        }
    }

    if name == config_cmd::NAME {
        return config_cmd::run(sub, &cli, &mut config, config_path, out);
    }

    let credentials = Credentials::resolve(cli.api_key.as_deref(), config.api_key.as_deref());
    let client = ApiClient::new(&config.effective_base_url(cli.base_url.as_deref()), credentials)?;
    tracing::debug!("using {}", client.base_url());

    let mut ctx = Invocation {
        transport: &client,
        format: cli.output,
        query: cli.query.clone(),
        out,
        stdin,
    };

    match name {
        raw::API => raw::run_api(sub, &mut ctx).await,
        raw::GRAPHQL => raw::run_graphql(sub, &mut ctx).await,
        _ => {
            let resource = registry::get_resource(resources, name)
                .with_context(|| format!("unknown command '{}'", name))?;
            resource.run(sub, &mut ctx).await
        }
    }
}

/// Parse `args` and run, without exiting the process on parse errors
pub async fn run<I, S>(
    args: I,
    config_path: &Path,
    out: &mut dyn Write,
    stdin: &mut dyn Read,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let resources = registry::resource_commands();
    let matches = build_cli(&resources).try_get_matches_from(args)?;
    execute(&matches, &resources, config_path, out, stdin).await
}
