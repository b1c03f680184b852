//! crmctl: a command-line client for a CRM's REST and GraphQL API
//!
//! Each CRM object gets `list`, `get`, `create`, `update` and `delete`
//! subcommands generated from a small per-object config (see [`resource`]).
//! Results render as aligned text, JSON, YAML or CSV (see [`output`]).

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod objects;
pub mod output;
pub mod resource;

/// Version reported in the user agent and `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
