//! List query options
//!
//! Built fresh from the command line on each list invocation and handed to
//! the transport unchanged.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, ValueEnum};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

/// Records per page when `--limit` is not given
pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters of one list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListQueryOptions {
    pub limit: u32,
    /// `None` requests the first page
    pub cursor: Option<String>,
    /// Field name to condition, e.g. `{"status": {"eq": "TODO"}}`
    pub filter: Map<String, Value>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub fields: Vec<String>,
    pub include: Vec<String>,
    /// Extra `key=value` parameters, sent verbatim
    pub params: Vec<(String, String)>,
}

impl Default for ListQueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: None,
            filter: Map::new(),
            sort: None,
            order: None,
            fields: Vec::new(),
            include: Vec::new(),
            params: Vec::new(),
        }
    }
}

impl ListQueryOptions {
    /// Same options, positioned at `cursor`
    pub fn at_cursor(&self, cursor: Option<String>) -> Self {
        Self {
            cursor,
            ..self.clone()
        }
    }

    /// Merge typed filter conditions over the user-supplied filter.
    /// Keys from `conditions` replace existing keys.
    pub fn merge_filter(&mut self, conditions: Map<String, Value>) {
        self.filter.extend(conditions);
    }

    /// Encode as URL query parameters
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("limit".to_string(), self.limit.to_string())];

        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("starting_after".to_string(), cursor.to_string()));
        }
        if !self.filter.is_empty() {
            pairs.push((
                "filter".to_string(),
                Value::Object(self.filter.clone()).to_string(),
            ));
        }
        if let Some(sort) = &self.sort {
            let order = self.order.unwrap_or(SortOrder::Asc);
            pairs.push(("order_by".to_string(), format!("{}[{}]", sort, order.as_str())));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), self.fields.join(",")));
        }
        if !self.include.is_empty() {
            pairs.push(("include".to_string(), self.include.join(",")));
        }
        pairs.extend(self.params.iter().cloned());

        pairs
    }
}

/// Everything a list invocation asked for
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub options: ListQueryOptions,
    pub fetch_all: bool,
}

/// Register the shared list flags on `command`
pub fn list_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .help("Records per page")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("20"),
        )
        .arg(
            Arg::new("cursor")
                .long("cursor")
                .value_name("CURSOR")
                .help("Start after this cursor"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Follow cursors until every page is fetched")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("JSON")
                .help("Filter as a JSON object, e.g. '{\"status\":{\"eq\":\"TODO\"}}'"),
        )
        .arg(
            Arg::new("filter-file")
                .long("filter-file")
                .value_name("PATH")
                .help("Read the filter from a file ('-' for stdin)"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .value_name("FIELD")
                .help("Field to sort by"),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_name("ORDER")
                .help("Sort direction")
                .value_parser(value_parser!(SortOrder)),
        )
        .arg(
            Arg::new("fields")
                .long("fields")
                .value_name("FIELDS")
                .help("Comma-separated fields to return")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .value_name("RELATIONS")
                .help("Comma-separated relations to include")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("param")
                .long("param")
                .value_name("KEY=VALUE")
                .help("Extra query parameter (repeatable)")
                .action(ArgAction::Append)
                .value_parser(parse_param),
        )
}

/// Build the request from parsed list flags. `stdin` backs `--filter-file -`.
pub fn list_request(matches: &ArgMatches, stdin: &mut dyn Read) -> Result<ListRequest> {
    let filter = match (
        matches.get_one::<String>("filter-file"),
        matches.get_one::<String>("filter"),
    ) {
        (Some(path), _) => {
            let text = read_source(path, stdin)?;
            parse_filter(&text).with_context(|| format!("invalid filter in {}", path))?
        }
        (None, Some(inline)) => parse_filter(inline).context("invalid --filter")?,
        (None, None) => Map::new(),
    };

    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|values| values.filter(|v| !v.is_empty()).cloned().collect())
            .unwrap_or_default()
    };

    let options = ListQueryOptions {
        limit: matches
            .get_one::<u32>("limit")
            .copied()
            .unwrap_or(DEFAULT_LIMIT),
        cursor: matches.get_one::<String>("cursor").cloned(),
        filter,
        sort: matches.get_one::<String>("sort").cloned(),
        order: matches.get_one::<SortOrder>("order").copied(),
        fields: strings("fields"),
        include: strings("include"),
        params: matches
            .get_many::<(String, String)>("param")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    };

    Ok(ListRequest {
        options,
        fetch_all: matches.get_flag("all"),
    })
}

/// Parse a filter blob; it must be a JSON object
pub fn parse_filter(text: &str) -> Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => bail!("filter must be a JSON object, got {}", json_kind(&other)),
    }
}

/// Read a file path, or stdin for `-`
pub fn read_source(path: &str, stdin: &mut dyn Read) -> Result<String> {
    let mut text = String::new();
    if path == "-" {
        stdin
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
    } else {
        text = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read {}", path))?;
    }
    Ok(text)
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err("parameter name must not be empty".to_string());
    }
    Ok((key.trim().to_string(), value.to_string()))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
