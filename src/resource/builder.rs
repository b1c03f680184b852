//! Resource command builder
//!
//! Turns a [`ResourceCommandConfig`] into the `list`, `get`, `create`,
//! `update` and `delete` subcommands of one resource.

use super::fetcher::paginate;
use super::options::{list_args, list_request};
use super::payload::load_payload;
use super::rest::{CreateFn, DeleteFn, GetFn, ListFn, UpdateFn};
use super::Record;
use crate::cli::Invocation;
use crate::output::Tabular;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;

/// A top-level command group the CLI can dispatch to
#[async_trait(?Send)]
pub trait ResourceCommands {
    /// Subcommand name, e.g. `tasks`
    fn name(&self) -> &'static str;

    fn command(&self) -> Command;

    /// Run the subcommand selected in `matches` (the group's own matches)
    async fn run(&self, matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()>;
}

/// Static description of one resource's commands.
///
/// `list`, `get` and `row` are mandatory; [`build`](Self::build) panics
/// without them. Missing `create`, `update` or `delete` functions simply
/// leave that subcommand out.
pub struct ResourceCommandConfig<T> {
    pub name: &'static str,
    pub singular: &'static str,
    /// REST collection, usually the same as `name`
    pub endpoint: &'static str,
    pub about: &'static str,
    pub list: Option<ListFn<T>>,
    pub get: Option<GetFn<T>>,
    pub create: Option<CreateFn<T>>,
    pub update: Option<UpdateFn<T>>,
    pub delete: Option<DeleteFn>,
    pub headers: &'static [&'static str],
    pub row: Option<fn(&T) -> Vec<String>>,
    /// CSV columns when they differ from the table's
    pub csv_headers: Option<&'static [&'static str]>,
    pub csv_row: Option<fn(&T) -> Vec<String>>,
    /// Registers resource-specific list flags
    pub list_flags: Option<fn(Command) -> Command>,
    /// Reads those flags back as filter conditions
    pub filter: Option<fn(&ArgMatches) -> Map<String, Value>>,
}

impl<T> ResourceCommandConfig<T> {
    pub fn new(name: &'static str, singular: &'static str, headers: &'static [&'static str]) -> Self {
        Self {
            name,
            singular,
            endpoint: name,
            about: "",
            list: None,
            get: None,
            create: None,
            update: None,
            delete: None,
            headers,
            row: None,
            csv_headers: None,
            csv_row: None,
            list_flags: None,
            filter: None,
        }
    }

    /// Validate the configuration.
    ///
    /// # Panics
    ///
    /// When the list function, get function or row mapping is missing, or
    /// when only one of `csv_headers` and `csv_row` is set. These surface
    /// while the command tree is built, not when a user runs the command.
    pub fn build(self) -> ResourceCommandSet<T> {
        let Some(list) = self.list else {
            panic!("resource '{}' is missing its list function", self.name);
        };
        let Some(get) = self.get else {
            panic!("resource '{}' is missing its get function", self.name);
        };
        let Some(row) = self.row else {
            panic!("resource '{}' is missing its row mapping", self.name);
        };
        let csv = match (self.csv_headers, self.csv_row) {
            (Some(headers), Some(csv_row)) => Some((headers, csv_row)),
            (None, None) => None,
            _ => panic!(
                "resource '{}' must set both csv_headers and csv_row, or neither",
                self.name
            ),
        };

        ResourceCommandSet {
            name: self.name,
            singular: self.singular,
            endpoint: self.endpoint,
            about: self.about,
            list,
            get,
            create: self.create,
            update: self.update,
            delete: self.delete,
            headers: self.headers,
            row,
            csv,
            list_flags: self.list_flags,
            filter: self.filter,
        }
    }
}

/// A validated [`ResourceCommandConfig`]
pub struct ResourceCommandSet<T> {
    name: &'static str,
    singular: &'static str,
    endpoint: &'static str,
    about: &'static str,
    list: ListFn<T>,
    get: GetFn<T>,
    create: Option<CreateFn<T>>,
    update: Option<UpdateFn<T>>,
    delete: Option<DeleteFn>,
    headers: &'static [&'static str],
    row: fn(&T) -> Vec<String>,
    /// CSV-specific headers and row mapping
    csv: Option<(&'static [&'static str], fn(&T) -> Vec<String>)>,
    list_flags: Option<fn(Command) -> Command>,
    filter: Option<fn(&ArgMatches) -> Map<String, Value>>,
}

impl<T> ResourceCommandSet<T>
where
    T: Serialize + DeserializeOwned + Record + Send + 'static,
{
    fn list_command(&self) -> Command {
        let command = list_args(
            Command::new("list").about(format!("List {}", self.name)),
        );
        match self.list_flags {
            Some(register) => register(command),
            None => command,
        }
    }

    fn get_command(&self) -> Command {
        Command::new("get")
            .about(format!("Show one {}", self.singular))
            .arg(id_arg())
    }

    fn create_command(&self) -> Command {
        payload_args(Command::new("create").about(format!("Create a {}", self.singular)))
    }

    fn update_command(&self) -> Command {
        payload_args(
            Command::new("update")
                .about(format!("Update a {}", self.singular))
                .arg(id_arg()),
        )
    }

    fn delete_command(&self) -> Command {
        Command::new("delete")
            .about(format!("Delete a {}", self.singular))
            .arg(id_arg())
            .arg(
                Arg::new("force")
                    .long("force")
                    .visible_alias("yes")
                    .help("Actually delete; without it nothing is sent")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Table or CSV cells for a page of records
    fn tabular(&self, ctx: &Invocation<'_>, records: &[T]) -> Tabular {
        let csv = ctx.format == crate::output::OutputFormat::Csv;
        match (csv, self.csv) {
            (true, Some((headers, row))) => Tabular::rows(headers, records, row),
            _ => Tabular::rows(self.headers, records, self.row),
        }
    }

    async fn run_list(&self, matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()> {
        let request = list_request(matches, ctx.stdin)?;
        let mut options = request.options;
        if let Some(filter) = self.filter {
            options.merge_filter(filter(matches));
        }

        let list = self.list;
        let transport = ctx.transport;
        let endpoint = self.endpoint;
        let records = paginate(options.cursor.clone(), request.fetch_all, |cursor| {
            let page = options.at_cursor(cursor);
            async move { list(transport, endpoint, &page).await }
        })
        .await
        .with_context(|| format!("failed to list {}", self.name))?;

        let tabular = self.tabular(ctx, &records);
        ctx.render(&records, tabular)?;
        Ok(())
    }

    async fn run_get(&self, matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()> {
        let id = record_id(matches)?;
        let record = (self.get)(ctx.transport, self.endpoint, id)
            .await
            .with_context(|| format!("failed to get {} {}", self.singular, id))?;

        ctx.render(&record, Tabular::fields(record.fields()))?;
        Ok(())
    }

    async fn run_create(
        &self,
        create: CreateFn<T>,
        matches: &ArgMatches,
        ctx: &mut Invocation<'_>,
    ) -> Result<()> {
        let input = read_payload(matches, ctx)?;
        let record = create(ctx.transport, self.endpoint, &input)
            .await
            .with_context(|| format!("failed to create {}", self.singular))?;

        ctx.render(&record, Tabular::fields(record.fields()))?;
        Ok(())
    }

    async fn run_update(
        &self,
        update: UpdateFn<T>,
        matches: &ArgMatches,
        ctx: &mut Invocation<'_>,
    ) -> Result<()> {
        let id = record_id(matches)?;
        let input = read_payload(matches, ctx)?;
        let record = update(ctx.transport, self.endpoint, id, &input)
            .await
            .with_context(|| format!("failed to update {} {}", self.singular, id))?;

        ctx.render(&record, Tabular::fields(record.fields()))?;
        Ok(())
    }

    async fn run_delete(
        &self,
        delete: DeleteFn,
        matches: &ArgMatches,
        ctx: &mut Invocation<'_>,
    ) -> Result<()> {
        let id = record_id(matches)?;

        if !matches.get_flag("force") {
            writeln!(
                ctx.out,
                "Would delete {} {}. Re-run with --force to confirm.",
                self.singular, id
            )?;
            return Ok(());
        }

        delete(ctx.transport, self.endpoint, id)
            .await
            .with_context(|| format!("failed to delete {} {}", self.singular, id))?;

        writeln!(ctx.out, "Deleted {} {}", self.singular, id)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl<T> ResourceCommands for ResourceCommandSet<T>
where
    T: Serialize + DeserializeOwned + Record + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.name)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(self.list_command())
            .subcommand(self.get_command());

        if !self.about.is_empty() {
            command = command.about(self.about);
        }
        if self.create.is_some() {
            command = command.subcommand(self.create_command());
        }
        if self.update.is_some() {
            command = command.subcommand(self.update_command());
        }
        if self.delete.is_some() {
            command = command.subcommand(self.delete_command());
        }
        command
    }

    async fn run(&self, matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()> {
        match (matches.subcommand(), self.create, self.update, self.delete) {
            (Some(("list", sub)), ..) => self.run_list(sub, ctx).await,
            (Some(("get", sub)), ..) => self.run_get(sub, ctx).await,
            (Some(("create", sub)), Some(create), _, _) => self.run_create(create, sub, ctx).await,
            (Some(("update", sub)), _, Some(update), _) => self.run_update(update, sub, ctx).await,
            (Some(("delete", sub)), _, _, Some(delete)) => self.run_delete(delete, sub, ctx).await,
            (Some((other, _)), ..) => anyhow::bail!("unknown {} command '{}'", self.name, other),
            (None, ..) => anyhow::bail!("missing {} command", self.name),
        }
    }
}

fn id_arg() -> Arg {
    Arg::new("id")
        .value_name("ID")
        .help("Record ID")
        .required(true)
}

/// `-d/--data` and `-f/--file`, shared with the raw `api` command
pub fn payload_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("JSON")
                .help("Inline JSON payload"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Read the payload from a file ('-' for stdin); wins over --data")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn read_payload(matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<Value> {
    let payload = load_payload(
        matches.get_one::<String>("data").map(String::as_str),
        matches.get_one::<PathBuf>("file").map(PathBuf::as_path),
        ctx.stdin,
    )?;
    Ok(Value::Object(payload))
}

fn record_id(matches: &ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("id")
        .map(String::as_str)
        .filter(|id| !id.trim().is_empty())
        .context("a record ID is required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Transport, TransportError};
    use crate::output::OutputFormat;
    use crate::resource::{rest, ListQueryOptions};
    use reqwest::Method;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Serialize, Deserialize)]
    struct Note {
        id: String,
        #[serde(default)]
        body: Option<String>,
    }

    impl Record for Note {
        fn fields(&self) -> Vec<(&'static str, String)> {
            vec![("ID", self.id.clone()), ("BODY", crate::resource::text(&self.body))]
        }
    }

    fn note_row(note: &Note) -> Vec<String> {
        vec![note.id.clone(), crate::resource::text(&note.body)]
    }

    fn note_csv_row(note: &Note) -> Vec<String> {
        vec![note.id.clone()]
    }

    fn notes() -> ResourceCommandSet<Note> {
        ResourceCommandConfig {
            list: Some(rest::list::<Note>),
            get: Some(rest::get::<Note>),
            create: Some(rest::create::<Note>),
            update: Some(rest::update::<Note>),
            delete: Some(rest::delete),
            row: Some(note_row),
            csv_headers: Some(&["id"]),
            csv_row: Some(note_csv_row),
            ..ResourceCommandConfig::new("notes", "note", &["ID", "BODY"])
        }
        .build()
    }

    /// Serves canned pages and records every call
    #[derive(Default)]
    struct FakeTransport {
        pages: Vec<Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn list(
            &self,
            endpoint: &str,
            options: &ListQueryOptions,
        ) -> Result<Value, TransportError> {
            let index = self.calls().len();
            self.record(format!(
                "list {} cursor={} filter={}",
                endpoint,
                options.cursor.clone().unwrap_or_default(),
                Value::Object(options.filter.clone())
            ));
            Ok(self.pages.get(index).cloned().unwrap_or(json!([])))
        }

        async fn get(&self, endpoint: &str, id: &str) -> Result<Value, TransportError> {
            self.record(format!("get {} {}", endpoint, id));
            Ok(json!({"data": {"id": id, "body": "hello"}}))
        }

        async fn create(&self, endpoint: &str, input: &Value) -> Result<Value, TransportError> {
            self.record(format!("create {} {}", endpoint, input));
            Ok(json!({"data": {"createNote": {"id": "new", "body": input["body"]}}}))
        }

        async fn update(
            &self,
            endpoint: &str,
            id: &str,
            input: &Value,
        ) -> Result<Value, TransportError> {
            self.record(format!("update {} {} {}", endpoint, id, input));
            Ok(json!({"id": id, "body": input["body"]}))
        }

        async fn delete(&self, endpoint: &str, id: &str) -> Result<(), TransportError> {
            self.record(format!("delete {} {}", endpoint, id));
            Ok(())
        }

        async fn do_raw(
            &self,
            _method: Method,
            _path: &str,
            _body: Option<&Value>,
        ) -> Result<Value, TransportError> {
            Err(TransportError::MissingCredentials)
        }
    }

    fn run(transport: &FakeTransport, format: OutputFormat, args: &[&str]) -> Result<String> {
        let set = notes();
        let matches = set
            .command()
            .try_get_matches_from(std::iter::once("notes").chain(args.iter().copied()))?;

        let mut out = Vec::new();
        let mut stdin = std::io::empty();
        let mut ctx = Invocation {
            transport,
            format,
            query: None,
            out: &mut out,
            stdin: &mut stdin,
        };
        tokio_test::block_on(set.run(&matches, &mut ctx))?;
        Ok(String::from_utf8(out)?)
    }

    fn two_pages() -> FakeTransport {
        FakeTransport {
            pages: vec![
                json!({"data": {"notes": [{"id": "1"}]}, "pageInfo": {"hasNextPage": true, "endCursor": "1"}}),
                json!({"data": {"notes": [{"id": "2"}]}, "pageInfo": {"hasNextPage": false}}),
            ],
            ..Default::default()
        }
    }

    #[test]
    #[should_panic(expected = "missing its list function")]
    fn test_build_without_list_panics() {
        let config = ResourceCommandConfig::<Note> {
            get: Some(rest::get::<Note>),
            row: Some(note_row),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        };
        config.build();
    }

    #[test]
    #[should_panic(expected = "missing its get function")]
    fn test_build_without_get_panics() {
        let config = ResourceCommandConfig::<Note> {
            list: Some(rest::list::<Note>),
            row: Some(note_row),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        };
        config.build();
    }

    #[test]
    #[should_panic(expected = "must set both csv_headers and csv_row")]
    fn test_build_with_csv_headers_only_panics() {
        let config = ResourceCommandConfig::<Note> {
            list: Some(rest::list::<Note>),
            get: Some(rest::get::<Note>),
            row: Some(note_row),
            csv_headers: Some(&["id"]),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        };
        config.build();
    }

    #[test]
    #[should_panic(expected = "must set both csv_headers and csv_row")]
    fn test_build_with_csv_row_only_panics() {
        let config = ResourceCommandConfig::<Note> {
            list: Some(rest::list::<Note>),
            get: Some(rest::get::<Note>),
            row: Some(note_row),
            csv_row: Some(note_csv_row),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        };
        config.build();
    }

    #[test]
    #[should_panic(expected = "missing its row mapping")]
    fn test_build_without_row_panics() {
        let config = ResourceCommandConfig::<Note> {
            list: Some(rest::list::<Note>),
            get: Some(rest::get::<Note>),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        };
        config.build();
    }

    #[test]
    fn test_optional_commands_are_omitted() {
        let set = ResourceCommandConfig::<Note> {
            list: Some(rest::list::<Note>),
            get: Some(rest::get::<Note>),
            row: Some(note_row),
            ..ResourceCommandConfig::new("notes", "note", &["ID"])
        }
        .build();
        let command = set.command();
        let names: Vec<&str> = command.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names, vec!["list", "get"]);
    }

    #[test]
    fn test_list_all_json() {
        let transport = two_pages();
        let text = run(&transport, OutputFormat::Json, &["list", "--all"]).unwrap();

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!([{"id": "1", "body": null}, {"id": "2", "body": null}]));
        assert_eq!(
            transport.calls(),
            vec!["list notes cursor= filter={}", "list notes cursor=1 filter={}"]
        );
    }

    #[test]
    fn test_list_single_page_by_default() {
        let transport = two_pages();
        let text = run(&transport, OutputFormat::Text, &["list"]).unwrap();
        assert_eq!(text, "ID  BODY\n1\n");
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_list_csv_uses_csv_mapping() {
        let transport = two_pages();
        let text = run(&transport, OutputFormat::Csv, &["list", "--all"]).unwrap();
        assert_eq!(text, "id\n1\n2\n");
    }

    #[test]
    fn test_get_renders_field_pairs() {
        let transport = FakeTransport::default();
        let text = run(&transport, OutputFormat::Text, &["get", "n1"]).unwrap();
        assert_eq!(text, "FIELD  VALUE\nID     n1\nBODY   hello\n");
        assert_eq!(transport.calls(), vec!["get notes n1"]);
    }

    #[test]
    fn test_create_sends_payload() {
        let transport = FakeTransport::default();
        let text = run(&transport, OutputFormat::Json, &["create", "-d", r#"{"body":"hi"}"#]).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"id": "new", "body": "hi"}));
        assert_eq!(transport.calls(), vec![r#"create notes {"body":"hi"}"#]);
    }

    #[test]
    fn test_create_without_payload_fails_before_calling() {
        let transport = FakeTransport::default();
        let err = run(&transport, OutputFormat::Text, &["create"]).unwrap_err();
        assert!(err.to_string().contains("no payload given"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_update_rejects_non_object() {
        let transport = FakeTransport::default();
        let err = run(&transport, OutputFormat::Text, &["update", "n1", "-d", "[1]"]).unwrap_err();
        assert!(err.to_string().contains("invalid payload"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_delete_without_force_is_a_dry_run() {
        let transport = FakeTransport::default();
        let text = run(&transport, OutputFormat::Text, &["delete", "n1"]).unwrap();
        assert!(text.starts_with("Would delete note n1"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_delete_with_force_or_yes() {
        for flag in ["--force", "--yes"] {
            let transport = FakeTransport::default();
            let text = run(&transport, OutputFormat::Text, &["delete", "n1", flag]).unwrap();
            assert_eq!(text, "Deleted note n1\n");
            assert_eq!(transport.calls(), vec!["delete notes n1"]);
        }
    }
}
