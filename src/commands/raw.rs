//! REST and GraphQL passthrough
//!
//! `api` sends any method to any path; `graphql` posts a document to
//! `/graphql`. Results are raw JSON, so table and CSV columns are derived
//! from whatever record array the response holds.

use crate::api::TransportError;
use crate::cli::Invocation;
use crate::output::Tabular;
use crate::resource::builder::payload_args;
use crate::resource::options::read_source;
use crate::resource::payload::load_payload;
use anyhow::{bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use reqwest::Method;
use serde_json::{json, Value};
use std::path::PathBuf;

pub const API: &str = "api";
pub const GRAPHQL: &str = "graphql";

const GRAPHQL_PATH: &str = "/graphql";

pub fn api_command() -> Command {
    payload_args(
        Command::new(API)
            .about("Send a raw REST request, e.g. 'api GET /rest/people'")
            .arg(
                Arg::new("method")
                    .value_name("METHOD")
                    .help("HTTP method")
                    .required(true)
                    .value_parser(parse_method),
            )
            .arg(
                Arg::new("path")
                    .value_name("PATH")
                    .help("Path below the base URL, or a full URL")
                    .required(true),
            ),
    )
}

pub fn graphql_command() -> Command {
    Command::new(GRAPHQL)
        .about("Run a GraphQL query or mutation")
        .arg(
            Arg::new("document")
                .value_name("QUERY")
                .help("GraphQL document")
                .required_unless_present("file"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Read the document from a file ('-' for stdin)")
                .conflicts_with("document"),
        )
        .arg(
            Arg::new("variables")
                .long("variables")
                .value_name("JSON")
                .help("Variables as a JSON object"),
        )
}

pub async fn run_api(matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()> {
    let method = matches
        .get_one::<Method>("method")
        .cloned()
        .context("an HTTP method is required")?;
    let path = matches
        .get_one::<String>("path")
        .context("a path is required")?;

    let data = matches.get_one::<String>("data").map(String::as_str);
    let file = matches.get_one::<PathBuf>("file");
    let body = match (data, file) {
        (None, None) => None,
        _ => Some(Value::Object(load_payload(
            data,
            file.map(PathBuf::as_path),
            ctx.stdin,
        )?)),
    };

    let document = ctx
        .transport
        .do_raw(method.clone(), path, body.as_ref())
        .await
        .with_context(|| format!("{} {} failed", method, path))?;

    ctx.render(&document, Tabular::Derived)?;
    Ok(())
}

pub async fn run_graphql(matches: &ArgMatches, ctx: &mut Invocation<'_>) -> Result<()> {
    let document = match matches.get_one::<String>("file") {
        Some(path) => read_source(path, ctx.stdin)?,
        None => matches
            .get_one::<String>("document")
            .cloned()
            .unwrap_or_default(),
    };
    if document.trim().is_empty() {
        bail!("the GraphQL document is empty");
    }

    let mut body = json!({ "query": document });
    if let Some(raw) = matches.get_one::<String>("variables") {
        body["variables"] = parse_variables(raw)?;
    }

    let response = ctx
        .transport
        .do_raw(Method::POST, GRAPHQL_PATH, Some(&body))
        .await
        .context("GraphQL request failed")?;
    check_graphql_errors(&response).context("GraphQL request failed")?;

    ctx.render(&response, Tabular::Derived)?;
    Ok(())
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP method '{}'", raw))
}

fn parse_variables(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("invalid --variables")?;
    if !value.is_object() {
        bail!("--variables must be a JSON object");
    }
    Ok(value)
}

/// A non-empty `errors` array fails the call even on HTTP 200
pub fn check_graphql_errors(response: &Value) -> Result<(), TransportError> {
    let Some(errors) = response.get("errors").and_then(Value::as_array) else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }

    let messages = errors
        .iter()
        .map(|error| match error.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => error.to_string(),
        })
        .collect();
    Err(TransportError::GraphQl(messages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("PATCH").unwrap(), Method::PATCH);
        assert!(parse_method("NOT A METHOD").is_err());
    }

    #[test]
    fn test_graphql_errors() {
        assert!(check_graphql_errors(&json!({"data": {"tasks": []}})).is_ok());
        assert!(check_graphql_errors(&json!({"data": null, "errors": []})).is_ok());

        let err = check_graphql_errors(&json!({
            "errors": [{"message": "Field 'nope' not found"}, {"code": 7}]
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL request returned errors: Field 'nope' not found; {\"code\":7}"
        );
    }

    #[test]
    fn test_variables_must_be_object() {
        assert!(parse_variables(r#"{"id": "1"}"#).is_ok());
        assert!(parse_variables("[1]").is_err());
        assert!(parse_variables("{").is_err());
    }

    #[test]
    fn test_graphql_needs_document_or_file() {
        assert!(graphql_command()
            .try_get_matches_from(["graphql"])
            .is_err());
        assert!(graphql_command()
            .try_get_matches_from(["graphql", "-f", "query.graphql"])
            .is_ok());
    }
}
