//! Output rendering
//!
//! Every command hands its result to [`render`] together with the selected
//! [`OutputFormat`]. JSON output can be narrowed with a jq-style `--query`;
//! table and CSV output come from explicit rows, field/value pairs, or, for
//! raw API documents, columns derived from the record array in the response.
//!
//! # Module Structure
//!
//! - [`extract`] - Locates record arrays inside response envelopes
//! - [`query`] - jq-style filter language
//! - [`table`] - Aligned text and CSV writers

pub mod extract;
pub mod query;
pub mod table;

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;

pub use query::QueryError;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns for humans
    #[default]
    Text,
    Json,
    Yaml,
    Csv,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Where table and CSV cells come from
#[derive(Debug, Clone, PartialEq)]
pub enum Tabular {
    /// One row per record, already mapped to cells
    Rows {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// A single record shown as one FIELD/VALUE row per field
    Fields(Vec<(String, String)>),
    /// No static mapping: extract records from the JSON document itself
    Derived,
}

impl Tabular {
    /// Rows from `headers` and a row mapper
    pub fn rows<T>(headers: &[&str], records: &[T], row: impl Fn(&T) -> Vec<String>) -> Self {
        Tabular::Rows {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: records.iter().map(row).collect(),
        }
    }

    pub fn fields(pairs: Vec<(&str, String)>) -> Self {
        Tabular::Fields(
            pairs
                .into_iter()
                .map(|(field, value)| (field.to_string(), value))
                .collect(),
        )
    }
}

/// One render call: the value, how to format it, and an optional query
pub struct RenderRequest<'a, T: Serialize + ?Sized> {
    pub value: &'a T,
    pub format: OutputFormat,
    pub query: Option<&'a str>,
    pub tabular: Tabular,
}

impl<'a, T: Serialize + ?Sized> RenderRequest<'a, T> {
    pub fn new(value: &'a T, format: OutputFormat, tabular: Tabular) -> Self {
        Self {
            value,
            format,
            query: None,
            tabular,
        }
    }

    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query.filter(|q| !q.trim().is_empty());
        self
    }
}

/// Render `request` to `out`.
///
/// Nothing is written when the query fails: results are fully evaluated
/// before the first byte goes out.
pub fn render<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    request: RenderRequest<'_, T>,
) -> Result<(), RenderError> {
    match request.format {
        OutputFormat::Json => match request.query {
            Some(expression) => render_query(out, request.value, expression),
            None => {
                writeln!(out, "{}", serde_json::to_string_pretty(request.value)?)?;
                Ok(())
            }
        },
        OutputFormat::Yaml => {
            let tree = serde_json::to_value(request.value)?;
            write!(out, "{}", serde_yaml::to_string(&tree)?)?;
            Ok(())
        }
        OutputFormat::Csv => {
            let (headers, rows) = match tabulate(request.value, request.tabular)? {
                Some(grid) => grid,
                None => return write_pretty(out, request.value),
            };
            if !headers.is_empty() {
                table::write_csv(out, &headers, &rows)?;
            }
            Ok(())
        }
        OutputFormat::Text => {
            let (headers, rows) = match tabulate(request.value, request.tabular)? {
                Some(grid) => grid,
                None => return write_pretty(out, request.value),
            };
            if !headers.is_empty() {
                table::write_table(out, &headers, &rows)?;
            }
            Ok(())
        }
    }
}

fn render_query<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    value: &T,
    expression: &str,
) -> Result<(), RenderError> {
    let input = serde_json::to_value(value)?;
    let results: Vec<Value> = query::Query::parse(expression)?
        .results(input)
        .collect::<Result<_, _>>()?;

    let mut buffer = String::new();
    for result in &results {
        buffer.push_str(&serde_json::to_string(result)?);
        buffer.push('\n');
    }
    out.write_all(buffer.as_bytes())?;
    Ok(())
}

fn write_pretty<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), RenderError> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

type Grid = (Vec<String>, Vec<Vec<String>>);

/// Resolve the header row and cells for table/CSV output.
/// `None` means the value has no tabular shape.
fn tabulate<T: Serialize + ?Sized>(value: &T, tabular: Tabular) -> Result<Option<Grid>, RenderError> {
    match tabular {
        Tabular::Rows { headers, rows } => Ok(Some((headers, rows))),
        Tabular::Fields(pairs) => Ok(Some(field_grid(pairs))),
        Tabular::Derived => {
            let document = serde_json::to_value(value)?;

            if let Some(items) = extract::locate_array(&document, None) {
                let records = extract::extract_records(&document);
                if !records.is_empty() {
                    let headers = extract::derive_headers(&records);
                    let rows = records
                        .iter()
                        .map(|record| extract::record_cells(record, &headers))
                        .collect();
                    return Ok(Some((headers, rows)));
                }
                if items.is_empty() {
                    return Ok(Some((Vec::new(), Vec::new())));
                }
            }

            match extract::single_record(&document) {
                Some(record) => {
                    let mut pairs: Vec<(String, String)> = record
                        .iter()
                        .map(|(key, value)| (key.clone(), extract::cell_text(value)))
                        .collect();
                    pairs.sort();
                    Ok(Some(field_grid(pairs)))
                }
                None => Ok(None),
            }
        }
    }
}

fn field_grid(pairs: Vec<(String, String)>) -> Grid {
    let headers = vec!["FIELD".to_string(), "VALUE".to_string()];
    let rows = pairs
        .into_iter()
        .map(|(field, value)| vec![field, value])
        .collect();
    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Person {
        id: String,
        name: String,
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                id: "1".into(),
                name: "Ada".into(),
            },
            Person {
                id: "2".into(),
                name: "Grace, Hopper".into(),
            },
        ]
    }

    fn render_to_string<T: Serialize + ?Sized>(request: RenderRequest<'_, T>) -> Result<String, RenderError> {
        let mut out = Vec::new();
        render(&mut out, request)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn person_rows(records: &[Person]) -> Tabular {
        Tabular::rows(&["ID", "NAME"], records, |p| vec![p.id.clone(), p.name.clone()])
    }

    #[test]
    fn test_json_is_pretty_and_keeps_field_order() {
        let records = people();
        let text = render_to_string(RenderRequest::new(
            &records,
            OutputFormat::Json,
            person_rows(&records),
        ))
        .unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"1\",\n    \"name\": \"Ada\""));
    }

    #[test]
    fn test_json_keeps_document_key_order() {
        let value: Value = serde_json::from_str(r#"{"zeta":1,"alpha":2}"#).unwrap();
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Json, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}\n");
    }

    #[test]
    fn test_json_query_prints_one_result_per_line() {
        let records = people();
        let text = render_to_string(
            RenderRequest::new(&records, OutputFormat::Json, Tabular::Derived)
                .with_query(Some(".[].id")),
        )
        .unwrap();
        assert_eq!(text, "\"1\"\n\"2\"\n");
    }

    #[test]
    fn test_failed_query_writes_nothing() {
        let records = people();
        let mut out = Vec::new();
        let result = render(
            &mut out,
            RenderRequest::new(&records, OutputFormat::Json, Tabular::Derived)
                .with_query(Some(".[] | .id.nope")),
        );
        assert!(matches!(result, Err(RenderError::Query(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let value = json!({"id": "1"});
        let text = render_to_string(
            RenderRequest::new(&value, OutputFormat::Json, Tabular::Derived).with_query(Some("  ")),
        )
        .unwrap();
        assert_eq!(text, "{\n  \"id\": \"1\"\n}\n");
    }

    #[test]
    fn test_query_ignored_for_other_formats() {
        let value = json!([{"id": "1"}]);
        let text = render_to_string(
            RenderRequest::new(&value, OutputFormat::Csv, Tabular::Derived)
                .with_query(Some(".bogus(")),
        )
        .unwrap();
        assert_eq!(text, "id\n1\n");
    }

    #[test]
    fn test_yaml_two_space_indent() {
        let value = json!({"data": {"tasks": [{"id": "1"}]}});
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Yaml, Tabular::Derived))
            .unwrap();
        assert!(text.starts_with("data:\n  tasks:\n"), "{}", text);
        let parsed: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_csv_from_rows() {
        let records = people();
        let text = render_to_string(RenderRequest::new(
            &records,
            OutputFormat::Csv,
            person_rows(&records),
        ))
        .unwrap();
        assert_eq!(text, "ID,NAME\n1,Ada\n2,\"Grace, Hopper\"\n");
    }

    #[test]
    fn test_text_from_rows() {
        let records = people();
        let text = render_to_string(RenderRequest::new(
            &records,
            OutputFormat::Text,
            person_rows(&records),
        ))
        .unwrap();
        assert_eq!(text, "ID  NAME\n1   Ada\n2   Grace, Hopper\n");
    }

    #[test]
    fn test_single_record_as_field_value_pairs() {
        let value = json!({"id": "1"});
        let tabular = Tabular::fields(vec![("id", "1".into()), ("name", "Ada".into())]);
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Text, tabular.clone()))
            .unwrap();
        assert_eq!(text, "FIELD  VALUE\nid     1\nname   Ada\n");

        let csv = render_to_string(RenderRequest::new(&value, OutputFormat::Csv, tabular)).unwrap();
        assert_eq!(csv, "FIELD,VALUE\nid,1\nname,Ada\n");
    }

    #[test]
    fn test_derived_headers_sorted() {
        let value = json!({"data": {"people": [
            {"name": "Ada", "id": "1"},
            {"id": "2", "city": "Paris"}
        ]}});
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Csv, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "city,id,name\n,1,Ada\nParis,2,\n");
    }

    #[test]
    fn test_derived_single_object_shows_fields() {
        let value = json!({"name": "Ada", "id": "1"});
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Text, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "FIELD  VALUE\nid     1\nname   Ada\n");
    }

    #[test]
    fn test_derived_empty_envelope_prints_nothing() {
        let value = json!({"data": {"people": []}});
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Csv, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_derived_created_record_shows_fields() {
        let value = json!({"data": {"createTask": {"title": "Call", "id": "t1"}}});
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Csv, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "FIELD,VALUE\nid,t1\ntitle,Call\n");
    }

    #[test]
    fn test_derived_scalar_falls_back_to_json() {
        let value = json!(42);
        let text = render_to_string(RenderRequest::new(&value, OutputFormat::Text, Tabular::Derived))
            .unwrap();
        assert_eq!(text, "42\n");
    }
}
