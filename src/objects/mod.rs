//! CRM objects
//!
//! One module per resource: the typed record, its table mapping and the
//! [`ResourceCommandConfig`](crate::resource::ResourceCommandConfig) that
//! wires it to the generic commands.

pub mod attachments;
pub mod companies;
pub mod favorites;
pub mod people;
pub mod tasks;
pub mod webhooks;

use clap::{Arg, ArgMatches};
use serde_json::{json, Map, Value};

/// A typed list filter flag
pub(crate) fn filter_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).value_name("VALUE").help(help)
}

/// Conditions for every filter flag that was given.
///
/// `flags` pairs an argument id with the field it filters on. A dotted field
/// such as `emails.primaryEmail` nests: `{"emails": {"primaryEmail": {"eq": v}}}`.
pub(crate) fn eq_conditions(matches: &ArgMatches, flags: &[(&str, &str)]) -> Map<String, Value> {
    let mut conditions = Map::new();
    for (id, field) in flags {
        if let Some(value) = matches.get_one::<String>(id) {
            let (key, condition) = nest(field, json!({ "eq": value }));
            conditions.insert(key, condition);
        }
    }
    conditions
}

fn nest(field: &str, condition: Value) -> (String, Value) {
    match field.split_once('.') {
        Some((head, rest)) => {
            let (key, inner) = nest(rest, condition);
            (head.to_string(), json!({ key: inner }))
        }
        None => (field.to_string(), condition),
    }
}

/// Join a list field for a single table cell
pub(crate) fn joined(values: &Option<Vec<String>>) -> String {
    values.as_deref().map(|v| v.join(", ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    #[test]
    fn test_eq_conditions_only_for_given_flags() {
        let command = Command::new("list")
            .arg(filter_arg("email", ""))
            .arg(filter_arg("city", ""));
        let matches = command
            .try_get_matches_from(["list", "--email", "ada@example.com"])
            .unwrap();

        let conditions = eq_conditions(&matches, &[("email", "emails.primaryEmail"), ("city", "city")]);
        assert_eq!(
            Value::Object(conditions),
            json!({"emails": {"primaryEmail": {"eq": "ada@example.com"}}})
        );
    }

    #[test]
    fn test_joined() {
        assert_eq!(joined(&Some(vec!["a".into(), "b".into()])), "a, b");
        assert_eq!(joined(&None), "");
    }
}
