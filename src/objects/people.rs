//! People

use super::{eq_conditions, filter_arg, joined};
use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use clap::{ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl FullName {
    pub fn display(&self) -> String {
        format!("{} {}", text(&self.first_name), text(&self.last_name))
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_emails: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FullName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Emails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Person {
    fn display_name(&self) -> String {
        self.name.as_ref().map(FullName::display).unwrap_or_default()
    }

    fn primary_email(&self) -> String {
        self.emails
            .as_ref()
            .and_then(|e| e.primary_email.clone())
            .unwrap_or_default()
    }
}

impl Record for Person {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let additional = self
            .emails
            .as_ref()
            .map(|e| joined(&e.additional_emails))
            .unwrap_or_default();
        vec![
            ("ID", self.id.clone()),
            ("NAME", self.display_name()),
            ("EMAIL", self.primary_email()),
            ("OTHER EMAILS", additional),
            ("CITY", text(&self.city)),
            ("JOB TITLE", text(&self.job_title)),
            ("COMPANY", text(&self.company_id)),
            ("CREATED", short_timestamp(&self.created_at)),
        ]
    }
}

fn row(person: &Person) -> Vec<String> {
    vec![
        person.id.clone(),
        person.display_name(),
        person.primary_email(),
        text(&person.city),
        text(&person.job_title),
    ]
}

fn list_flags(command: Command) -> Command {
    command
        .arg(filter_arg("email", "Only people with this primary email"))
        .arg(filter_arg("city", "Only people in this city"))
}

fn filter(matches: &ArgMatches) -> Map<String, Value> {
    eq_conditions(matches, &[("email", "emails.primaryEmail"), ("city", "city")])
}

pub fn commands() -> ResourceCommandSet<Person> {
    ResourceCommandConfig {
        about: "Manage people",
        list: Some(rest::list::<Person>),
        get: Some(rest::get::<Person>),
        create: Some(rest::create::<Person>),
        update: Some(rest::update::<Person>),
        delete: Some(rest::delete),
        row: Some(row),
        list_flags: Some(list_flags),
        filter: Some(filter),
        ..ResourceCommandConfig::new("people", "person", &["ID", "NAME", "EMAIL", "CITY", "JOB TITLE"])
    }
    .build()
}
