//! Tasks

use super::{eq_conditions, filter_arg};
use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use clap::{ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const STATUSES: [&str; 3] = ["TODO", "IN_PROGRESS", "DONE"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Task {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("TITLE", text(&self.title)),
            ("STATUS", text(&self.status)),
            ("DUE", short_timestamp(&self.due_at)),
            ("ASSIGNEE", text(&self.assignee_id)),
            ("CREATED", short_timestamp(&self.created_at)),
            ("UPDATED", short_timestamp(&self.updated_at)),
        ]
    }
}

fn row(task: &Task) -> Vec<String> {
    vec![
        task.id.clone(),
        text(&task.title),
        text(&task.status),
        short_timestamp(&task.due_at),
        text(&task.assignee_id),
    ]
}

fn csv_row(task: &Task) -> Vec<String> {
    vec![
        task.id.clone(),
        text(&task.title),
        text(&task.status),
        text(&task.due_at),
        text(&task.assignee_id),
        text(&task.created_at),
        text(&task.updated_at),
    ]
}

fn list_flags(command: Command) -> Command {
    command
        .arg(
            filter_arg("status", "Only tasks with this status")
                .value_parser(STATUSES)
                .ignore_case(true),
        )
        .arg(filter_arg("assignee", "Only tasks assigned to this workspace member ID"))
}

fn filter(matches: &ArgMatches) -> Map<String, Value> {
    let mut conditions = eq_conditions(matches, &[("assignee", "assigneeId")]);
    if let Some(status) = matches.get_one::<String>("status") {
        conditions.insert(
            "status".to_string(),
            serde_json::json!({ "eq": status.to_ascii_uppercase() }),
        );
    }
    conditions
}

pub fn commands() -> ResourceCommandSet<Task> {
    ResourceCommandConfig {
        about: "Manage tasks",
        list: Some(rest::list::<Task>),
        get: Some(rest::get::<Task>),
        create: Some(rest::create::<Task>),
        update: Some(rest::update::<Task>),
        delete: Some(rest::delete),
        row: Some(row),
        csv_headers: Some(&[
            "id",
            "title",
            "status",
            "dueAt",
            "assigneeId",
            "createdAt",
            "updatedAt",
        ]),
        csv_row: Some(csv_row),
        list_flags: Some(list_flags),
        filter: Some(filter),
        ..ResourceCommandConfig::new("tasks", "task", &["ID", "TITLE", "STATUS", "DUE", "ASSIGNEE"])
    }
    .build()
}
