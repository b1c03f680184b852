//! Webhooks

use super::joined;
use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// e.g. `person.created`, `*.*`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Record for Webhook {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("TARGET URL", text(&self.target_url)),
            ("OPERATIONS", joined(&self.operations)),
            ("DESCRIPTION", text(&self.description)),
            ("CREATED", short_timestamp(&self.created_at)),
        ]
    }
}

fn row(webhook: &Webhook) -> Vec<String> {
    vec![
        webhook.id.clone(),
        text(&webhook.target_url),
        joined(&webhook.operations),
        text(&webhook.description),
    ]
}

pub fn commands() -> ResourceCommandSet<Webhook> {
    ResourceCommandConfig {
        about: "Manage webhooks",
        list: Some(rest::list::<Webhook>),
        get: Some(rest::get::<Webhook>),
        create: Some(rest::create::<Webhook>),
        update: Some(rest::update::<Webhook>),
        delete: Some(rest::delete),
        row: Some(row),
        ..ResourceCommandConfig::new(
            "webhooks",
            "webhook",
            &["ID", "TARGET URL", "OPERATIONS", "DESCRIPTION"],
        )
    }
    .build()
}
