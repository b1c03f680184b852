//! Attachments

use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Attachment {
    /// The record this file hangs off, as `kind:id`
    fn target(&self) -> String {
        [
            ("task", &self.task_id),
            ("person", &self.person_id),
            ("company", &self.company_id),
        ]
        .iter()
        .find_map(|(kind, id)| id.as_deref().map(|id| format!("{}:{}", kind, id)))
        .unwrap_or_default()
    }
}

impl Record for Attachment {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("NAME", text(&self.name)),
            ("CATEGORY", text(&self.file_category)),
            ("PATH", text(&self.full_path)),
            ("ATTACHED TO", self.target()),
            ("CREATED", short_timestamp(&self.created_at)),
        ]
    }
}

fn row(attachment: &Attachment) -> Vec<String> {
    vec![
        attachment.id.clone(),
        text(&attachment.name),
        text(&attachment.file_category),
        attachment.target(),
        short_timestamp(&attachment.created_at),
    ]
}

pub fn commands() -> ResourceCommandSet<Attachment> {
    ResourceCommandConfig {
        about: "Manage file attachments",
        list: Some(rest::list::<Attachment>),
        get: Some(rest::get::<Attachment>),
        create: Some(rest::create::<Attachment>),
        update: Some(rest::update::<Attachment>),
        delete: Some(rest::delete),
        row: Some(row),
        ..ResourceCommandConfig::new(
            "attachments",
            "attachment",
            &["ID", "NAME", "CATEGORY", "ATTACHED TO", "CREATED"],
        )
    }
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_prefers_first_link() {
        let attachment = Attachment {
            id: "a1".into(),
            person_id: Some("p1".into()),
            company_id: Some("c1".into()),
            ..Default::default()
        };
        assert_eq!(attachment.target(), "person:p1");
        assert_eq!(Attachment::default().target(), "");
    }
}
