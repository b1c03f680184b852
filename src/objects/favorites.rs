//! Favorites
//!
//! Favorites are created and removed, never edited, so there is no update.

use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_member_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Favorite {
    fn target(&self) -> String {
        [
            ("person", &self.person_id),
            ("company", &self.company_id),
            ("task", &self.task_id),
        ]
        .iter()
        .find_map(|(kind, id)| id.as_deref().map(|id| format!("{}:{}", kind, id)))
        .unwrap_or_default()
    }

    fn position(&self) -> String {
        self.position.map(|p| p.to_string()).unwrap_or_default()
    }
}

impl Record for Favorite {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("POSITION", self.position()),
            ("TARGET", self.target()),
            ("OWNER", text(&self.workspace_member_id)),
            ("CREATED", short_timestamp(&self.created_at)),
        ]
    }
}

fn row(favorite: &Favorite) -> Vec<String> {
    vec![favorite.id.clone(), favorite.position(), favorite.target()]
}

pub fn commands() -> ResourceCommandSet<Favorite> {
    ResourceCommandConfig {
        about: "Manage favorites",
        list: Some(rest::list::<Favorite>),
        get: Some(rest::get::<Favorite>),
        create: Some(rest::create::<Favorite>),
        delete: Some(rest::delete),
        row: Some(row),
        ..ResourceCommandConfig::new("favorites", "favorite", &["ID", "POSITION", "TARGET"])
    }
    .build()
}
