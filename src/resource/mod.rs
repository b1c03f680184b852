//! Resource abstraction layer
//!
//! Every CRM object (tasks, people, companies, ...) gets the same five
//! subcommands. The per-object modules in [`crate::objects`] only supply a
//! [`ResourceCommandConfig`]; everything else is shared.
//!
//! # Architecture
//!
//! - [`options`] - List flags and the query options sent to the API
//! - [`fetcher`] - Cursor pagination with an optional fetch-all mode
//! - [`payload`] - JSON input for create/update
//! - [`rest`] - Generic REST call functions and response decoding
//! - [`builder`] - Builds list/get/create/update/delete commands from a config
//! - [`registry`] - All resource command sets known to the CLI
//!
//! # Example
//!
//! ```ignore
//! use crmctl::resource::{rest, ResourceCommandConfig};
//!
//! let config = ResourceCommandConfig {
//!     list: Some(rest::list::<Task>),
//!     get: Some(rest::get::<Task>),
//!     row: Some(task_row),
//!     ..ResourceCommandConfig::new("tasks", "task", &["ID", "TITLE"])
//! };
//! let commands = config.build();
//! ```

pub mod builder;
pub mod fetcher;
pub mod options;
pub mod payload;
pub mod registry;
pub mod rest;

use serde::Deserialize;

pub use builder::{ResourceCommandConfig, ResourceCommandSet, ResourceCommands};
pub use fetcher::paginate;
pub use options::{ListQueryOptions, SortOrder};
pub use payload::PayloadError;

/// Cursor position reported with each page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    /// Only meaningful while `has_next_page` is true
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the next request, if there is a next page.
    /// An empty cursor counts as none.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref().filter(|c| !c.is_empty())
        } else {
            None
        }
    }
}

/// One page of a list call, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page_info: Option<PageInfo>,
}

/// Ordered `(header, value)` pairs describing a record.
///
/// Used to show a single record as FIELD/VALUE rows. Pairs follow the
/// struct's field declaration order.
pub trait Record {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Display helper for optional text fields
pub fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Shorten an RFC 3339 timestamp to `YYYY-MM-DD HH:MM` for tables.
/// Unparseable input is returned unchanged.
pub fn short_timestamp(value: &Option<String>) -> String {
    match value {
        Some(raw) => chrono::DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.clone()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cursor_requires_next_page() {
        let more = PageInfo {
            has_next_page: true,
            end_cursor: Some("abc".into()),
        };
        assert_eq!(more.next_cursor(), Some("abc"));

        let done = PageInfo {
            has_next_page: false,
            end_cursor: Some("stale".into()),
        };
        assert_eq!(done.next_cursor(), None);

        let blank = PageInfo {
            has_next_page: true,
            end_cursor: Some(String::new()),
        };
        assert_eq!(blank.next_cursor(), None);
    }

    #[test]
    fn test_page_info_deserializes_camel_case() {
        let info: PageInfo =
            serde_json::from_str(r#"{"hasNextPage": true, "endCursor": "c1", "startCursor": "c0"}"#)
                .unwrap();
        assert!(info.has_next_page);
        assert_eq!(info.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_short_timestamp() {
        assert_eq!(
            short_timestamp(&Some("2024-03-05T14:07:09.123Z".into())),
            "2024-03-05 14:07"
        );
        assert_eq!(short_timestamp(&Some("soon".into())), "soon");
        assert_eq!(short_timestamp(&None), "");
    }
}
