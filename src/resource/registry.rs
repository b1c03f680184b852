//! Resource Registry
//!
//! Every resource command group the CLI exposes, in help order.

use super::ResourceCommands;
use crate::objects::{attachments, companies, favorites, people, tasks, webhooks};

/// Build all resource command sets.
///
/// Panics if a resource config is incomplete; see
/// [`ResourceCommandConfig::build`](super::ResourceCommandConfig::build).
pub fn resource_commands() -> Vec<Box<dyn ResourceCommands>> {
    vec![
        Box::new(tasks::commands()),
        Box::new(people::commands()),
        Box::new(companies::commands()),
        Box::new(webhooks::commands()),
        Box::new(attachments::commands()),
        Box::new(favorites::commands()),
    ]
}

/// Find a resource by its command name
pub fn get_resource<'a>(
    resources: &'a [Box<dyn ResourceCommands>],
    name: &str,
) -> Option<&'a dyn ResourceCommands> {
    resources
        .iter()
        .find(|resource| resource.name() == name)
        .map(|resource| &**resource)
}
