//! Companies

use super::{eq_conditions, filter_arg};
use crate::resource::{rest, short_timestamp, text, Record, ResourceCommandConfig, ResourceCommandSet};
use clap::{ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_link_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Company {
    fn domain(&self) -> String {
        self.domain_name
            .as_ref()
            .and_then(|link| link.primary_link_url.clone())
            .unwrap_or_default()
    }

    fn city(&self) -> String {
        self.address
            .as_ref()
            .and_then(|a| a.address_city.clone())
            .unwrap_or_default()
    }

    fn employees(&self) -> String {
        self.employees.map(|n| n.to_string()).unwrap_or_default()
    }
}

impl Record for Company {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("NAME", text(&self.name)),
            ("DOMAIN", self.domain()),
            ("EMPLOYEES", self.employees()),
            ("CITY", self.city()),
            (
                "COUNTRY",
                self.address
                    .as_ref()
                    .map(|a| text(&a.address_country))
                    .unwrap_or_default(),
            ),
            ("CREATED", short_timestamp(&self.created_at)),
        ]
    }
}

fn row(company: &Company) -> Vec<String> {
    vec![
        company.id.clone(),
        text(&company.name),
        company.domain(),
        company.employees(),
        company.city(),
    ]
}

fn list_flags(command: Command) -> Command {
    command.arg(filter_arg("name", "Only companies with exactly this name"))
}

fn filter(matches: &ArgMatches) -> Map<String, Value> {
    eq_conditions(matches, &[("name", "name")])
}

pub fn commands() -> ResourceCommandSet<Company> {
    ResourceCommandConfig {
        about: "Manage companies",
        list: Some(rest::list::<Company>),
        get: Some(rest::get::<Company>),
        create: Some(rest::create::<Company>),
        update: Some(rest::update::<Company>),
        delete: Some(rest::delete),
        row: Some(row),
        list_flags: Some(list_flags),
        filter: Some(filter),
        ..ResourceCommandConfig::new(
            "companies",
            "company",
            &["ID", "NAME", "DOMAIN", "EMPLOYEES", "CITY"],
        )
    }
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_flattens_composites() {
        let company: Company = serde_json::from_value(json!({
            "id": "c1",
            "name": "Acme",
            "domainName": {"primaryLinkUrl": "https://acme.test", "secondaryLinks": []},
            "employees": 42,
            "address": {"addressCity": "Lyon", "addressCountry": "France"}
        }))
        .unwrap();
        assert_eq!(row(&company), vec!["c1", "Acme", "https://acme.test", "42", "Lyon"]);
    }
}
