//! Generic REST call functions
//!
//! Each function fits the matching function type of
//! [`ResourceCommandConfig`](super::ResourceCommandConfig), so a resource
//! only has to name its record type: `list: Some(rest::list::<Task>)`.
//! Responses are decoded without any per-resource knowledge.

use super::{ListQueryOptions, ListResult, PageInfo};
use crate::api::{Transport, TransportError};
use crate::output::extract;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub type ListFn<T> = for<'a> fn(
    &'a dyn Transport,
    &'a str,
    &'a ListQueryOptions,
) -> BoxFuture<'a, Result<ListResult<T>, TransportError>>;

pub type GetFn<T> =
    for<'a> fn(&'a dyn Transport, &'a str, &'a str) -> BoxFuture<'a, Result<T, TransportError>>;

pub type CreateFn<T> =
    for<'a> fn(&'a dyn Transport, &'a str, &'a Value) -> BoxFuture<'a, Result<T, TransportError>>;

pub type UpdateFn<T> = for<'a> fn(
    &'a dyn Transport,
    &'a str,
    &'a str,
    &'a Value,
) -> BoxFuture<'a, Result<T, TransportError>>;

pub type DeleteFn =
    for<'a> fn(&'a dyn Transport, &'a str, &'a str) -> BoxFuture<'a, Result<(), TransportError>>;

pub fn list<'a, T>(
    transport: &'a dyn Transport,
    endpoint: &'a str,
    options: &'a ListQueryOptions,
) -> BoxFuture<'a, Result<ListResult<T>, TransportError>>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let document = transport.list(endpoint, options).await?;
        decode_list(&document, endpoint)
    })
}

pub fn get<'a, T>(
    transport: &'a dyn Transport,
    endpoint: &'a str,
    id: &'a str,
) -> BoxFuture<'a, Result<T, TransportError>>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let document = transport.get(endpoint, id).await?;
        decode_record(&document)
    })
}

pub fn create<'a, T>(
    transport: &'a dyn Transport,
    endpoint: &'a str,
    input: &'a Value,
) -> BoxFuture<'a, Result<T, TransportError>>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let document = transport.create(endpoint, input).await?;
        decode_record(&document)
    })
}

pub fn update<'a, T>(
    transport: &'a dyn Transport,
    endpoint: &'a str,
    id: &'a str,
    input: &'a Value,
) -> BoxFuture<'a, Result<T, TransportError>>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let document = transport.update(endpoint, id, input).await?;
        decode_record(&document)
    })
}

pub fn delete<'a>(
    transport: &'a dyn Transport,
    endpoint: &'a str,
    id: &'a str,
) -> BoxFuture<'a, Result<(), TransportError>> {
    transport.delete(endpoint, id)
}

/// Decode one page of a list response.
///
/// Records come from the extractor, preferring an array named after the
/// endpoint. `pageInfo` and `totalCount` are read from the top level or
/// from inside `data`; a missing count defaults to the number of records.
pub fn decode_list<T: DeserializeOwned>(
    document: &Value,
    endpoint: &str,
) -> Result<ListResult<T>, TransportError> {
    let data = extract::extract_records_for(document, Some(endpoint))
        .into_iter()
        .map(|record| serde_json::from_value(Value::Object(record)))
        .collect::<Result<Vec<T>, _>>()?;

    let page_info = envelope_field(document, "pageInfo")
        .filter(|value| value.is_object())
        .map(|value| serde_json::from_value::<PageInfo>(value.clone()))
        .transpose()?;

    let total_count = envelope_field(document, "totalCount")
        .and_then(Value::as_u64)
        .unwrap_or(data.len() as u64);

    Ok(ListResult {
        data,
        total_count,
        page_info,
    })
}

/// Decode a get/create/update response into a single record
pub fn decode_record<T: DeserializeOwned>(document: &Value) -> Result<T, TransportError> {
    let record = match extract::single_record(document) {
        Some(map) => Value::Object(map.clone()),
        None => document.clone(),
    };
    Ok(serde_json::from_value(record)?)
}

fn envelope_field<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    document
        .get(key)
        .or_else(|| document.get("data").and_then(|data| data.get(key)))
}
