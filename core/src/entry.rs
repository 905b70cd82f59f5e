//! `/entries` resource (income and expense transactions).
//!
//! Listings always carry a `from`/`to` date range; the API refuses entry
//! listings without one.

use serde_json::{Map, Value};
use tracing::info;

use crate::client::{ensure_success, parse_location_header, resource_path, ToshlClient};
use crate::error::{Result, ToshlError};
use crate::http::HttpMethod;
use crate::pagination::PageQuery;
use crate::transport::{Transport, UreqTransport};
use crate::types::DateRange;

const PATH: &str = "/entries";

#[derive(Debug, Clone, Copy)]
pub struct Entry<'a, T = UreqTransport> {
    client: &'a ToshlClient<T>,
}

impl<'a, T: Transport> Entry<'a, T> {
    pub fn new(client: &'a ToshlClient<T>) -> Self {
        Self { client }
    }

    /// Every entry dated within `range`, across all pages.
    pub fn list(&self, range: DateRange) -> Result<Vec<Value>> {
        self.client
            .list_all(&PageQuery::new(PATH).with_date_range(range))
    }

    pub fn get(&self, id: &str) -> Result<Value> {
        self.client
            .make_request(&resource_path(PATH, &[id])?, HttpMethod::Get, None, None)?
            .json()
    }

    /// Create an entry; `Some(id)` when the API answers 201.
    pub fn create(&self, body: &Value) -> Result<Option<String>> {
        let response = self
            .client
            .make_request(PATH, HttpMethod::Post, None, Some(body))?;
        if response.status == 201 {
            return parse_location_header(&response).map(Some);
        }
        Ok(None)
    }

    /// Store `entry` as a whole under its own `id` and return the entry as
    /// the server stored it.
    pub fn put(&self, entry: &Value) -> Result<Value> {
        let id = entry_id(entry)?;
        let response = self.client.make_request(
            &resource_path(PATH, &[id.as_str()])?,
            HttpMethod::Put,
            None,
            Some(entry),
        )?;
        let stored = ensure_success(response)?.json()?;
        info!(entry_id = %id, "updated entry");
        Ok(stored)
    }

    /// Overlay `fields` onto entry `id`, store the result and return what
    /// the server stored.
    ///
    /// This is a read-modify-write: the entry is fetched, the top-level
    /// members in `fields` replace the fetched ones, and the merged entry is
    /// written back with [`Entry::put`]. Nothing locks the entry in between,
    /// so a change made by someone else after the fetch is overwritten
    /// unless the server rejects the stale write (the fetched `modified`
    /// stamp is sent back unchanged unless `fields` overrides it).
    pub fn update_entry(&self, id: &str, fields: &Map<String, Value>) -> Result<Value> {
        let mut members = match self.get(id)? {
            Value::Object(members) => members,
            other => return Err(ToshlError::UnexpectedBody(other)),
        };
        for (key, value) in fields {
            members.insert(key.clone(), value.clone());
        }
        members
            .entry("id")
            .or_insert_with(|| Value::String(id.to_string()));

        self.put(&Value::Object(members))
    }
}

fn entry_id(entry: &Value) -> Result<String> {
    match entry.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(ToshlError::MissingField("id")),
    }
}
