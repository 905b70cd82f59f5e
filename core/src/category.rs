//! `/categories` resource: listing and lookup by name.

use serde_json::Value;

use crate::client::{find_id_by_name, ToshlClient};
use crate::error::Result;
use crate::pagination::PageQuery;
use crate::transport::{Transport, UreqTransport};

const PATH: &str = "/categories";

#[derive(Debug, Clone, Copy)]
pub struct Category<'a, T = UreqTransport> {
    client: &'a ToshlClient<T>,
}

impl<'a, T: Transport> Category<'a, T> {
    pub fn new(client: &'a ToshlClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Value>> {
        self.client.list_all(&PageQuery::new(PATH))
    }

    /// Id of the first category named exactly `name`.
    pub fn search(&self, name: &str) -> Result<Option<String>> {
        Ok(find_id_by_name(&self.list()?, name))
    }
}
