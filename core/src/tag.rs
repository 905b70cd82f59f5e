//! `/tags` resource.

use serde_json::Value;

use crate::client::{find_id_by_name, ToshlClient};
use crate::error::Result;
use crate::pagination::PageQuery;
use crate::transport::{Transport, UreqTransport};

const PATH: &str = "/tags";

#[derive(Debug, Clone, Copy)]
pub struct Tag<'a, T = UreqTransport> {
    client: &'a ToshlClient<T>,
}

impl<'a, T: Transport> Tag<'a, T> {
    pub fn new(client: &'a ToshlClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Value>> {
        self.client.list_all(&PageQuery::new(PATH))
    }

    pub fn search(&self, name: &str) -> Result<Option<String>> {
        Ok(find_id_by_name(&self.list()?, name))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpResponse;
    use crate::transport::mock::{json_response, MockTransport};

    fn client(responses: Vec<HttpResponse>) -> ToshlClient<MockTransport> {
        ToshlClient::with_transport(ClientConfig::new("abcd1234"), MockTransport::new(responses))
    }

    #[test]
    fn single_tag_comes_back_as_list() {
        let c = client(vec![json_response(200, json!({"id": "5", "name": "groceries"}))]);
        assert_eq!(
            c.tags().list().unwrap(),
            vec![json!({"id": "5", "name": "groceries"})]
        );
    }

    #[test]
    fn search_by_name() {
        let c = client(vec![json_response(
            200,
            json!([{"id": "5", "name": "groceries"}, {"id": "6", "name": "holiday"}]),
        )]);
        assert_eq!(c.tags().search("holiday").unwrap().as_deref(), Some("6"));
    }
}
