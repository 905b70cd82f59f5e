//! `/accounts` resource.
//!
//! # Design
//! Account bodies stay `serde_json::Value`; balances, currencies and goals
//! are server-side concepts this client forwards without interpreting. The
//! three bulk operations (`move_to`, `reorder`, `merge`) are one POST each
//! with a fixed payload shape from `types`.

use serde_json::Value;

use crate::client::{find_id_by_name, parse_location_header, resource_path, ToshlClient};
use crate::error::Result;
use crate::http::{HttpMethod, HttpResponse};
use crate::pagination::PageQuery;
use crate::transport::{Transport, UreqTransport};
use crate::types::{AccountMerge, AccountMove, AccountReorder};

const PATH: &str = "/accounts";

/// Account operations bound to a `ToshlClient`.
#[derive(Debug, Clone, Copy)]
pub struct Account<'a, T = UreqTransport> {
    client: &'a ToshlClient<T>,
}

impl<'a, T: Transport> Account<'a, T> {
    pub fn new(client: &'a ToshlClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'a ToshlClient<T> {
        self.client
    }

    /// Every account, across all pages.
    pub fn list(&self) -> Result<Vec<Value>> {
        self.client.list_all(&PageQuery::new(PATH))
    }

    /// Id of the first account named exactly `name`.
    pub fn search(&self, name: &str) -> Result<Option<String>> {
        Ok(find_id_by_name(&self.list()?, name))
    }

    pub fn get(&self, id: &str) -> Result<Value> {
        self.client
            .make_request(&resource_path(PATH, &[id])?, HttpMethod::Get, None, None)?
            .json()
    }

    /// Create an account. Returns the new id when the API answers 201,
    /// `None` for any other success status.
    pub fn create(&self, body: &Value) -> Result<Option<String>> {
        let response = self
            .client
            .make_request(PATH, HttpMethod::Post, None, Some(body))?;
        if response.status == 201 {
            return parse_location_header(&response).map(Some);
        }
        Ok(None)
    }

    /// Replace account `id` and return the stored representation.
    pub fn update(&self, id: &str, body: &Value) -> Result<Value> {
        self.client
            .make_request(&resource_path(PATH, &[id])?, HttpMethod::Put, None, Some(body))?
            .json()
    }

    pub fn delete(&self, id: &str) -> Result<HttpResponse> {
        self.client
            .make_request(&resource_path(PATH, &[id])?, HttpMethod::Delete, None, None)
    }

    /// Move account `id` to `position` in the user's ordering.
    pub fn move_to(&self, id: &str, position: u32) -> Result<HttpResponse> {
        let body = serde_json::to_value(AccountMove { position })?;
        self.client.make_request(
            &resource_path(PATH, &[id, "move"])?,
            HttpMethod::Post,
            None,
            Some(&body),
        )
    }

    /// Set the full account ordering; `order` lists account ids.
    pub fn reorder<S: AsRef<str>>(&self, order: &[S]) -> Result<HttpResponse> {
        let body = serde_json::to_value(AccountReorder {
            order: order.iter().map(|id| id.as_ref().to_string()).collect(),
        })?;
        self.client
            .make_request(&format!("{PATH}/reorder"), HttpMethod::Post, None, Some(&body))
    }

    /// Merge `accounts` into `account`.
    pub fn merge<S: AsRef<str>>(&self, accounts: &[S], account: &str) -> Result<HttpResponse> {
        let body = serde_json::to_value(AccountMerge {
            accounts: accounts.iter().map(|id| id.as_ref().to_string()).collect(),
            account: account.to_string(),
        })?;
        self.client
            .make_request(&format!("{PATH}/merge"), HttpMethod::Post, None, Some(&body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ToshlError;
    use crate::transport::mock::{empty_response, json_response, page_response, MockTransport};

    fn client(responses: Vec<HttpResponse>) -> ToshlClient<MockTransport> {
        ToshlClient::with_transport(ClientConfig::new("abcd1234"), MockTransport::new(responses))
    }

    fn sent_body(client: &ToshlClient<MockTransport>) -> Value {
        let requests = client.transport().requests();
        serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap()
    }

    fn account_42() -> Value {
        json!({
            "id": "42",
            "name": "Account Test",
            "balance": 3000,
            "initial_balance": 3000,
            "currency": {"code": "USD", "rate": 1, "fixed": false},
            "median": {"expenses": 55, "incomes": 1300},
            "status": "active",
            "order": 0,
            "modified": "2012-09-04T13:55:15Z",
            "goal": {"amount": 63570, "start": "2013-07-01", "end": "2015-07-01"}
        })
    }

    #[test]
    fn list_wraps_single_account() {
        let c = client(vec![json_response(200, account_42())]);
        let accounts = c.accounts().list().unwrap();

        assert_eq!(accounts, vec![account_42()]);
        let requests = c.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts");
        assert_eq!(requests[0].query, vec![("page".to_string(), "0".to_string())]);
    }

    #[test]
    fn list_follows_next_links() {
        let c = client(vec![
            page_response(json!([{"id": "1"}, {"id": "2"}]), Some(1)),
            page_response(json!([{"id": "3"}]), None),
        ]);
        let accounts = c.accounts().list().unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(c.transport().requests().len(), 2);
    }

    #[test]
    fn search_finds_account_among_many() {
        let c = client(vec![json_response(
            200,
            json!([
                {"id": "42", "name": "Account Test", "balance": 3000},
                {"id": "123", "name": "Test Found", "balance": 22000}
            ]),
        )]);
        assert_eq!(c.accounts().search("Test Found").unwrap().as_deref(), Some("123"));
    }

    #[test]
    fn search_finds_single_account() {
        let c = client(vec![json_response(
            200,
            json!({"id": "123", "name": "Test Found", "balance": 22000}),
        )]);
        assert_eq!(c.accounts().search("Test Found").unwrap().as_deref(), Some("123"));
    }

    #[test]
    fn search_without_match_is_none() {
        let c = client(vec![json_response(
            200,
            json!({"id": "123", "name": "Test Found", "balance": 22000}),
        )]);
        assert_eq!(c.accounts().search("Not Found").unwrap(), None);
    }

    #[test]
    fn get_returns_body_unchanged() {
        let c = client(vec![json_response(200, account_42())]);
        assert_eq!(c.accounts().get("42").unwrap(), account_42());

        let requests = c.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/42");
    }

    #[test]
    fn get_missing_account_is_typed_error() {
        let c = client(vec![json_response(
            404,
            json!({
                "error_id": "error.object.not_found",
                "description": "Object with id 111 not found."
            }),
        )]);
        let err = c.accounts().get("111").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error_id(), Some("error.object.not_found"));
    }

    #[test]
    fn create_returns_id_from_location() {
        let c = client(vec![empty_response(201, &[("Location", "/accounts/1")])]);
        let payload = json!({"name": "Test Account", "currency": {"code": "GBP"}});

        assert_eq!(c.accounts().create(&payload).unwrap().as_deref(), Some("1"));

        let requests = c.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(sent_body(&c), payload);
    }

    #[test]
    fn create_without_201_returns_none() {
        let c = client(vec![empty_response(200, &[])]);
        assert_eq!(c.accounts().create(&json!({"name": "x"})).unwrap(), None);
    }

    #[test]
    fn create_201_without_location_fails() {
        let c = client(vec![empty_response(201, &[])]);
        let err = c.accounts().create(&json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, ToshlError::MissingLocation));
    }

    #[test]
    fn update_puts_body_and_returns_response_json() {
        let payload = json!({
            "name": "Test Account",
            "currency": {"code": "GBP"},
            "extra": {"test": "foo"}
        });
        let c = client(vec![json_response(200, payload.clone())]);

        assert_eq!(c.accounts().update("1", &payload).unwrap(), payload);

        let requests = c.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/1");
        assert_eq!(sent_body(&c), payload);
    }

    #[test]
    fn delete_returns_raw_response() {
        let c = client(vec![empty_response(204, &[])]);
        let response = c.accounts().delete("1").unwrap();

        assert_eq!(response.status, 204);
        let requests = c.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/1");
        assert!(requests[0].header("content-type").is_none());
    }

    #[test]
    fn move_posts_position_once() {
        let c = client(vec![empty_response(204, &[])]);
        c.accounts().move_to("1", 2).unwrap();

        let requests = c.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/1/move");
        assert_eq!(sent_body(&c), json!({"position": 2}));
    }

    #[test]
    fn reorder_posts_order() {
        let c = client(vec![empty_response(204, &[])]);
        c.accounts().reorder(&["3", "1", "2"]).unwrap();

        let requests = c.transport().requests();
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/reorder");
        assert_eq!(sent_body(&c), json!({"order": ["3", "1", "2"]}));
    }

    #[test]
    fn merge_posts_sources_and_destination() {
        let c = client(vec![empty_response(204, &[])]);
        c.accounts().merge(&["1", "2"], "2").unwrap();

        let requests = c.transport().requests();
        assert_eq!(requests[0].url, "https://api.toshl.com/accounts/merge");
        assert_eq!(sent_body(&c), json!({"accounts": ["1", "2"], "account": "2"}));
    }
}
