//! Request construction and failure normalization for the Toshl API.
//!
//! # Design
//! `ToshlClient` holds a `ClientConfig` and a `Transport` and carries no
//! mutable state between calls. `make_request` is split in two halves:
//! `build_request` produces an `HttpRequest` (bearer header always,
//! `Content-Type` only with a body) and `check_response` turns any status
//! >= 400 into a `ToshlError`. The transport in between is the only I/O.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::account::Account;
use crate::category::Category;
use crate::config::ClientConfig;
use crate::entry::Entry;
use crate::error::{Result, ToshlError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pagination::{paginate, PageQuery};
use crate::tag::Tag;
use crate::transport::{Transport, UreqTransport};

/// Synchronous client for the Toshl API.
#[derive(Debug, Clone)]
pub struct ToshlClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl ToshlClient<UreqTransport> {
    /// Client for the public API with a pre-obtained bearer token.
    pub fn new(token: &str) -> Self {
        Self::with_config(ClientConfig::new(token))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Client configured from `TOSHL_TOKEN` / `TOSHL_API_URL`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }
}

impl<T: Transport> ToshlClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn accounts(&self) -> Account<'_, T> {
        Account::new(self)
    }

    pub fn categories(&self) -> Category<'_, T> {
        Category::new(self)
    }

    pub fn entries(&self) -> Entry<'_, T> {
        Entry::new(self)
    }

    pub fn tags(&self) -> Tag<'_, T> {
        Tag::new(self)
    }

    /// Describe the request for `path` without sending it.
    pub fn build_request(
        &self,
        path: &str,
        method: HttpMethod,
        params: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let mut headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.token()),
        )];
        let body = match body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(value)?)
            }
            None => None,
        };
        let query = params
            .unwrap_or_default()
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.config.base_url(), path),
            query,
            headers,
            body,
        })
    }

    /// Send one request. A status >= 400 comes back as `Err`, never as data.
    pub fn make_request(
        &self,
        path: &str,
        method: HttpMethod,
        params: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let request = self.build_request(path, method, params, body)?;
        debug!(%method, path, query = ?request.query, "sending request");

        let response = self.transport.execute(&request)?;
        debug!(%method, path, status = response.status, "received response");

        check_response(response)
    }

    /// One page of the listing described by `query`.
    pub fn pagination_request(&self, query: &PageQuery, page: u32) -> Result<HttpResponse> {
        let params = query.params(page);
        self.make_request(query.path(), HttpMethod::Get, Some(params.as_slice()), None)
    }

    /// Every item of the listing described by `query`, across all pages.
    pub fn list_all(&self, query: &PageQuery) -> Result<Vec<Value>> {
        paginate(|page| self.pagination_request(query, page))
    }
}

/// Map a status >= 400 to `ToshlError`; pass anything else through.
pub fn check_response(response: HttpResponse) -> Result<HttpResponse> {
    if response.status >= 400 {
        return Err(ToshlError::from_error_response(response.status, &response.body));
    }
    Ok(response)
}

/// Require a 2xx status. Used where a 3xx must not count as success.
pub fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ToshlError::HttpStatus {
        status: response.status,
        body: response.body,
    })
}

/// `collection` followed by `segments`, each percent-encoded as a single
/// path segment, so an id containing `/` or `?` cannot reach another route.
pub fn resource_path(collection: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://localhost")?;
    url.set_path(collection);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    Ok(url.path().to_string())
}

/// Identifier of a created resource: the last path segment of `Location`.
pub fn parse_location_header(response: &HttpResponse) -> Result<String> {
    let location = response.location().ok_or(ToshlError::MissingLocation)?;
    let trimmed = location.trim_end_matches('/');
    let id = trimmed.rsplit('/').next().unwrap_or(trimmed);
    Ok(id.to_string())
}

/// Always hand back a sequence. The API drops the enclosing array when a
/// filtered listing matches exactly one item.
pub fn normalize_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// `id` of the first item whose `name` equals `name` exactly.
pub(crate) fn find_id_by_name(items: &[Value], name: &str) -> Option<String> {
    items
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|item| match item.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
}
