//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only place I/O happens. `UreqTransport` is the blocking
//! implementation used in production; tests plug in a recording transport
//! and assert on the requests the client produced.

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Implementations must return 4xx/5xx responses as data; interpreting the
/// status is the client's job.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a pooled `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with ureq's defaults, except that status codes are never turned
    /// into `Err`.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent (proxy, timeouts). The agent should be
    /// built with `http_status_as_error(false)`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut response = match request.method {
            HttpMethod::Get => decorate(self.agent.get(&request.url), request).call(),
            HttpMethod::Delete => decorate(self.agent.delete(&request.url), request).call(),
            HttpMethod::Post => {
                let builder = decorate(self.agent.post(&request.url), request);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = decorate(self.agent.put(&request.url), request);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn decorate<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport for unit tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::Value;

    use super::*;

    /// Replays queued responses in order and records every request.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        requests: RefCell<Vec<HttpRequest>>,
        responses: RefCell<VecDeque<HttpResponse>>,
    }

    impl MockTransport {
        pub(crate) fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                responses: RefCell::new(responses.into()),
            }
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .expect("no response queued for request"))
        }
    }

    pub(crate) fn json_response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    /// A listing page; `next` adds a `Link` header with the next relation.
    pub(crate) fn page_response(body: Value, next: Option<u32>) -> HttpResponse {
        let mut response = json_response(200, body);
        if let Some(page) = next {
            response
                .headers
                .push(("link".to_string(), format!("</items?page={page}>; rel=\"next\"")));
        }
        response
    }

    pub(crate) fn empty_response(status: u16, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::new(),
        }
    }
}
