//! HTTP request and response values exchanged with the Toshl API.
//!
//! # Design
//! Requests and responses are plain data. `ToshlClient` builds an
//! `HttpRequest`, a `Transport` executes it, and the resulting `HttpResponse`
//! is inspected by the client. Keeping both sides as owned values makes the
//! client testable without a network and lets tests assert on the exact
//! request that would have gone out.

use std::fmt;

use serde_json::Value;

use crate::error::ToshlError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute (base URL plus resource path). Query parameters are kept
/// separate and in insertion order so the transport can encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive lookup of a request header.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Parse the body as JSON. An empty body (204, 201 without content)
    /// yields `Value::Null`.
    pub fn json(&self) -> Result<Value, ToshlError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Every link carried by the response's `Link` headers, in order.
    pub fn links(&self) -> Vec<Link> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("link"))
            .flat_map(|(_, v)| parse_link_header(v))
            .collect()
    }

    /// Whether any `Link` entry carries the relation `rel`.
    pub fn has_link(&self, rel: &str) -> bool {
        self.links().iter().any(|link| link.has_rel(rel))
    }
}

/// One entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub rels: Vec<String>,
}

impl Link {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Parse a `Link` header value such as
/// `<https://api.toshl.com/entries?page=2>; rel="next", <...>; rel="last"`.
///
/// Entries without a `<url>` part are skipped.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    split_unquoted(value, ',')
        .into_iter()
        .filter_map(parse_link_entry)
        .collect()
}

/// Split on `sep` wherever it is outside `<...>` and outside a quoted string.
fn split_unquoted(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_angle = false;
    let mut in_quote = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quote => in_angle = true,
            '>' if !in_quote => in_angle = false,
            '"' if !in_angle => in_quote = !in_quote,
            c if c == sep && !in_angle && !in_quote => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn parse_link_entry(entry: &str) -> Option<Link> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let close = rest.find('>')?;
    let url = rest[..close].trim().to_string();

    let mut rels = Vec::new();
    for param in split_unquoted(&rest[close + 1..], ';') {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("rel") {
            continue;
        }
        let raw = raw.trim().trim_matches('"');
        rels.extend(raw.split_whitespace().map(|r| r.to_ascii_lowercase()));
    }

    Some(Link { url, rels })
}
