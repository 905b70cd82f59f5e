//! Synchronous client for the Toshl personal-finance API.
//!
//! # Overview
//! `ToshlClient` sends bearer-authenticated JSON requests to
//! `https://api.toshl.com` and turns every status >= 400 into a typed
//! `ToshlError`. Listings are fully materialized by `paginate`, which walks
//! page numbers until a response stops advertising a `next` link.
//! Resource clients (`Account`, `Category`, `Entry`, `Tag`) bind a path to
//! those two pieces.
//!
//! # Design
//! - `ClientConfig` (token, base URL) is immutable once the client exists.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   the `Transport` trait is the only I/O seam. `UreqTransport` is the
//!   blocking default.
//! - Resource bodies stay `serde_json::Value`; the API's business fields
//!   pass through unchanged.

pub mod account;
pub mod category;
pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod pagination;
pub mod tag;
pub mod transport;
pub mod types;

pub use account::Account;
pub use category::Category;
pub use client::{
    check_response, ensure_success, normalize_list, parse_location_header, resource_path, ToshlClient,
};
pub use config::ClientConfig;
pub use entry::Entry;
pub use error::{Result, ToshlError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Link};
pub use pagination::{paginate, PageQuery};
pub use tag::Tag;
pub use transport::{Transport, UreqTransport};
pub use types::{AccountMerge, AccountMove, AccountReorder, DateRange};
