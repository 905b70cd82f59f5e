//! Page-number pagination over listing endpoints.
//!
//! # Design
//! Listing endpoints take a zero-based `page` query parameter and signal more
//! data with a `Link: <...>; rel="next"` header. `paginate` owns the loop;
//! what to request for a given page is supplied by the caller as a closure,
//! usually one that captures a `PageQuery`.

use serde_json::Value;
use tracing::trace;

use crate::client::normalize_list;
use crate::error::{Result, ToshlError};
use crate::http::HttpResponse;
use crate::types::DateRange;

/// Link relation that announces another page.
pub const NEXT_REL: &str = "next";

/// Fetch every page produced by `request_fn`, in order, and concatenate
/// their items.
///
/// Pages are requested one at a time starting at 0. The loop ends at the
/// first response without a `next` link. An error from `request_fn` ends it
/// too, and the items gathered so far are dropped.
pub fn paginate<F>(mut request_fn: F) -> Result<Vec<Value>>
where
    F: FnMut(u32) -> Result<HttpResponse>,
{
    let mut page = 0;
    let mut items = Vec::new();

    loop {
        let response = request_fn(page)?;
        let page_items = normalize_list(response.json()?);
        trace!(page, count = page_items.len(), "fetched page");
        items.extend(page_items);

        if !response.has_link(NEXT_REL) {
            break;
        }
        page = next_page(page)?;
    }

    Ok(items)
}

/// Page number after `page`. A server that keeps sending `next` past
/// `u32::MAX` ends the walk with an error instead of wrapping.
fn next_page(page: u32) -> Result<u32> {
    page.checked_add(1).ok_or(ToshlError::PageOverflow(page))
}

/// What a listing request asks for, minus the page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    path: String,
    date_range: Option<DateRange>,
}

impl PageQuery {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            date_range: None,
        }
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Query parameters for `page`: the date range first when present.
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(range) = &self.date_range {
            params.extend(range.params());
        }
        params.push(("page", page.to_string()));
        params
    }
}
