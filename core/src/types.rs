//! Request payloads and query values with a fixed shape.
//!
//! Resource bodies themselves stay `serde_json::Value`: the API's business
//! fields pass through untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive `from`/`to` date filter for entry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The `from`/`to` query parameters, formatted `YYYY-MM-DD`.
    pub fn params(&self) -> [(&'static str, String); 2] {
        [
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("to", self.to.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// Body of `POST /accounts/{id}/move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMove {
    pub position: u32,
}

/// Body of `POST /accounts/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReorder {
    pub order: Vec<String>,
}

/// Body of `POST /accounts/merge`: `accounts` are merged into `account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMerge {
    pub accounts: Vec<String>,
    pub account: String,
}
