//! Provider booking data
//!
//! Payment providers confirm payments with loosely structured key/value
//! payloads. `BookingData` keeps the raw pairs for bookkeeping and exposes
//! typed accessors for the fields the lifecycle logic needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transaction id key used by PayPal notifications
pub const KEY_PAYPAL_TRANSACTION_ID: &str = "txn_id";

/// Transaction id key used by the credit card and Sofort providers
pub const KEY_TRANSACTION_ID: &str = "transactionId";

/// Valuation date key used by the Sofort provider (RFC 3339)
pub const KEY_VALUATION_DATE: &str = "valuationDate";

/// Key/value payload of a provider booking confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingData(BTreeMap<String, String>);

impl BookingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key/value pair (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value for a key, if present and non-empty
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Returns the provider transaction id, whichever key carries it
    pub fn transaction_id(&self) -> Option<&str> {
        self.get(KEY_PAYPAL_TRANSACTION_ID)
            .or_else(|| self.get(KEY_TRANSACTION_ID))
    }

    /// Returns the parsed valuation date, if present and well-formed
    pub fn valuation_date(&self) -> Option<DateTime<Utc>> {
        self.get(KEY_VALUATION_DATE)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|date| date.with_timezone(&Utc))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the raw key/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for BookingData {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }
}
