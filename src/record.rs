// Generic record trait for any dashboard collection

use chrono::NaiveDate;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Core trait that every collection row must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Form payload that creates or edits a record (the record minus its id)
    type Payload: Clone;

    /// Unique identifier within the collection
    fn id(&self) -> u64;

    /// Key the whole collection is persisted under (e.g., "users-data")
    fn storage_key() -> &'static str;

    /// Singular noun used in prompts and messages
    fn noun() -> &'static str;

    /// Plural noun, defaults to `noun()` + "s"
    fn plural() -> String {
        format!("{}s", Self::noun())
    }

    /// Scalar value of a named field, `None` when the field is unknown or unset
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Fields consulted by free-text search
    fn searchable_fields() -> &'static [&'static str];

    /// Fields shown when rendering a table, in column order
    fn columns() -> &'static [&'static str];

    /// Field the table sorts on before the user picks one
    fn default_sort() -> &'static str;

    /// Build a new record from a submitted form
    fn from_payload(id: u64, payload: Self::Payload, today: NaiveDate) -> Self;

    /// Overwrite the form fields in place; the id never changes
    fn apply(&mut self, payload: Self::Payload, today: NaiveDate);

    /// Prefill an edit form from this record
    fn to_payload(&self) -> Self::Payload;

    /// Collection used when nothing has been stored yet
    fn seed() -> Vec<Self> {
        Vec::new()
    }

    /// File name stem for exports, defaults to the storage key
    fn export_stem() -> &'static str {
        Self::storage_key()
    }

    /// Reject a record whose JSON form could not be loaded back
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Largest magnitude below which every integral f64 is an exact integer
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Scalar field values the query engine can search, filter and sort on
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Native ordering for same-kind values; mixed kinds compare equal
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < EXACT_INTEGER_LIMIT => write!(f, "{}", *n as i64),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}
