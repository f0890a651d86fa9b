// Attribute filtering for generic records

use crate::record::Record;
use eyre::{Result, eyre};
use std::str::FromStr;

/// Equality filter on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Value the field must equal, or `All`
    pub value: FilterValue,
}

/// Allowed value for a filter; `All` is the "all" sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    All,
    Only(String),
}

impl Filter {
    pub fn new(field: impl Into<String>, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    pub fn only(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterValue::Only(value.into()))
    }

    /// Parse a `field=value` expression
    pub fn parse(expr: &str) -> Result<Self> {
        let (field, value) = expr
            .split_once('=')
            .ok_or_else(|| eyre!("Invalid filter: {} (expected field=value)", expr))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(eyre!("Invalid filter: {} (field name is empty)", expr));
        }
        Ok(Self::new(field, value.trim().parse()?))
    }

    /// Whether a record passes this filter
    ///
    /// A record without the field only passes an `All` filter.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        match &self.value {
            FilterValue::All => true,
            FilterValue::Only(expected) => record
                .field(&self.field)
                .is_some_and(|actual| actual.to_string() == *expected),
        }
    }
}

impl FromStr for FilterValue {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            Ok(FilterValue::All)
        } else {
            Ok(FilterValue::Only(s.to_string()))
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::All => write!(f, "all"),
            FilterValue::Only(v) => write!(f, "{}", v),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_users;

    #[test]
    fn test_filter_parse() {
        let filter = Filter::parse("status=Active").unwrap();
        assert_eq!(filter.field, "status");
        assert_eq!(filter.value, FilterValue::Only("Active".to_string()));

        let filter = Filter::parse("role = all").unwrap();
        assert_eq!(filter.field, "role");
        assert_eq!(filter.value, FilterValue::All);

        assert!(Filter::parse("status").is_err());
        assert!(Filter::parse("=Active").is_err());
    }

    #[test]
    fn test_filter_matches() {
        let users = seed_users();
        let active = Filter::only("status", "Active");
        let admins = Filter::only("role", "Admin");

        assert_eq!(users.iter().filter(|u| active.matches(*u)).count(), 3);
        assert_eq!(users.iter().filter(|u| admins.matches(*u)).count(), 2);
        assert!(users.iter().all(|u| Filter::new("status", FilterValue::All).matches(u)));
    }

    #[test]
    fn test_filter_unknown_field() {
        let users = seed_users();
        assert!(!Filter::only("nope", "x").matches(&users[0]));
        assert!(Filter::new("nope", FilterValue::All).matches(&users[0]));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::only("status", "Pending").to_string(), "status=Pending");
        assert_eq!(Filter::new("role", FilterValue::All).to_string(), "role=all");
    }
}
