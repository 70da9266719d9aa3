//! Shared type definitions: query enums, product status, session scopes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product listing status as stored by the backend (`0` offline, `1` online)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProductStatus {
    Offline,
    Online,
}

impl TryFrom<u8> for ProductStatus {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ProductStatus::Offline),
            1 => Ok(ProductStatus::Online),
            other => Err(format!("unknown product status {}", other)),
        }
    }
}

impl From<ProductStatus> for u8 {
    fn from(status: ProductStatus) -> Self {
        match status {
            ProductStatus::Offline => 0,
            ProductStatus::Online => 1,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Offline => write!(f, "offline"),
            ProductStatus::Online => write!(f, "online"),
        }
    }
}

/// Which side of the points ledger to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFilter {
    #[default]
    All,
    Earned,
    Spent,
}

impl RecordFilter {
    pub fn as_query(&self) -> &'static str {
        match self {
            RecordFilter::All => "all",
            RecordFilter::Earned => "earned",
            RecordFilter::Spent => "spent",
        }
    }
}

/// Look-back window for the points ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "3months")]
    Last3Months,
    #[serde(rename = "12months")]
    Last12Months,
    #[serde(rename = "2years")]
    Last2Years,
}

impl TimeRange {
    pub fn as_query(&self) -> &'static str {
        match self {
            TimeRange::Last30Days => "30days",
            TimeRange::Last3Months => "3months",
            TimeRange::Last12Months => "12months",
            TimeRange::Last2Years => "2years",
        }
    }
}

/// Which app a credential belongs to.
///
/// The member app and the admin console keep separate credentials so
/// logging into one never signs the other out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionScope {
    Member,
    Admin,
}

impl SessionScope {
    /// Key under which the credential is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            SessionScope::Member => "token",
            SessionScope::Admin => "admin_token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_wire_format() {
        let online: ProductStatus = serde_json::from_str("1").unwrap();
        assert_eq!(online, ProductStatus::Online);
        assert_eq!(serde_json::to_string(&ProductStatus::Offline).unwrap(), "0");
        assert!(serde_json::from_str::<ProductStatus>("7").is_err());
    }

    #[test]
    fn test_query_values() {
        assert_eq!(RecordFilter::Spent.as_query(), "spent");
        assert_eq!(TimeRange::Last12Months.as_query(), "12months");
        assert_eq!(
            serde_json::to_string(&TimeRange::Last2Years).unwrap(),
            "\"2years\""
        );
    }
}
