//! Points ledger models

use super::deserialize_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Earn,
    Spend,
}

/// One line of the points history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub points: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Balance after this entry
    pub balance: i64,
    #[serde(default)]
    pub details: Option<String>,
}

impl PointsRecord {
    /// Points with sign applied (spending is negative)
    pub fn signed_points(&self) -> i64 {
        match self.kind {
            RecordKind::Earn => self.points.abs(),
            RecordKind::Spend => -self.points.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ledger_entry() {
        let json = r#"{
            "id": "r-1", "date": "2024-03-01T09:15:00", "type": "spend",
            "points": 60, "description": "兑换 Coffee x2", "balance": 40, "details": null
        }"#;
        let record: PointsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, RecordKind::Spend);
        assert_eq!(record.signed_points(), -60);
        assert_eq!(record.balance, 40);
    }
}
