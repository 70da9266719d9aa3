//! Exchange models

use super::deserialize_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/points/exchange`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub product_id: String,
    pub quantity: u32,
    pub verification_code: String,
}

/// Acknowledgement of a verification code dispatch.
///
/// Development backends echo the code back; production backends do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeDispatch {
    pub echoed_code: Option<String>,
}

/// Exchange history row as shown in the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub product_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub points: i64,
    pub status: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Filters for the admin exchange history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_camel_case() {
        let req = ExchangeRequest {
            product_id: "p-1".into(),
            quantity: 2,
            verification_code: "123456".into(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"productId":"p-1","quantity":2,"verificationCode":"123456"}"#
        );
    }

    #[test]
    fn test_parse_admin_record() {
        let json = r#"{
            "id": "e-1", "userId": "u-1", "username": "alice", "phone": "138****0000",
            "productId": "p-1", "productName": "Coffee", "quantity": 1, "points": 30,
            "status": "SUCCESS", "couponCode": "CPN-1", "createdAt": "2024-03-01T09:15:00.123"
        }"#;
        let record: ExchangeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.coupon_code.as_deref(), Some("CPN-1"));
        assert!(record.updated_at.is_none());
    }
}
