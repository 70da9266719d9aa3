//! Uniform response wrapper returned by every backend endpoint

use serde::{Deserialize, Serialize};

/// `code` value of a successful response
pub const SUCCESS_CODE: i32 = 200;
/// `code` value signalling a missing or expired credential
pub const UNAUTHORIZED_CODE: i32 = 401;

/// `{ code, message, data, timestamp }` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn is_auth_failure(&self) -> bool {
        self.code == UNAUTHORIZED_CODE
    }

    /// Server message, or the given fallback when the server sent none
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_data_and_missing_message() {
        let env: ApiEnvelope<u64> =
            serde_json::from_str(r#"{"code":500,"data":null,"timestamp":1}"#).unwrap();
        assert!(!env.is_success());
        assert!(env.data.is_none());
        assert_eq!(env.message_or("请求失败"), "请求失败");
    }

    #[test]
    fn test_auth_failure_code() {
        let env: ApiEnvelope<()> =
            serde_json::from_str(r#"{"code":401,"message":"登录已过期"}"#).unwrap();
        assert!(env.is_auth_failure());
        assert_eq!(env.message_or("x"), "登录已过期");
    }
}
