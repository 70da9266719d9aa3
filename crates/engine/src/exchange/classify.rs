//! Classification of exchange failures from the backend's message text.
//!
//! The backend only returns free-form (Chinese) messages, so the class is
//! recovered by substring matching. Kept behind `FailureClassifier` so a
//! structured error code can replace it without touching the flow.

use regex::Regex;
use std::fmt;

const CODE_MARKER: &str = "验证码";
const POINTS_MARKER: &str = "积分不足";
const STOCK_MARKER: &str = "库存不足";
const MONTHLY_MARKERS: [&str; 2] = ["月度兑换限制", "超过月度"];
const PHONE_MARKER: &str = "手机号";
const PRODUCT_MARKER: &str = "产品不存在";
const USER_MARKER: &str = "用户不存在";

/// Counts reported with a monthly-limit rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyUsage {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// Why the backend refused an exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeFailure {
    /// Wrong or expired code; shown at the code input
    VerificationCodeInvalid(String),
    InsufficientPoints,
    InsufficientStock,
    MonthlyLimitReached(Option<MonthlyUsage>),
    PhoneNotBound,
    ProductNotFound,
    UserNotFound,
    /// Anything else, shown verbatim
    Unclassified(String),
}

impl ExchangeFailure {
    /// Whether the failure belongs at the verification code field rather
    /// than in a general notification
    pub fn is_verification_scoped(&self) -> bool {
        matches!(self, ExchangeFailure::VerificationCodeInvalid(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            ExchangeFailure::VerificationCodeInvalid(message) => message.clone(),
            ExchangeFailure::InsufficientPoints => {
                "Not enough points. Earn more points and try again.".to_string()
            }
            ExchangeFailure::InsufficientStock => {
                "This product is out of stock. Please choose another product.".to_string()
            }
            ExchangeFailure::MonthlyLimitReached(Some(usage)) => format!(
                "Monthly exchange limit reached (used {} of {}). Try again next month or choose another product.",
                usage.used, usage.limit
            ),
            ExchangeFailure::MonthlyLimitReached(None) => {
                "Monthly exchange limit reached. Try again next month or choose another product."
                    .to_string()
            }
            ExchangeFailure::PhoneNotBound => {
                "Please bind a phone number to your account first.".to_string()
            }
            ExchangeFailure::ProductNotFound => {
                "This product no longer exists or was taken offline. Please refresh.".to_string()
            }
            ExchangeFailure::UserNotFound => {
                "Your account could not be found. Please log in again.".to_string()
            }
            ExchangeFailure::Unclassified(message) => message.clone(),
        }
    }
}

impl fmt::Display for ExchangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Maps a backend message to an `ExchangeFailure`
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, message: &str) -> ExchangeFailure;
}

/// Substring matcher for the messages the points service currently emits
pub struct MessageClassifier {
    usage_pattern: Regex,
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self {
            usage_pattern: Regex::new(
                r"本月已兑换\s*(\d+)\s*次.*限制\s*(\d+)\s*次.*剩余\s*(\d+)\s*次",
            )
            .expect("monthly usage pattern is valid"),
        }
    }

    fn monthly_usage(&self, message: &str) -> Option<MonthlyUsage> {
        let caps = self.usage_pattern.captures(message)?;
        Some(MonthlyUsage {
            used: caps.get(1)?.as_str().parse().ok()?,
            limit: caps.get(2)?.as_str().parse().ok()?,
            remaining: caps.get(3)?.as_str().parse().ok()?,
        })
    }
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureClassifier for MessageClassifier {
    fn classify(&self, message: &str) -> ExchangeFailure {
        // Order matters: the code check wins over everything else.
        if message.contains(CODE_MARKER) {
            ExchangeFailure::VerificationCodeInvalid(message.to_string())
        } else if message.contains(POINTS_MARKER) {
            ExchangeFailure::InsufficientPoints
        } else if message.contains(STOCK_MARKER) {
            ExchangeFailure::InsufficientStock
        } else if MONTHLY_MARKERS.iter().any(|m| message.contains(m)) {
            ExchangeFailure::MonthlyLimitReached(self.monthly_usage(message))
        } else if message.contains(PHONE_MARKER) {
            ExchangeFailure::PhoneNotBound
        } else if message.contains(PRODUCT_MARKER) {
            ExchangeFailure::ProductNotFound
        } else if message.contains(USER_MARKER) {
            ExchangeFailure::UserNotFound
        } else {
            ExchangeFailure::Unclassified(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(message: &str) -> ExchangeFailure {
        MessageClassifier::new().classify(message)
    }

    #[test]
    fn test_verification_code_messages() {
        for message in ["验证码错误", "验证码已过期", "请先获取验证码"] {
            let failure = classify(message);
            assert_eq!(
                failure,
                ExchangeFailure::VerificationCodeInvalid(message.to_string())
            );
            assert!(failure.is_verification_scoped());
            assert_eq!(failure.user_message(), message);
        }
    }

    #[test]
    fn test_code_marker_wins_over_other_markers() {
        assert!(classify("验证码错误，积分不足").is_verification_scoped());
    }

    #[test]
    fn test_general_classes() {
        assert_eq!(classify("积分不足"), ExchangeFailure::InsufficientPoints);
        assert_eq!(classify("商品库存不足"), ExchangeFailure::InsufficientStock);
        assert_eq!(classify("用户未绑定手机号"), ExchangeFailure::PhoneNotBound);
        assert_eq!(classify("产品不存在"), ExchangeFailure::ProductNotFound);
        assert_eq!(classify("用户不存在"), ExchangeFailure::UserNotFound);
        for failure in [
            ExchangeFailure::InsufficientPoints,
            ExchangeFailure::PhoneNotBound,
        ] {
            assert!(!failure.is_verification_scoped());
        }
    }

    #[test]
    fn test_monthly_limit_with_counts() {
        let failure = classify("超过月度兑换限制：本月已兑换 5 次，限制 5 次，剩余 0 次");
        assert_eq!(
            failure,
            ExchangeFailure::MonthlyLimitReached(Some(MonthlyUsage {
                used: 5,
                limit: 5,
                remaining: 0
            }))
        );
        assert!(failure.user_message().contains("used 5 of 5"));
    }

    #[test]
    fn test_monthly_limit_without_counts() {
        let failure = classify("已达到月度兑换限制");
        assert_eq!(failure, ExchangeFailure::MonthlyLimitReached(None));
        assert!(failure.user_message().starts_with("Monthly exchange limit reached."));
    }

    #[test]
    fn test_unknown_message_is_verbatim() {
        let failure = classify("系统繁忙");
        assert_eq!(failure, ExchangeFailure::Unclassified("系统繁忙".into()));
        assert_eq!(failure.to_string(), "系统繁忙");
    }
}
