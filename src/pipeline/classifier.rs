//! 失败分类
//!
//! 对阶段失败的文本描述按固定优先级做关键字匹配，映射到固定类别，
//! 并给出面向用户的说明、严重程度、可恢复标记与建议。
//! 分类永不失败：无一命中时回退 System。可恢复标记仅供展示，引擎不据此重试。

use serde::{Deserialize, Serialize};

/// 错误类别（固定类目，带兜底）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "api_key_error")]
    ApiKey,
    #[serde(rename = "rate_limit_error")]
    RateLimit,
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "quota_exceeded")]
    QuotaExceeded,
    #[serde(rename = "timeout_error")]
    Timeout,
    #[serde(rename = "system_error")]
    System,
}

/// 严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// 类别规则表：按数组顺序匹配，先命中先得
const RULES: &[(ErrorKind, &[&str])] = &[
    (
        ErrorKind::ApiKey,
        &[
            "api key",
            "authentication",
            "unauthorized",
            "invalid_api_key",
            "incorrect api key",
            "sk-proj",
            "openai",
        ],
    ),
    (
        ErrorKind::RateLimit,
        &[
            "rate limit",
            "too many requests",
            "quota",
            "limit exceeded",
            "requests per minute",
            "rpm",
            "tpm",
        ],
    ),
    (
        ErrorKind::Network,
        &[
            "network",
            "connection",
            "timeout",
            "unreachable",
            "dns",
            "socket",
            "ssl",
            "certificate",
            "connection refused",
        ],
    ),
    (
        ErrorKind::Validation,
        &[
            "validation",
            "invalid",
            "malformed",
            "bad request",
            "missing required",
            "parameter",
        ],
    ),
    (
        ErrorKind::QuotaExceeded,
        &["quota exceeded", "billing", "usage limit", "insufficient credits"],
    ),
    (
        ErrorKind::Timeout,
        &["timeout", "timed out", "request timeout", "read timeout"],
    ),
];

/// 将任意失败描述映射到错误类别；无一命中时回退 System
pub fn classify(description: &str) -> ErrorKind {
    let msg = description.to_lowercase();
    for (kind, keywords) in RULES {
        if keywords.iter().any(|k| msg.contains(*k)) {
            return *kind;
        }
    }
    ErrorKind::System
}

impl ErrorKind {
    /// 面向用户的固定说明
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::ApiKey => {
                "There's an issue with the API configuration. Please check your API key settings."
            }
            ErrorKind::RateLimit => "API rate limit reached. Please wait a moment and try again.",
            ErrorKind::Network => {
                "Network connection issue. Please check your internet connection and try again."
            }
            ErrorKind::Validation => "Invalid input provided. Please check your request and try again.",
            ErrorKind::QuotaExceeded => "API quota has been exceeded. Please check your account limits.",
            ErrorKind::Timeout => "The request took too long to complete. Please try again.",
            ErrorKind::System => "An unexpected system error occurred. Please try again in a moment.",
        }
    }

    /// 用户重试是否可能成功
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimit | ErrorKind::Network | ErrorKind::Timeout | ErrorKind::System
        )
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::ApiKey | ErrorKind::QuotaExceeded | ErrorKind::System => Severity::High,
            ErrorKind::RateLimit | ErrorKind::Network | ErrorKind::Timeout => Severity::Medium,
            ErrorKind::Validation => Severity::Low,
        }
    }

    /// 该类别的基础恢复建议
    pub fn base_suggestions(&self) -> &'static [&'static str] {
        match self {
            ErrorKind::ApiKey => &[
                "Check your OpenAI API key in the configuration",
                "Verify your API key is valid and active",
                "Ensure your API key has the correct permissions",
                "Contact support if the issue persists",
            ],
            ErrorKind::RateLimit => &[
                "Wait a few minutes and try again",
                "Consider upgrading your API plan for higher limits",
                "Try again during off-peak hours",
            ],
            ErrorKind::Network => &[
                "Check your internet connection",
                "Try again in a few moments",
                "Verify your firewall settings allow the connection",
            ],
            ErrorKind::Validation => &[
                "Check your blog topic is not empty",
                "Ensure your input doesn't contain invalid characters",
                "Try with a different topic or shorter text",
            ],
            ErrorKind::QuotaExceeded => &[
                "Check your API usage limits",
                "Upgrade your API plan for higher quotas",
                "Wait until your quota resets",
            ],
            ErrorKind::Timeout => &[
                "Try again with a simpler topic",
                "Check your internet connection",
                "The system may be experiencing high load",
            ],
            ErrorKind::System => &[
                "Try again in a few moments",
                "Check system status",
                "Contact support if the issue persists",
            ],
        }
    }
}

/// 结构化错误记录：类别 + 用户说明 + 技术细节 + 建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_type: ErrorKind,
    pub user_message: String,
    pub technical_details: String,
    pub is_recoverable: bool,
    pub suggestions: Vec<String>,
    pub severity: Severity,
    /// 分类时刻（毫秒时间戳）
    pub timestamp: i64,
}

impl ErrorReport {
    /// 对任意失败描述做一次完整分类；本函数自身永不失败
    pub fn from_failure(description: &str) -> Self {
        let kind = classify(description);
        let msg = description.to_lowercase();

        let mut suggestions: Vec<String> = kind
            .base_suggestions()
            .iter()
            .map(|s| s.to_string())
            .collect();

        // 按失败内容补充针对性建议，排在最前
        if kind == ErrorKind::ApiKey && msg.contains("openai") {
            suggestions.insert(
                0,
                "Visit https://platform.openai.com/account/api-keys to check your API key".to_string(),
            );
        }
        if kind == ErrorKind::RateLimit {
            if msg.contains("requests per minute") {
                suggestions.insert(
                    0,
                    "You're making requests too quickly. Wait 60 seconds before retrying.".to_string(),
                );
            } else if msg.contains("tokens per minute") {
                suggestions.insert(
                    0,
                    "Try using a shorter blog topic to reduce token usage.".to_string(),
                );
            }
        }

        Self {
            error_type: kind,
            user_message: kind.user_message().to_string(),
            technical_details: description.to_string(),
            is_recoverable: kind.is_recoverable(),
            suggestions,
            severity: kind.severity(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let kind = classify("Provider rejected the call: rate limit reached, retry later");
        assert_eq!(kind, ErrorKind::RateLimit);
        assert!(kind.is_recoverable());
    }

    #[test]
    fn test_classify_priority_order() {
        // api key 规则先于 rate limit 检查
        let kind = classify("Incorrect API key provided while hitting rate limit");
        assert_eq!(kind, ErrorKind::ApiKey);
        assert!(!kind.is_recoverable());
    }

    #[test]
    fn test_classify_fallback_system() {
        let kind = classify("the flux capacitor exploded");
        assert_eq!(kind, ErrorKind::System);
        assert_eq!(kind.severity(), Severity::High);
    }

    #[test]
    fn test_report_fields() {
        let report = ErrorReport::from_failure("connection refused by upstream");
        assert_eq!(report.error_type, ErrorKind::Network);
        assert!(report.is_recoverable);
        assert_eq!(report.severity, Severity::Medium);
        assert_eq!(report.technical_details, "connection refused by upstream");
        assert!(!report.suggestions.is_empty());
    }

    #[test]
    fn test_report_specific_suggestions() {
        let report = ErrorReport::from_failure("429: requests per minute exceeded");
        assert_eq!(report.error_type, ErrorKind::RateLimit);
        assert!(report.suggestions[0].contains("Wait 60 seconds"));

        let report = ErrorReport::from_failure("OpenAI authentication failed");
        assert_eq!(report.error_type, ErrorKind::ApiKey);
        assert!(report.suggestions[0].contains("platform.openai.com"));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&ErrorKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate_limit_error\"");
        let json = serde_json::to_string(&ErrorKind::QuotaExceeded).unwrap();
        assert_eq!(json, "\"quota_exceeded\"");
        let json = serde_json::to_string(&Severity::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
