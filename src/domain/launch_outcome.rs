//! 提交结果：每次提交尝试产生一次，不自动重试

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{network::NetworkTag, transaction_status::LifecycleStage};

/// 链上交易引用（交易哈希）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionReference(pub String);

impl TransactionReference {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 结构化错误描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// 机器可读的错误码，如 `user_rejected`、`tx_failed`
    pub code: String,
    pub message: String,
    /// 后台校验错误列表等细节
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorDescriptor {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// 面向用户的一句话：优先第一条细节
    pub fn user_message(&self) -> &str {
        self.details
            .first()
            .map(String::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.message)
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// 后台返回的规范项目记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// 后台可能返回字符串或数字 id
    #[serde(default, deserialize_with = "deserialize_record_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    /// 其余字段原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// 生命周期失败：按阶段封闭，调用方必须穷尽处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum LifecycleFailure {
    Build {
        cause: ErrorDescriptor,
    },
    Sign {
        cause: ErrorDescriptor,
    },
    Submit {
        cause: ErrorDescriptor,
    },
    /// 链上交易已存在，只是记账失败
    Record {
        reference: TransactionReference,
        network: NetworkTag,
        cause: ErrorDescriptor,
    },
}

impl LifecycleFailure {
    pub fn stage(&self) -> LifecycleStage {
        match self {
            Self::Build { .. } => LifecycleStage::Build,
            Self::Sign { .. } => LifecycleStage::Sign,
            Self::Submit { .. } => LifecycleStage::Submit,
            Self::Record { .. } => LifecycleStage::Record,
        }
    }

    pub fn cause(&self) -> &ErrorDescriptor {
        match self {
            Self::Build { cause }
            | Self::Sign { cause }
            | Self::Submit { cause }
            | Self::Record { cause, .. } => cause,
        }
    }

    /// 仅 Record 失败携带链上引用
    pub fn reference(&self) -> Option<&TransactionReference> {
        match self {
            Self::Record { reference, .. } => Some(reference),
            Self::Build { .. } | Self::Sign { .. } | Self::Submit { .. } => None,
        }
    }
}

impl fmt::Display for LifecycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage(), self.cause())
    }
}

/// 一次提交尝试的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TransactionOutcome {
    Confirmed {
        reference: TransactionReference,
        network: NetworkTag,
        record: ProjectRecord,
    },
    Failed(LifecycleFailure),
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn failure(&self) -> Option<&LifecycleFailure> {
        match self {
            Self::Failed(f) => Some(f),
            Self::Confirmed { .. } => None,
        }
    }

    pub fn reference(&self) -> Option<&TransactionReference> {
        match self {
            Self::Confirmed { reference, .. } => Some(reference),
            Self::Failed(f) => f.reference(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_first_detail() {
        let cause = ErrorDescriptor::new("validation_failed", "Validation failed")
            .with_details(vec!["Symbol already taken".into(), "other".into()]);
        assert_eq!(cause.user_message(), "Symbol already taken");

        let cause = ErrorDescriptor::new("network", "connection reset");
        assert_eq!(cause.user_message(), "connection reset");
    }

    #[test]
    fn test_record_failure_carries_reference() {
        let failure = LifecycleFailure::Record {
            reference: TransactionReference::new("abc123"),
            network: NetworkTag::Testnet,
            cause: ErrorDescriptor::new("http_500", "boom"),
        };
        assert_eq!(failure.stage(), LifecycleStage::Record);
        assert_eq!(failure.reference().map(|r| r.as_str()), Some("abc123"));

        let outcome = TransactionOutcome::Failed(failure);
        assert!(!outcome.is_confirmed());
        assert_eq!(outcome.reference().map(|r| r.as_str()), Some("abc123"));
    }

    #[test]
    fn test_project_record_keeps_unknown_fields() {
        let record: ProjectRecord = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Stellar Token",
            "txHash": "abc",
            "status": "active"
        }))
        .unwrap();
        assert_eq!(record.tx_hash.as_deref(), Some("abc"));
        assert_eq!(record.extra["status"], "active");
    }

    #[test]
    fn test_project_record_numeric_id_and_missing_name() {
        let record: ProjectRecord =
            serde_json::from_str(r#"{"id":42,"txHash":"abc"}"#).unwrap();
        assert_eq!(record.id.as_deref(), Some("42"));
        assert!(record.name.is_empty());
        assert_eq!(record.tx_hash.as_deref(), Some("abc"));
    }
}
