//! 错误类型
//!
//! 软警告（诊断）从不作为错误抛出；这里只有外部协作方失败和非法的向导操作。
//! 各协作方错误都能转换为 `ErrorDescriptor`，供生命周期按阶段封装。

use thiserror::Error;

use crate::domain::{ErrorDescriptor, WizardPhase};

/// 钱包扩展错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet extension is not installed")]
    NotInstalled,

    #[error("request was rejected by the user")]
    UserRejected,

    #[error("wallet is unavailable: {0}")]
    Unavailable(String),

    #[error("wallet is not connected")]
    NotConnected,
}

impl WalletError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInstalled => "wallet_not_installed",
            Self::UserRejected => "user_rejected",
            Self::Unavailable(_) => "wallet_unavailable",
            Self::NotConnected => "wallet_not_connected",
        }
    }
}

/// 交易构建错误：只有参数形状问题
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("failed to encode transaction payload: {0}")]
    Encoding(String),

    #[error("network lookup failed: {0}")]
    Network(String),
}

/// 广播错误。超时与明确拒绝暂不区分
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("network rejected transaction: {title}")]
    Rejected {
        title: String,
        result_codes: Vec<String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// 后台记录错误
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(
        "backend validation failed (HTTP {status}): {}",
        .error.as_deref().unwrap_or("no message")
    )]
    Validation {
        status: u16,
        error: Option<String>,
        details: Vec<String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// 缓存失效错误（只记日志，不影响成功结果）
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// 非法的向导操作
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("cannot {action} from step {step}")]
    InvalidStep { action: &'static str, step: u8 },
}

impl WizardError {
    pub(crate) fn locked(action: &'static str, phase: WizardPhase) -> Self {
        Self::InvalidTransition {
            action,
            phase: phase.as_str(),
        }
    }
}

pub(crate) const FALLBACK_LAUNCH_ERROR: &str = "Failed to create project";

impl From<&WalletError> for ErrorDescriptor {
    fn from(err: &WalletError) -> Self {
        ErrorDescriptor::new(err.code(), err.to_string())
    }
}

impl From<&BuildError> for ErrorDescriptor {
    fn from(err: &BuildError) -> Self {
        let code = match err {
            BuildError::InvalidField { .. } => "invalid_parameter",
            BuildError::Encoding(_) => "encoding_failed",
            BuildError::Network(_) => "network_lookup_failed",
        };
        ErrorDescriptor::new(code, err.to_string())
    }
}

impl From<&SubmitError> for ErrorDescriptor {
    fn from(err: &SubmitError) -> Self {
        match err {
            SubmitError::Rejected {
                title,
                result_codes,
            } => ErrorDescriptor::new("tx_rejected", title.clone())
                .with_details(result_codes.clone()),
            SubmitError::Transport(e) if e.is_timeout() => {
                ErrorDescriptor::new("timeout", err.to_string())
            }
            SubmitError::Transport(_) => ErrorDescriptor::new("network", err.to_string()),
            SubmitError::InvalidResponse(_) => {
                ErrorDescriptor::new("invalid_response", err.to_string())
            }
        }
    }
}

impl From<&RecordError> for ErrorDescriptor {
    fn from(err: &RecordError) -> Self {
        match err {
            // 优先级：第一条细节 > error 字段 > 兜底文案
            RecordError::Validation {
                status,
                error,
                details,
            } => ErrorDescriptor::new(
                format!("http_{}", status),
                error
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_LAUNCH_ERROR.to_string()),
            )
            .with_details(details.clone()),
            RecordError::Transport(_) => ErrorDescriptor::new("network", err.to_string()),
            RecordError::InvalidResponse(_) => {
                ErrorDescriptor::new("invalid_response", err.to_string())
            }
        }
    }
}
