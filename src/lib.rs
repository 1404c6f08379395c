//! LaunchCore - 代币发行向导与交易生命周期
//!
//! 非托管模式：签名始终由用户钱包扩展完成，本库不接触私钥

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;

// 重新导出常用类型
pub use config::Config;
pub use error::{BuildError, CacheError, RecordError, SubmitError, WalletError, WizardError};

pub mod prelude {
    pub use crate::{
        config::Config,
        domain::{
            FieldValue, LaunchField, LaunchParameters, LifecycleFailure, NetworkTag,
            TransactionOutcome, TransactionReference, WizardPhase, WizardStep,
        },
        error::{WalletError, WizardError},
        infrastructure::{CacheInvalidator, CacheKey, QueryCache},
        service::{
            LaunchLifecycle, ResultReconciler, SignerExtension, SubmitResult, WalletSession,
            WizardController,
        },
    };
}
