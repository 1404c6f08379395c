//! Domain 模块
//!
//! 发行参数、向导步骤、网络与生命周期结果等值类型

pub mod launch_outcome;
pub mod launch_parameters;
pub mod network;
pub mod transaction_status;
pub mod wallet_catalog;
pub mod wizard_step;

// 重新导出常用类型
pub use launch_outcome::{
    ErrorDescriptor, LifecycleFailure, ProjectRecord, TransactionOutcome, TransactionReference,
};
pub use launch_parameters::{FieldValue, LaunchField, LaunchParameters, PLACEHOLDER_TOKEN_ADDRESS};
pub use network::{NetworkTag, WalletIdentity};
pub use transaction_status::{LifecycleStage, LifecycleState};
pub use wallet_catalog::{WalletOption, WALLET_CATALOG};
pub use wizard_step::{DiagnosticsMap, WizardPhase, WizardStep};
