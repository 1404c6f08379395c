pub mod allocation_validator;
pub mod project_records;
pub mod result_reconciler; // 成功失效缓存 / 失败映射消息
pub mod submission;
pub mod transaction_builder;
pub mod transaction_lifecycle; // build -> sign -> submit -> record
pub mod wallet_session;
pub mod wizard_controller; // 向导状态机

pub use project_records::{HttpProjectRecorder, ProjectRecorder};
pub use result_reconciler::{Reconciliation, ResultReconciler, UserNotice};
pub use submission::{HorizonSubmitter, TransactionSubmitter};
pub use transaction_builder::{EnvelopeTransactionBuilder, LaunchTransactionBuilder};
pub use transaction_lifecycle::{LaunchLifecycle, LifecycleReport};
pub use wallet_session::{SignerExtension, WalletSession};
pub use wizard_controller::{
    RetreatOutcome, SubmissionState, SubmitResult, WizardController, WizardSnapshot,
};
