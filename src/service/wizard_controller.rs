//! 发行向导状态机
//!
//! 状态 = 三个编辑步骤 ∪ {Submitting, Closed}。诊断只做提示，不阻塞步骤转换。
//! 同一向导实例同时最多一个提交在途；关闭向导会放弃在途的生命周期。

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    domain::{
        DiagnosticsMap, FieldValue, LaunchField, LaunchParameters, LifecycleFailure,
        TransactionOutcome, TransactionReference, WizardPhase, WizardStep,
    },
    error::WizardError,
    service::{
        allocation_validator,
        result_reconciler::{ResultReconciler, UserNotice},
        transaction_lifecycle::LaunchLifecycle,
        wallet_session::WalletSession,
    },
};

pub const WALLET_NOT_CONNECTED_MESSAGE: &str = "Please connect your wallet first";

/// 提交状态（快照的一部分）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SubmissionState {
    Idle,
    InFlight,
    Confirmed { reference: TransactionReference },
    Failed { failure: LifecycleFailure },
}

/// `retreat()` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    Moved(WizardStep),
    /// 第一步后退即取消，由宿主决定是否 `close()`
    Cancelled,
}

/// `submit()` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    Confirmed(TransactionReference),
    Failed(LifecycleFailure),
    /// 已有提交在途，本次调用为空操作
    AlreadyInFlight,
    WalletNotConnected,
    /// 提交期间向导被关闭，结果被丢弃
    Abandoned,
}

/// 只读快照
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub phase: WizardPhase,
    pub step: WizardStep,
    pub parameters: LaunchParameters,
    pub diagnostics: DiagnosticsMap,
    pub submission: SubmissionState,
    pub notice: Option<UserNotice>,
}

struct WizardState {
    phase: WizardPhase,
    /// 最近一次所在的编辑步骤
    step: WizardStep,
    parameters: LaunchParameters,
    diagnostics: DiagnosticsMap,
    submission: SubmissionState,
    notice: Option<UserNotice>,
    in_flight: Option<AbortHandle>,
    /// 每次提交或关闭递增；用于识别过期结果
    generation: u64,
}

impl WizardState {
    fn new() -> Self {
        Self {
            phase: WizardPhase::Editing(WizardStep::BasicInfo),
            step: WizardStep::BasicInfo,
            parameters: LaunchParameters::default(),
            diagnostics: DiagnosticsMap::new(),
            submission: SubmissionState::Idle,
            notice: None,
            in_flight: None,
            generation: 0,
        }
    }

    fn editing_step(&self, action: &'static str) -> Result<WizardStep, WizardError> {
        match self.phase {
            WizardPhase::Editing(step) => Ok(step),
            phase => Err(WizardError::locked(action, phase)),
        }
    }

    fn move_to(&mut self, step: WizardStep) {
        self.step = step;
        self.phase = WizardPhase::Editing(step);
    }
}

pub struct WizardController {
    lifecycle: Arc<LaunchLifecycle>,
    wallet: Arc<WalletSession>,
    reconciler: Arc<ResultReconciler>,
    user_id: Option<String>,
    state: Mutex<WizardState>,
}

impl WizardController {
    /// 打开向导：第一步，默认参数，无诊断
    pub fn open(
        lifecycle: Arc<LaunchLifecycle>,
        wallet: Arc<WalletSession>,
        reconciler: Arc<ResultReconciler>,
        user_id: Option<String>,
    ) -> Self {
        tracing::debug!(user_id = ?user_id, "Launch wizard opened");
        Self {
            lifecycle,
            wallet,
            reconciler,
            user_id,
            state: Mutex::new(WizardState::new()),
        }
    }

    /// 接受任意值；只清除该字段自己的诊断
    pub async fn edit(&self, field: LaunchField, value: FieldValue) -> Result<(), WizardError> {
        let mut state = self.state.lock().await;
        state.editing_step("edit")?;
        state.parameters.apply(field, &value);
        state.diagnostics.remove(field.key());
        Ok(())
    }

    /// 按 camelCase 键编辑；未知键返回 `None`
    pub async fn edit_by_key(
        &self,
        key: &str,
        value: FieldValue,
    ) -> Option<Result<(), WizardError>> {
        let field = LaunchField::from_key(key)?;
        Some(self.edit(field, value).await)
    }

    /// 重新计算当前步骤的诊断，然后无条件前进
    pub async fn advance(&self) -> Result<WizardStep, WizardError> {
        let mut state = self.state.lock().await;
        let step = state.editing_step("advance")?;
        let next = step.next().ok_or(WizardError::InvalidStep {
            action: "advance",
            step: step.number(),
        })?;

        state.diagnostics = allocation_validator::validate(step, &state.parameters);
        if !state.diagnostics.is_empty() {
            tracing::debug!(
                step = step.number(),
                warnings = state.diagnostics.len(),
                "Advancing with diagnostics"
            );
        }
        state.move_to(next);
        Ok(next)
    }

    pub async fn retreat(&self) -> Result<RetreatOutcome, WizardError> {
        let mut state = self.state.lock().await;
        let step = state.editing_step("retreat")?;
        match step.previous() {
            Some(previous) => {
                state.move_to(previous);
                Ok(RetreatOutcome::Moved(previous))
            }
            None => Ok(RetreatOutcome::Cancelled),
        }
    }

    /// 从第三步提交。重复点击不会启动第二个生命周期。
    ///
    /// 返回的 future 需要被驱动到完成；放弃提交请调用 [`close`](Self::close)。
    pub async fn submit(&self) -> Result<SubmitResult, WizardError> {
        let (parameters, registration, generation) = {
            let mut state = self.state.lock().await;
            if state.phase == WizardPhase::Submitting {
                tracing::debug!("Submit ignored: launch already in flight");
                return Ok(SubmitResult::AlreadyInFlight);
            }
            let step = state.editing_step("submit")?;
            if !step.is_last() {
                return Err(WizardError::InvalidStep {
                    action: "submit",
                    step: step.number(),
                });
            }

            state.diagnostics = allocation_validator::validate(step, &state.parameters);

            if !self.wallet.is_connected().await {
                state.notice = Some(UserNotice {
                    title: "Wallet Not Connected".to_string(),
                    description: WALLET_NOT_CONNECTED_MESSAGE.to_string(),
                    link: None,
                    destructive: true,
                });
                return Ok(SubmitResult::WalletNotConnected);
            }

            let (handle, registration) = AbortHandle::new_pair();
            state.generation += 1;
            state.phase = WizardPhase::Submitting;
            state.submission = SubmissionState::InFlight;
            state.notice = None;
            state.in_flight = Some(handle);
            (state.parameters.clone(), registration, state.generation)
        };

        let run = Abortable::new(
            self.lifecycle.run(&parameters, &self.wallet),
            registration,
        );
        let report = match run.await {
            Ok(report) => report,
            Err(_) => {
                tracing::info!(generation, "Launch lifecycle abandoned");
                return Ok(SubmitResult::Abandoned);
            }
        };

        // 关闭之后到达的确认仍然失效缓存，但不再改变向导状态
        let reconciliation = self
            .reconciler
            .reconcile(&report.outcome, &parameters, self.user_id.as_deref())
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation || state.phase != WizardPhase::Submitting {
            tracing::warn!(
                attempt_id = %report.attempt_id,
                tx_hash = ?report.outcome.reference().map(|r| r.as_str()),
                "Discarding launch result after wizard was closed"
            );
            return Ok(SubmitResult::Abandoned);
        }
        state.in_flight = None;
        state.notice = Some(reconciliation.notice().clone());

        match report.outcome {
            TransactionOutcome::Confirmed { reference, .. } => {
                state.phase = WizardPhase::Closed;
                state.submission = SubmissionState::Confirmed {
                    reference: reference.clone(),
                };
                Ok(SubmitResult::Confirmed(reference))
            }
            // 不自动重试，回到第三步等待用户修正
            TransactionOutcome::Failed(failure) => {
                state.move_to(WizardStep::LaunchConfig);
                state.submission = SubmissionState::Failed {
                    failure: failure.clone(),
                };
                Ok(SubmitResult::Failed(failure))
            }
        }
    }

    /// 关闭向导，放弃在途的生命周期。可重复调用。
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Some(handle) = state.in_flight.take() {
            tracing::info!(generation = state.generation, "Closing wizard with launch in flight");
            handle.abort();
            state.submission = SubmissionState::Idle;
        }
        state.generation += 1;
        state.phase = WizardPhase::Closed;
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.lock().await;
        WizardSnapshot {
            phase: state.phase,
            step: state.step,
            parameters: state.parameters.clone(),
            diagnostics: state.diagnostics.clone(),
            submission: state.submission.clone(),
            notice: state.notice.clone(),
        }
    }

    pub async fn phase(&self) -> WizardPhase {
        self.state.lock().await.phase
    }
}
