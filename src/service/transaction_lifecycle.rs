//! 发行交易生命周期编排
//!
//! 一次提交尝试一个实例：build -> sign -> submit -> record。
//! 任一阶段失败即进入吸收态 Failed(stage)，不做任何自动重试。
//! Record 失败时链上交易已存在，结果中必须携带交易引用。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{
        ErrorDescriptor, LaunchParameters, LifecycleFailure, LifecycleState, TransactionOutcome,
    },
    error::{BuildError, WalletError},
    service::{
        project_records::ProjectRecorder,
        submission::TransactionSubmitter,
        transaction_builder::{CreateProjectArgs, LaunchTransactionBuilder},
        wallet_session::WalletSession,
    },
};

/// 状态转换记录
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub timestamp: DateTime<Utc>,
}

/// 一次提交尝试的完整报告
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReport {
    pub attempt_id: Uuid,
    pub outcome: TransactionOutcome,
    pub transitions: Vec<StateTransition>,
}

impl LifecycleReport {
    pub fn final_state(&self) -> LifecycleState {
        self.transitions
            .last()
            .map(|t| t.to)
            .unwrap_or(LifecycleState::Building)
    }
}

struct Attempt {
    id: Uuid,
    state: LifecycleState,
    transitions: Vec<StateTransition>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: LifecycleState::Building,
            transitions: Vec::new(),
        }
    }

    fn advance(&mut self, to: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(&to),
            "invalid lifecycle transition {} -> {}",
            self.state,
            to
        );
        tracing::info!(attempt_id = %self.id, from = %self.state, to = %to, "Launch lifecycle transition");
        self.transitions.push(StateTransition {
            from: self.state,
            to,
            timestamp: Utc::now(),
        });
        self.state = to;
    }

    fn fail(mut self, failure: LifecycleFailure) -> LifecycleReport {
        let stage = failure.stage();
        tracing::warn!(
            attempt_id = %self.id,
            stage = %stage,
            cause = %failure.cause(),
            "Launch lifecycle failed"
        );
        self.advance(LifecycleState::Failed(stage));
        self.finish(TransactionOutcome::Failed(failure))
    }

    fn finish(self, outcome: TransactionOutcome) -> LifecycleReport {
        LifecycleReport {
            attempt_id: self.id,
            outcome,
            transitions: self.transitions,
        }
    }
}

pub struct LaunchLifecycle {
    builder: Arc<dyn LaunchTransactionBuilder>,
    submitter: Arc<dyn TransactionSubmitter>,
    recorder: Arc<dyn ProjectRecorder>,
}

impl LaunchLifecycle {
    pub fn new(
        builder: Arc<dyn LaunchTransactionBuilder>,
        submitter: Arc<dyn TransactionSubmitter>,
        recorder: Arc<dyn ProjectRecorder>,
    ) -> Self {
        Self {
            builder,
            submitter,
            recorder,
        }
    }

    /// 执行一次提交尝试。签名与广播两个挂起点都没有内部超时；
    /// 丢弃返回的 future 即放弃本次尝试。
    pub async fn run(&self, params: &LaunchParameters, wallet: &WalletSession) -> LifecycleReport {
        let mut attempt = Attempt::new();
        tracing::info!(
            attempt_id = %attempt.id,
            symbol = %params.symbol,
            "Launch lifecycle started"
        );

        // Build
        let Some(identity) = wallet.identity().await else {
            return attempt.fail(LifecycleFailure::Build {
                cause: ErrorDescriptor::from(&WalletError::NotConnected),
            });
        };
        let network = match wallet.current_network().await {
            Ok(n) => n,
            Err(e) => {
                return attempt.fail(LifecycleFailure::Build {
                    cause: ErrorDescriptor::from(&BuildError::Network(e.to_string())),
                })
            }
        };
        let args = CreateProjectArgs::from_parameters(params);
        let unsigned = match self.builder.build(&identity.address, &args, network) {
            Ok(tx) => tx,
            Err(e) => {
                return attempt.fail(LifecycleFailure::Build {
                    cause: ErrorDescriptor::from(&e),
                })
            }
        };

        // Sign
        attempt.advance(LifecycleState::Signing);
        let signed = match wallet.sign(&unsigned.payload, network).await {
            Ok(s) => s,
            Err(e) => {
                return attempt.fail(LifecycleFailure::Sign {
                    cause: ErrorDescriptor::from(&e),
                })
            }
        };

        // Submit
        attempt.advance(LifecycleState::Submitting);
        let reference = match self.submitter.submit(&signed, network).await {
            Ok(r) => r,
            Err(e) => {
                return attempt.fail(LifecycleFailure::Submit {
                    cause: ErrorDescriptor::from(&e),
                })
            }
        };
        tracing::info!(
            attempt_id = %attempt.id,
            tx_hash = %reference,
            fingerprint = %unsigned.fingerprint,
            "Launch transaction landed"
        );

        // Record
        attempt.advance(LifecycleState::Recording);
        let record = match self
            .recorder
            .record(params, &identity.address, &reference)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                return attempt.fail(LifecycleFailure::Record {
                    reference,
                    network,
                    cause: ErrorDescriptor::from(&e),
                })
            }
        };

        attempt.advance(LifecycleState::Confirmed);
        attempt.finish(TransactionOutcome::Confirmed {
            reference,
            network,
            record,
        })
    }
}
