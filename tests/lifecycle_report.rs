//! 生命周期报告测试：状态转换序列与失败阶段

mod common;

use std::sync::Arc;

use common::{FakeExtension, FakeRecorder, FakeSubmitter, SignBehavior, TEST_TX_HASH};
use launchcore::{
    domain::{LaunchParameters, LifecycleStage, LifecycleState, NetworkTag, TransactionOutcome},
    service::{
        transaction_builder::EnvelopeTransactionBuilder, transaction_lifecycle::LaunchLifecycle,
        wallet_session::WalletSession,
    },
};

fn lifecycle(submit_fails: bool, record_fails: bool) -> LaunchLifecycle {
    LaunchLifecycle::new(
        Arc::new(EnvelopeTransactionBuilder::new()),
        FakeSubmitter::new(submit_fails),
        FakeRecorder::new(record_fails),
    )
}

fn params() -> LaunchParameters {
    let mut p = LaunchParameters::default();
    p.name = "Orbit".into();
    p.symbol = "ORB".into();
    p.total_supply = "5000000".into();
    p
}

async fn connected_wallet(sign: SignBehavior) -> WalletSession {
    let wallet = WalletSession::new(FakeExtension::new(sign));
    wallet.connect().await.unwrap();
    wallet
}

#[tokio::test]
async fn test_happy_path_transitions() {
    let wallet = connected_wallet(SignBehavior::Approve).await;
    let report = lifecycle(false, false).run(&params(), &wallet).await;

    let states: Vec<LifecycleState> = report.transitions.iter().map(|t| t.to).collect();
    assert_eq!(
        states,
        vec![
            LifecycleState::Signing,
            LifecycleState::Submitting,
            LifecycleState::Recording,
            LifecycleState::Confirmed,
        ]
    );
    assert_eq!(report.final_state(), LifecycleState::Confirmed);
    match report.outcome {
        TransactionOutcome::Confirmed {
            reference,
            network,
            record,
        } => {
            assert_eq!(reference.as_str(), TEST_TX_HASH);
            assert_eq!(network, NetworkTag::Testnet);
            assert_eq!(record.name, "Orbit");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnected_wallet_fails_at_build() {
    let wallet = WalletSession::new(FakeExtension::new(SignBehavior::Approve));
    let report = lifecycle(false, false).run(&params(), &wallet).await;

    assert_eq!(
        report.final_state(),
        LifecycleState::Failed(LifecycleStage::Build)
    );
    let failure = report.outcome.failure().unwrap();
    assert_eq!(failure.cause().code, "wallet_not_connected");
}

#[tokio::test]
async fn test_malformed_supply_fails_at_build() {
    let wallet = connected_wallet(SignBehavior::Approve).await;
    let mut p = params();
    p.total_supply = "five million".into();

    let report = lifecycle(false, false).run(&p, &wallet).await;
    assert_eq!(
        report.final_state(),
        LifecycleState::Failed(LifecycleStage::Build)
    );
    assert_eq!(report.transitions.len(), 1);
}

#[tokio::test]
async fn test_each_failure_is_absorbing() {
    let cases = [
        (SignBehavior::Reject, false, false, LifecycleStage::Sign),
        (SignBehavior::Approve, true, false, LifecycleStage::Submit),
        (SignBehavior::Approve, false, true, LifecycleStage::Record),
    ];

    for (sign, submit_fails, record_fails, stage) in cases {
        let wallet = connected_wallet(sign).await;
        let report = lifecycle(submit_fails, record_fails)
            .run(&params(), &wallet)
            .await;

        assert_eq!(report.final_state(), LifecycleState::Failed(stage));
        assert!(report.final_state().is_final());
        assert_eq!(
            report.outcome.reference().is_some(),
            stage == LifecycleStage::Record
        );
    }
}
