//! 测试辅助模块
//! 提供可编排的假钱包、假广播、假后台与记录型缓存

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use launchcore::{
    config::NetworkConfig,
    domain::{LaunchParameters, NetworkTag, ProjectRecord, TransactionReference},
    error::{CacheError, RecordError, SubmitError, WalletError},
    infrastructure::cache::{CacheInvalidator, CacheKey},
    service::{
        project_records::ProjectRecorder,
        result_reconciler::ResultReconciler,
        submission::TransactionSubmitter,
        transaction_builder::EnvelopeTransactionBuilder,
        transaction_lifecycle::LaunchLifecycle,
        wallet_session::{SignOptions, SignerExtension, WalletSession},
        wizard_controller::WizardController,
    },
};
use tokio::sync::{Mutex, Notify};

pub const TEST_ADDRESS: &str = "GCREATORTESTADDRESS";
pub const TEST_TX_HASH: &str = "a1b2c3d4e5f6";

/// 签名行为
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SignBehavior {
    Approve,
    Reject,
    /// 永远挂起（模拟用户未处理的扩展弹窗）
    Hang,
}

pub struct FakeExtension {
    pub behavior: SignBehavior,
    pub network: NetworkTag,
    pub sign_calls: AtomicUsize,
    /// 进入签名时通知
    pub sign_entered: Notify,
}

impl FakeExtension {
    pub fn new(behavior: SignBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            network: NetworkTag::Testnet,
            sign_calls: AtomicUsize::new(0),
            sign_entered: Notify::new(),
        })
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignerExtension for FakeExtension {
    async fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    async fn request_access(&self) -> Result<(), WalletError> {
        Ok(())
    }

    async fn get_address(&self) -> Result<String, WalletError> {
        Ok(TEST_ADDRESS.to_string())
    }

    async fn get_network(&self) -> Result<NetworkTag, WalletError> {
        Ok(self.network)
    }

    async fn sign(&self, payload: &str, _options: &SignOptions) -> Result<String, WalletError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_entered.notify_one();
        match self.behavior {
            SignBehavior::Approve => Ok(format!("signed:{}", payload)),
            SignBehavior::Reject => Err(WalletError::UserRejected),
            SignBehavior::Hang => std::future::pending().await,
        }
    }
}

pub struct FakeSubmitter {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeSubmitter {
    pub fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSubmitter for FakeSubmitter {
    async fn submit(
        &self,
        _signed_payload: &str,
        _network: NetworkTag,
    ) -> Result<TransactionReference, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SubmitError::Rejected {
                title: "Transaction Failed".into(),
                result_codes: vec!["tx_insufficient_balance".into()],
            });
        }
        Ok(TransactionReference::new(TEST_TX_HASH))
    }
}

pub struct FakeRecorder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeRecorder {
    pub fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectRecorder for FakeRecorder {
    async fn record(
        &self,
        parameters: &LaunchParameters,
        _wallet_address: &str,
        reference: &TransactionReference,
    ) -> Result<ProjectRecord, RecordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RecordError::Validation {
                status: 500,
                error: Some("Internal server error".into()),
                details: vec![],
            });
        }
        Ok(ProjectRecord {
            id: Some("project-1".into()),
            name: parameters.name.clone(),
            symbol: Some(parameters.symbol.clone()),
            tx_hash: Some(reference.as_str().to_string()),
            extra: Default::default(),
        })
    }
}

/// 记录所有被失效的键
#[derive(Default)]
pub struct RecordingCache {
    pub keys: Mutex<Vec<CacheKey>>,
}

impl RecordingCache {
    pub async fn invalidated(&self) -> Vec<CacheKey> {
        self.keys.lock().await.clone()
    }
}

#[async_trait]
impl CacheInvalidator for RecordingCache {
    async fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.keys.lock().await.push(key.clone());
        Ok(())
    }
}

/// 一套完整的向导与其协作者
pub struct Harness {
    pub wizard: Arc<WizardController>,
    pub wallet: Arc<WalletSession>,
    pub extension: Arc<FakeExtension>,
    pub submitter: Arc<FakeSubmitter>,
    pub recorder: Arc<FakeRecorder>,
    pub cache: Arc<RecordingCache>,
}

pub struct HarnessOptions {
    pub sign: SignBehavior,
    pub submit_fails: bool,
    pub record_fails: bool,
    pub connect: bool,
    pub user_id: Option<String>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            sign: SignBehavior::Approve,
            submit_fails: false,
            record_fails: false,
            connect: true,
            user_id: Some("user-42".into()),
        }
    }
}

pub async fn harness(options: HarnessOptions) -> Harness {
    let extension = FakeExtension::new(options.sign);
    let submitter = FakeSubmitter::new(options.submit_fails);
    let recorder = FakeRecorder::new(options.record_fails);
    let cache = Arc::new(RecordingCache::default());

    let wallet = Arc::new(WalletSession::new(extension.clone()));
    if options.connect {
        wallet.connect().await.expect("fake wallet connects");
    }

    let lifecycle = Arc::new(LaunchLifecycle::new(
        Arc::new(EnvelopeTransactionBuilder::new()),
        submitter.clone(),
        recorder.clone(),
    ));
    let reconciler = Arc::new(ResultReconciler::new(
        cache.clone(),
        NetworkConfig::default(),
    ));
    let wizard = Arc::new(WizardController::open(
        lifecycle,
        wallet.clone(),
        reconciler,
        options.user_id,
    ));

    Harness {
        wizard,
        wallet,
        extension,
        submitter,
        recorder,
        cache,
    }
}
