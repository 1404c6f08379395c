//! 钱包会话
//!
//! 维护唯一的外部签名器连接：连接、查询地址与网络、签名。
//! 会话可在多个向导实例间共享（`Arc<WalletSession>`），签名请求在会话内串行化。
//! 签名可能因等待扩展弹窗而无限期挂起，本层不设超时；取消由丢弃 future 完成。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::{
    domain::{wallet_catalog, NetworkTag, WalletIdentity, WalletOption},
    error::WalletError,
};

/// 传给扩展的签名选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    pub network: String,
    pub network_passphrase: String,
}

impl SignOptions {
    pub fn for_network(network: NetworkTag) -> Self {
        Self {
            network: network.as_str().to_string(),
            network_passphrase: network.passphrase().to_string(),
        }
    }
}

/// 签名扩展契约（浏览器钱包扩展或其桥接实现）
#[async_trait]
pub trait SignerExtension: Send + Sync {
    /// 扩展未安装时返回 `WalletError::NotInstalled`
    async fn is_connected(&self) -> Result<bool, WalletError>;

    async fn request_access(&self) -> Result<(), WalletError>;

    async fn get_address(&self) -> Result<String, WalletError>;

    async fn get_network(&self) -> Result<NetworkTag, WalletError>;

    async fn sign(&self, payload: &str, options: &SignOptions) -> Result<String, WalletError>;
}

pub struct WalletSession {
    extension: Arc<dyn SignerExtension>,
    wallet: &'static WalletOption,
    identity: RwLock<Option<WalletIdentity>>,
    sign_lock: Mutex<()>,
}

impl WalletSession {
    /// 使用目录中第一个可用钱包
    pub fn new(extension: Arc<dyn SignerExtension>) -> Self {
        let wallet = wallet_catalog::available_wallets()
            .next()
            .unwrap_or(&wallet_catalog::WALLET_CATALOG[0]);
        Self::with_wallet(extension, wallet)
    }

    /// 按目录 id 选择钱包；不可用或未知的钱包被拒绝
    pub fn select(wallet_id: &str, extension: Arc<dyn SignerExtension>) -> Result<Self, WalletError> {
        match wallet_catalog::find_wallet(wallet_id) {
            Some(wallet) if wallet.available => Ok(Self::with_wallet(extension, wallet)),
            Some(wallet) => Err(WalletError::Unavailable(format!(
                "{} is not available yet",
                wallet.name
            ))),
            None => Err(WalletError::Unavailable(format!(
                "unknown wallet: {}",
                wallet_id
            ))),
        }
    }

    fn with_wallet(extension: Arc<dyn SignerExtension>, wallet: &'static WalletOption) -> Self {
        Self {
            extension,
            wallet,
            identity: RwLock::new(None),
            sign_lock: Mutex::new(()),
        }
    }

    pub fn wallet(&self) -> &'static WalletOption {
        self.wallet
    }

    /// 连接钱包：未授权时先请求访问，再读取地址与网络
    pub async fn connect(&self) -> Result<WalletIdentity, WalletError> {
        let connected = self.extension.is_connected().await?;
        if !connected {
            tracing::info!(wallet = self.wallet.id, "Requesting wallet access");
            self.extension.request_access().await?;
        }

        let address = self.extension.get_address().await?;
        if address.trim().is_empty() {
            return Err(WalletError::Unavailable("wallet returned an empty address".into()));
        }
        let network = self.extension.get_network().await?;

        let identity = WalletIdentity { address, network };
        tracing::info!(
            wallet = self.wallet.id,
            address = %identity.address,
            network = %identity.network,
            "Wallet connected"
        );
        *self.identity.write().await = Some(identity.clone());
        Ok(identity)
    }

    /// 本会话内已连接的身份
    pub async fn identity(&self) -> Option<WalletIdentity> {
        self.identity.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.identity.read().await.is_some()
    }

    pub async fn disconnect(&self) {
        *self.identity.write().await = None;
    }

    /// 查询扩展当前所在网络（用户可能在扩展里切换过）
    pub async fn current_network(&self) -> Result<NetworkTag, WalletError> {
        let network = self.extension.get_network().await?;
        if let Some(identity) = self.identity.write().await.as_mut() {
            if identity.network != network {
                tracing::info!(from = %identity.network, to = %network, "Wallet network changed");
                identity.network = network;
            }
        }
        Ok(network)
    }

    /// 请求签名。同一会话内一次只弹出一个签名请求
    pub async fn sign(
        &self,
        unsigned_payload: &str,
        network: NetworkTag,
    ) -> Result<String, WalletError> {
        if !self.is_connected().await {
            return Err(WalletError::NotConnected);
        }

        let _guard = self.sign_lock.lock().await;
        let options = SignOptions::for_network(network);
        tracing::debug!(wallet = self.wallet.id, network = %network, "Awaiting wallet signature");

        let signed = self.extension.sign(unsigned_payload, &options).await?;
        if signed.is_empty() {
            return Err(WalletError::Unavailable("wallet returned an empty signature".into()));
        }
        Ok(signed)
    }
}
