//! 发行交易构建器
//!
//! (创建者地址, 发行参数, 网络) -> 未签名交易载荷。纯函数，失败只可能是参数形状问题。
//! 默认实现输出确定性的 base64 JSON 信封；签名在钱包扩展中完成。

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    domain::{LaunchParameters, NetworkTag, PLACEHOLDER_TOKEN_ADDRESS},
    error::BuildError,
    service::allocation_validator,
};

pub const CREATE_PROJECT_OPERATION: &str = "create_project";
const ENVELOPE_VERSION: u8 = 1;

/// 合约调用参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectArgs {
    pub name: String,
    pub symbol: String,
    pub token_address: String,
    pub total_supply: String,
    pub airdrop_percent: u8,
    pub creator_percent: u8,
    pub liquidity_percent: u8,
    pub minimum_liquidity: String,
    pub participation_period_days: u32,
    pub has_vesting: bool,
    pub vesting_period_days: u32,
}

impl CreateProjectArgs {
    /// 代币尚未部署，使用固定占位地址
    pub fn from_parameters(params: &LaunchParameters) -> Self {
        Self {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            token_address: PLACEHOLDER_TOKEN_ADDRESS.to_string(),
            total_supply: params.total_supply.clone(),
            airdrop_percent: params.airdrop_percent,
            creator_percent: params.creator_percent,
            liquidity_percent: params.liquidity_percent,
            minimum_liquidity: params.minimum_liquidity.clone(),
            participation_period_days: params.participation_period_days,
            has_vesting: params.has_vesting,
            vesting_period_days: params.vesting_period_days,
        }
    }
}

/// 未签名交易
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// 交给钱包签名的载荷
    pub payload: String,
    /// 载荷 SHA-256 指纹（日志关联用）
    pub fingerprint: String,
    pub network: NetworkTag,
}

pub trait LaunchTransactionBuilder: Send + Sync {
    fn build(
        &self,
        creator: &str,
        args: &CreateProjectArgs,
        network: NetworkTag,
    ) -> Result<UnsignedTransaction, BuildError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    version: u8,
    source: &'a str,
    network_passphrase: &'a str,
    operation: &'a str,
    args: &'a CreateProjectArgs,
}

/// 默认构建器：规范化数值后编码为信封
#[derive(Debug, Default, Clone)]
pub struct EnvelopeTransactionBuilder;

impl EnvelopeTransactionBuilder {
    pub fn new() -> Self {
        Self
    }

    fn normalize_amount(field: &'static str, raw: &str) -> Result<String, BuildError> {
        allocation_validator::normalize_amount(raw).ok_or_else(|| BuildError::InvalidField {
                field,
                reason: format!("{:?} is not a decimal number", raw),
            })
    }

    /// 解码信封（测试与调试用）
    pub fn decode_args(payload: &str) -> Result<CreateProjectArgs, BuildError> {
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| BuildError::Encoding(e.to_string()))?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| BuildError::Encoding(e.to_string()))?;
        serde_json::from_value(value["args"].clone()).map_err(|e| BuildError::Encoding(e.to_string()))
    }
}

impl LaunchTransactionBuilder for EnvelopeTransactionBuilder {
    fn build(
        &self,
        creator: &str,
        args: &CreateProjectArgs,
        network: NetworkTag,
    ) -> Result<UnsignedTransaction, BuildError> {
        if creator.trim().is_empty() {
            return Err(BuildError::InvalidField {
                field: "creator",
                reason: "source address is empty".into(),
            });
        }

        let mut args = args.clone();
        args.total_supply = Self::normalize_amount("totalSupply", &args.total_supply)?;
        args.minimum_liquidity =
            Self::normalize_amount("minimumLiquidity", &args.minimum_liquidity)?;

        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            source: creator.trim(),
            network_passphrase: network.passphrase(),
            operation: CREATE_PROJECT_OPERATION,
            args: &args,
        };
        let bytes =
            serde_json::to_vec(&envelope).map_err(|e| BuildError::Encoding(e.to_string()))?;

        let fingerprint = hex::encode(Sha256::digest(&bytes));
        tracing::debug!(
            operation = CREATE_PROJECT_OPERATION,
            network = %network,
            fingerprint = %fingerprint,
            "Built unsigned launch transaction"
        );

        Ok(UnsignedTransaction {
            payload: STANDARD.encode(&bytes),
            fingerprint,
            network,
        })
    }
}
