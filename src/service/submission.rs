//! 交易广播
//!
//! 接收已签名载荷，返回交易哈希。不做任何自动重试：上一次尝试可能已经上链。

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::NetworkConfig,
    domain::{NetworkTag, TransactionReference},
    error::SubmitError,
};

#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(
        &self,
        signed_payload: &str,
        network: NetworkTag,
    ) -> Result<TransactionReference, SubmitError>;
}

#[derive(Debug, Deserialize)]
struct HorizonSuccess {
    hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonProblem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<HorizonExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonExtras {
    #[serde(default)]
    result_codes: Option<HorizonResultCodes>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Vec<String>,
}

impl HorizonProblem {
    fn into_error(self, status: u16) -> SubmitError {
        let title = self
            .title
            .or(self.detail)
            .unwrap_or_else(|| format!("HTTP {}", status));
        let result_codes = self
            .extras
            .and_then(|e| e.result_codes)
            .map(|c| c.transaction.into_iter().chain(c.operations).collect())
            .unwrap_or_default();
        SubmitError::Rejected {
            title,
            result_codes,
        }
    }
}

/// Horizon 风格的广播客户端：`POST {horizon}/transactions`，表单字段 `tx`
pub struct HorizonSubmitter {
    http_client: reqwest::Client,
    endpoints: HashMap<NetworkTag, String>,
}

impl HorizonSubmitter {
    /// 只设连接超时：广播由网络节奏决定，不与外部参与方赛跑
    pub fn new(config: &NetworkConfig) -> Result<Self, SubmitError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        let endpoints = [NetworkTag::Testnet, NetworkTag::Public]
            .into_iter()
            .map(|n| (n, config.horizon_url(n).trim_end_matches('/').to_string()))
            .collect();

        Ok(Self {
            http_client,
            endpoints,
        })
    }

    fn endpoint(&self, network: NetworkTag) -> Result<String, SubmitError> {
        self.endpoints
            .get(&network)
            .map(|base| format!("{}/transactions", base))
            .ok_or_else(|| SubmitError::InvalidResponse(format!("no endpoint for {}", network)))
    }
}

#[async_trait]
impl TransactionSubmitter for HorizonSubmitter {
    async fn submit(
        &self,
        signed_payload: &str,
        network: NetworkTag,
    ) -> Result<TransactionReference, SubmitError> {
        let url = self.endpoint(network)?;
        tracing::debug!(network = %network, endpoint = %url, "Broadcasting signed transaction");

        let response = self
            .http_client
            .post(&url)
            .form(&[("tx", signed_payload)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let ok: HorizonSuccess = serde_json::from_str(&body)
                .map_err(|e| SubmitError::InvalidResponse(format!("missing hash: {}", e)))?;
            return Ok(TransactionReference::new(ok.hash));
        }

        let problem: HorizonProblem = serde_json::from_str(&body).unwrap_or_default();
        let err = problem.into_error(status.as_u16());
        tracing::warn!(network = %network, status = status.as_u16(), error = %err, "Broadcast rejected");
        Err(err)
    }
}
