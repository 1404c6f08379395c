//! 后台项目记录
//!
//! 上链成功后，把完整发行参数和交易哈希 POST 给后台，换取规范项目记录。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::BackendConfig,
    domain::{LaunchParameters, ProjectRecord, TransactionReference},
    error::RecordError,
};

pub const CREATE_PROJECT_PATH: &str = "/api/projects/create";

/// 创建请求体：发行参数 + 钱包地址 + 交易哈希
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest<'a> {
    #[serde(flatten)]
    pub parameters: &'a LaunchParameters,
    pub wallet_address: &'a str,
    pub tx_hash: &'a str,
}

#[async_trait]
pub trait ProjectRecorder: Send + Sync {
    async fn record(
        &self,
        parameters: &LaunchParameters,
        wallet_address: &str,
        reference: &TransactionReference,
    ) -> Result<ProjectRecord, RecordError>;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_error(self, status: u16) -> RecordError {
        RecordError::Validation {
            status,
            error: self.error.or(self.message),
            details: self.details.into_iter().filter_map(|d| d.message).collect(),
        }
    }
}

/// 后台有时把记录包在这些键下
const RECORD_ENVELOPE_KEYS: [&str; 2] = ["project", "data"];

/// 任何 2xx 都表示已保存；响应体形状不符时用请求参数补齐记录
fn record_from_success_body(
    body: &str,
    parameters: &LaunchParameters,
    reference: &TransactionReference,
) -> ProjectRecord {
    let value = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    let inner = RECORD_ENVELOPE_KEYS
        .iter()
        .find_map(|key| value.get(*key).filter(|v| v.is_object()).cloned())
        .unwrap_or(value);

    let mut record = match serde_json::from_value::<ProjectRecord>(inner.clone()) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(tx_hash = %reference, error = %e, "Unrecognized project record body");
            ProjectRecord {
                id: None,
                name: String::new(),
                symbol: None,
                tx_hash: None,
                extra: inner.as_object().cloned().unwrap_or_default(),
            }
        }
    };
    if record.name.trim().is_empty() {
        record.name = parameters.name.clone();
    }
    if record.symbol.is_none() {
        record.symbol = Some(parameters.symbol.clone());
    }
    if record.tx_hash.is_none() {
        record.tx_hash = Some(reference.as_str().to_string());
    }
    record
}

pub struct HttpProjectRecorder {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpProjectRecorder {
    pub fn new(config: &BackendConfig) -> Result<Self, RecordError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http_client,
            endpoint: format!(
                "{}{}",
                config.api_base_url.trim_end_matches('/'),
                CREATE_PROJECT_PATH
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProjectRecorder for HttpProjectRecorder {
    async fn record(
        &self,
        parameters: &LaunchParameters,
        wallet_address: &str,
        reference: &TransactionReference,
    ) -> Result<ProjectRecord, RecordError> {
        let body = CreateProjectRequest {
            parameters,
            wallet_address,
            tx_hash: reference.as_str(),
        };

        let response = self.http_client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(record_from_success_body(&text, parameters, reference));
        }

        let err = serde_json::from_str::<ErrorBody>(&text)
            .unwrap_or_default()
            .into_error(status.as_u16());
        tracing::warn!(
            tx_hash = %reference,
            status = status.as_u16(),
            error = %err,
            "Backend rejected launch record"
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let params = LaunchParameters::default();
        let body = CreateProjectRequest {
            parameters: &params,
            wallet_address: "GCREATOR",
            tx_hash: "abc",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["txHash"], "abc");
        assert_eq!(json["walletAddress"], "GCREATOR");
        assert_eq!(json["liquidityPercent"], 30);
    }

    #[test]
    fn test_error_body_details() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"Validation failed","details":[{"message":"Name is required"},{"path":"x"}]}"#,
        )
        .unwrap();
        match body.into_error(400) {
            RecordError::Validation {
                status,
                error,
                details,
            } => {
                assert_eq!(status, 400);
                assert_eq!(error.as_deref(), Some("Validation failed"));
                assert_eq!(details, vec!["Name is required".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_join() {
        let config = BackendConfig {
            api_base_url: "https://api.example.org/".into(),
            request_timeout_secs: 5,
            redis_url: None,
        };
        let recorder = HttpProjectRecorder::new(&config).unwrap();
        assert_eq!(recorder.endpoint(), "https://api.example.org/api/projects/create");
    }

    fn sample_params() -> LaunchParameters {
        LaunchParameters {
            name: "Moon".into(),
            symbol: "MOON".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_body_with_numeric_id() {
        let record = record_from_success_body(
            r#"{"id":42,"name":"Moon","txHash":"abc"}"#,
            &sample_params(),
            &TransactionReference::new("abc"),
        );
        assert_eq!(record.id.as_deref(), Some("42"));
        assert_eq!(record.name, "Moon");
    }

    #[test]
    fn test_success_body_wrapped_record() {
        let record = record_from_success_body(
            r#"{"success":true,"project":{"id":"p-7","symbol":"MOON","status":"active"}}"#,
            &sample_params(),
            &TransactionReference::new("abc"),
        );
        assert_eq!(record.id.as_deref(), Some("p-7"));
        assert_eq!(record.name, "Moon");
        assert_eq!(record.tx_hash.as_deref(), Some("abc"));
        assert_eq!(record.extra["status"], "active");
    }

    #[test]
    fn test_success_body_not_json() {
        let record = record_from_success_body(
            "Created",
            &sample_params(),
            &TransactionReference::new("abc"),
        );
        assert_eq!(record.id, None);
        assert_eq!(record.name, "Moon");
        assert_eq!(record.tx_hash.as_deref(), Some("abc"));
    }
}
