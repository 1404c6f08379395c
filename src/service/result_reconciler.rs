//! 结果对账
//!
//! 成功：按约定键失效宿主的视图缓存，并通知宿主关闭向导。
//! 失败：把阶段和原因映射为一条用户可读消息，向导停留在第三步。

use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::NetworkConfig,
    domain::{LaunchParameters, LifecycleFailure, LifecycleStage, TransactionOutcome},
    error::WalletError,
    infrastructure::cache::{CacheInvalidator, CacheKey},
};

/// 给宿主展示的一条通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub title: String,
    pub description: String,
    /// 区块浏览器链接（有链上交易时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub destructive: bool,
}

/// 对账结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// 宿主应关闭向导
    Close {
        notice: UserNotice,
        invalidated: Vec<CacheKey>,
    },
    /// 向导保持在第三步，可修正后再次提交
    Retain {
        stage: LifecycleStage,
        notice: UserNotice,
    },
}

impl Reconciliation {
    pub fn notice(&self) -> &UserNotice {
        match self {
            Self::Close { notice, .. } | Self::Retain { notice, .. } => notice,
        }
    }
}

pub struct ResultReconciler {
    cache: Arc<dyn CacheInvalidator>,
    network: NetworkConfig,
}

impl ResultReconciler {
    pub fn new(cache: Arc<dyn CacheInvalidator>, network: NetworkConfig) -> Self {
        Self { cache, network }
    }

    /// 成功后需要失效的键
    pub fn invalidation_keys(user_id: Option<&str>) -> Vec<CacheKey> {
        let mut keys = vec![CacheKey::AllProjects];
        if let Some(id) = user_id.filter(|id| !id.is_empty()) {
            keys.push(CacheKey::UserProjects(id.to_string()));
        }
        keys.push(CacheKey::GlobalStats);
        keys
    }

    pub async fn reconcile(
        &self,
        outcome: &TransactionOutcome,
        params: &LaunchParameters,
        user_id: Option<&str>,
    ) -> Reconciliation {
        match outcome {
            TransactionOutcome::Confirmed {
                reference,
                network,
                record,
            } => {
                let keys = Self::invalidation_keys(user_id);
                for key in &keys {
                    // 失效失败不影响已确认的结果
                    if let Err(e) = self.cache.invalidate(key).await {
                        tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
                    }
                }

                let name = if record.name.trim().is_empty() {
                    params.name.as_str()
                } else {
                    record.name.as_str()
                };
                Reconciliation::Close {
                    notice: UserNotice {
                        title: "Token Launched Successfully!".to_string(),
                        description: format!("{} is now live on {}", name, network.display_name()),
                        link: Some(self.network.explorer_tx_url(*network, reference.as_str())),
                        destructive: false,
                    },
                    invalidated: keys,
                }
            }
            TransactionOutcome::Failed(failure) => Reconciliation::Retain {
                stage: failure.stage(),
                notice: self.failure_notice(failure),
            },
        }
    }

    /// 每种失败恰好一条消息
    pub fn failure_notice(&self, failure: &LifecycleFailure) -> UserNotice {
        match failure {
            LifecycleFailure::Build { cause } => UserNotice {
                title: "Launch Failed".to_string(),
                description: format!(
                    "Could not prepare the launch transaction: {}",
                    cause.user_message()
                ),
                link: None,
                destructive: true,
            },
            LifecycleFailure::Sign { cause } => {
                let description = if cause.code == WalletError::UserRejected.code() {
                    "The signature request was rejected in your wallet. Nothing was submitted; you can launch again.".to_string()
                } else {
                    format!("Your wallet could not sign the transaction: {}", cause.user_message())
                };
                UserNotice {
                    title: "Signature Rejected".to_string(),
                    description,
                    link: None,
                    destructive: true,
                }
            }
            LifecycleFailure::Submit { cause } => UserNotice {
                title: "Launch Failed".to_string(),
                description: format!(
                    "The network did not accept the transaction: {}",
                    cause.user_message()
                ),
                link: None,
                destructive: true,
            },
            // 交易已上链，不能提示为普通失败，也不能引导用户重新发行
            LifecycleFailure::Record {
                reference,
                network,
                cause,
            } => UserNotice {
                title: "Launch Submitted, Record Not Saved".to_string(),
                description: format!(
                    "Transaction {} was submitted to {} and has likely succeeded on-chain, \
                     but saving the project record failed: {}. Do not launch again; keep this \
                     transaction reference for support.",
                    reference,
                    network.display_name(),
                    cause.user_message()
                ),
                link: Some(self.network.explorer_tx_url(*network, reference.as_str())),
                destructive: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorDescriptor, NetworkTag, ProjectRecord, TransactionReference};
    use crate::infrastructure::cache::QueryCache;

    fn reconciler() -> ResultReconciler {
        ResultReconciler::new(Arc::new(QueryCache::new()), NetworkConfig::default())
    }

    #[test]
    fn test_invalidation_keys() {
        assert_eq!(
            ResultReconciler::invalidation_keys(None),
            vec![CacheKey::AllProjects, CacheKey::GlobalStats]
        );
        assert_eq!(
            ResultReconciler::invalidation_keys(Some("u1")),
            vec![
                CacheKey::AllProjects,
                CacheKey::UserProjects("u1".into()),
                CacheKey::GlobalStats
            ]
        );
        assert_eq!(ResultReconciler::invalidation_keys(Some("")).len(), 2);
    }

    #[test]
    fn test_confirmed_clears_cached_views() {
        let cache = Arc::new(QueryCache::new());
        let reconciler = ResultReconciler::new(cache.clone(), NetworkConfig::default());
        let params = LaunchParameters {
            name: "Orbit".into(),
            ..Default::default()
        };
        let outcome = TransactionOutcome::Confirmed {
            reference: TransactionReference::new("abc123"),
            network: NetworkTag::Public,
            record: ProjectRecord {
                id: None,
                name: String::new(),
                symbol: None,
                tx_hash: None,
                extra: Default::default(),
            },
        };

        tokio_test::block_on(async {
            cache.put(CacheKey::AllProjects.segments(), serde_json::json!([])).await;
            cache
                .put(
                    CacheKey::UserProjects("u1".into()).segments(),
                    serde_json::json!([]),
                )
                .await;
            cache.put(vec!["/api/other".into()], serde_json::json!({})).await;

            let result = reconciler.reconcile(&outcome, &params, Some("u1")).await;
            match result {
                Reconciliation::Close {
                    notice,
                    invalidated,
                } => {
                    assert_eq!(invalidated.len(), 3);
                    assert_eq!(notice.description, "Orbit is now live on Stellar");
                }
                other => panic!("unexpected reconciliation: {:?}", other),
            }
            assert_eq!(cache.len().await, 1);
        });
    }

    #[test]
    fn test_record_failure_discloses_reference() {
        let notice = reconciler().failure_notice(&LifecycleFailure::Record {
            reference: TransactionReference::new("deadbeef"),
            network: NetworkTag::Testnet,
            cause: ErrorDescriptor::new("http_500", "Internal error"),
        });
        assert!(notice.description.contains("deadbeef"));
        assert!(notice.description.contains("on-chain"));
        assert!(!notice.description.contains("Failed to create project"));
        assert!(notice.link.unwrap().ends_with("/tx/deadbeef"));
    }

    #[test]
    fn test_sign_rejection_message() {
        let notice = reconciler().failure_notice(&LifecycleFailure::Sign {
            cause: ErrorDescriptor::from(&WalletError::UserRejected),
        });
        assert!(notice.description.contains("rejected"));
        assert!(notice.link.is_none());
    }

    #[test]
    fn test_submit_message_is_verbatim() {
        let notice = reconciler().failure_notice(&LifecycleFailure::Submit {
            cause: ErrorDescriptor::new("tx_rejected", "Transaction Failed")
                .with_details(vec!["tx_insufficient_balance".into()]),
        });
        assert!(notice.description.ends_with("tx_insufficient_balance"));
    }
}
