//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::NetworkTag;

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 网络配置（广播端点与浏览器链接）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub testnet_horizon_url: String,
    pub public_horizon_url: String,
    pub testnet_explorer_url: String,
    pub public_explorer_url: String,
    /// 广播请求的连接超时。整体请求不设超时：广播由网络节奏决定
    pub connect_timeout_secs: u64,
}

/// 后台记录服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub redis_url: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            testnet_horizon_url: env_or(
                "TESTNET_HORIZON_URL",
                "https://horizon-testnet.stellar.org",
            ),
            public_horizon_url: env_or("PUBLIC_HORIZON_URL", "https://horizon.stellar.org"),
            testnet_explorer_url: env_or(
                "TESTNET_EXPLORER_URL",
                "https://stellar.expert/explorer/testnet",
            ),
            public_explorer_url: env_or(
                "PUBLIC_EXPLORER_URL",
                "https://stellar.expert/explorer/public",
            ),
            connect_timeout_secs: env_parse_or("HORIZON_CONNECT_TIMEOUT_SECS", 10),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: env_or("BACKEND_API_URL", "http://localhost:5000"),
            request_timeout_secs: env_parse_or("BACKEND_TIMEOUT_SECS", 30),
            redis_url: std::env::var("REDIS_URL").ok(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env_or("LOG_LEVEL", "info"),
            format: env_or("LOG_FORMAT", "text"),
        }
    }
}

impl NetworkConfig {
    pub fn horizon_url(&self, network: NetworkTag) -> &str {
        match network {
            NetworkTag::Testnet => &self.testnet_horizon_url,
            NetworkTag::Public => &self.public_horizon_url,
        }
    }

    /// 交易在区块浏览器中的链接
    pub fn explorer_tx_url(&self, network: NetworkTag, tx_hash: &str) -> String {
        let base = match network {
            NetworkTag::Testnet => &self.testnet_explorer_url,
            NetworkTag::Public => &self.public_explorer_url,
        };
        format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// 从环境变量加载配置（先读取 .env）
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Ok(Self {
            network: NetworkConfig::default(),
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高，缺省节回退到环境变量）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let config = Self::from_env()?;

        match path {
            Some(path) if path.as_ref().exists() => Self::from_file(path),
            _ => Ok(config),
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("TESTNET_HORIZON_URL", &self.network.testnet_horizon_url),
            ("PUBLIC_HORIZON_URL", &self.network.public_horizon_url),
            ("TESTNET_EXPLORER_URL", &self.network.testnet_explorer_url),
            ("PUBLIC_EXPLORER_URL", &self.network.public_explorer_url),
            ("BACKEND_API_URL", &self.backend.api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", key);
            }
        }

        if self.network.connect_timeout_secs == 0 {
            anyhow::bail!("HORIZON_CONNECT_TIMEOUT_SECS must be greater than 0");
        }

        if self.backend.request_timeout_secs == 0 {
            anyhow::bail!("BACKEND_TIMEOUT_SECS must be greater than 0");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
