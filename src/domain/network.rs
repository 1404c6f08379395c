//! 网络标识与钱包身份

use std::fmt;

use serde::{Deserialize, Serialize};

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// 支持的网络（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkTag {
    Testnet,
    Public,
}

impl NetworkTag {
    /// 签名扩展使用的网络名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testnet => "TESTNET",
            Self::Public => "PUBLIC",
        }
    }

    /// 区分测试网与主网的固定口令
    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Testnet => TESTNET_PASSPHRASE,
            Self::Public => PUBLIC_PASSPHRASE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Testnet => "Stellar Testnet",
            Self::Public => "Stellar",
        }
    }

    /// 兼容扩展返回的多种写法
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TESTNET" | "TEST" => Some(Self::Testnet),
            "PUBLIC" | "MAINNET" | "PUBNET" => Some(Self::Public),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 外部持有的钱包地址及其所在网络
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletIdentity {
    pub address: String,
    pub network: NetworkTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passphrases() {
        assert_eq!(
            NetworkTag::Testnet.passphrase(),
            "Test SDF Network ; September 2015"
        );
        assert_eq!(
            NetworkTag::Public.passphrase(),
            "Public Global Stellar Network ; September 2015"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(NetworkTag::parse("testnet"), Some(NetworkTag::Testnet));
        assert_eq!(NetworkTag::parse("MAINNET"), Some(NetworkTag::Public));
        assert_eq!(NetworkTag::parse("FUTURENET"), None);
    }
}
