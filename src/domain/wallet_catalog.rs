//! 钱包目录
//! 单一活动连接：目前只有 Freighter 可用，其余钱包仅展示

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletOption {
    pub id: &'static str,
    pub name: &'static str,
    pub available: bool,
}

pub const WALLET_CATALOG: &[WalletOption] = &[
    WalletOption {
        id: "freighter",
        name: "Freighter",
        available: true,
    },
    WalletOption {
        id: "albedo",
        name: "Albedo",
        available: false,
    },
    WalletOption {
        id: "xbull",
        name: "xBull",
        available: false,
    },
    WalletOption {
        id: "lobstr",
        name: "LOBSTR",
        available: false,
    },
    WalletOption {
        id: "rabet",
        name: "Rabet",
        available: false,
    },
    WalletOption {
        id: "hana",
        name: "Hana Wallet",
        available: false,
    },
];

pub fn find_wallet(id: &str) -> Option<&'static WalletOption> {
    WALLET_CATALOG.iter().find(|w| w.id.eq_ignore_ascii_case(id))
}

pub fn available_wallets() -> impl Iterator<Item = &'static WalletOption> {
    WALLET_CATALOG.iter().filter(|w| w.available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_freighter_available() {
        let ids: Vec<_> = available_wallets().map(|w| w.id).collect();
        assert_eq!(ids, vec!["freighter"]);
        assert!(!find_wallet("xbull").unwrap().available);
        assert!(find_wallet("unknown").is_none());
    }
}
