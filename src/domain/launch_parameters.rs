//! 发行参数领域模型
//!
//! 向导打开时以默认值创建，按字段编辑，提交时只读消费一次。
//! 百分比字段在编辑时钳制到 [0,100]，校验器只会看到已钳制的整数。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 尚未部署的代币地址占位符（构建交易时使用）
pub const PLACEHOLDER_TOKEN_ADDRESS: &str =
    "GBGTK4RQSA3XRJLOW7MX3FJBFPXZVFZLZXUK2WVQXG3DFI5NBVSAMPLE";

pub const DEFAULT_DECIMALS: u32 = 7;
pub const DEFAULT_MINIMUM_LIQUIDITY: &str = "500";
pub const DEFAULT_VESTING_PERIOD_DAYS: u32 = 180;
pub const DEFAULT_PARTICIPATION_PERIOD_DAYS: u32 = 7;

/// 参与期推荐区间（天）
pub const PARTICIPATION_PERIOD_RANGE: std::ops::RangeInclusive<u32> = 3..=15;

/// 代币发行参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchParameters {
    pub name: String,
    pub symbol: String,
    pub total_supply: String,
    pub decimals: u32,
    pub description: String,

    pub twitter_url: String,
    pub telegram_url: String,
    pub website_url: String,

    pub airdrop_percent: u8,
    pub creator_percent: u8,
    pub liquidity_percent: u8,

    /// 最低流动性（十进制字符串，单位为网络原生币）
    pub minimum_liquidity: String,
    pub has_vesting: bool,
    pub vesting_period_days: u32,
    pub participation_period_days: u32,
}

impl Default for LaunchParameters {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            total_supply: String::new(),
            decimals: DEFAULT_DECIMALS,
            description: String::new(),
            twitter_url: String::new(),
            telegram_url: String::new(),
            website_url: String::new(),
            airdrop_percent: 40,
            creator_percent: 30,
            liquidity_percent: 30,
            minimum_liquidity: DEFAULT_MINIMUM_LIQUIDITY.to_string(),
            has_vesting: false,
            vesting_period_days: DEFAULT_VESTING_PERIOD_DAYS,
            participation_period_days: DEFAULT_PARTICIPATION_PERIOD_DAYS,
        }
    }
}

/// 可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchField {
    Name,
    Symbol,
    TotalSupply,
    Decimals,
    Description,
    TwitterUrl,
    TelegramUrl,
    WebsiteUrl,
    AirdropPercent,
    CreatorPercent,
    LiquidityPercent,
    MinimumLiquidity,
    HasVesting,
    VestingPeriodDays,
    ParticipationPeriodDays,
}

impl LaunchField {
    pub const ALL: [LaunchField; 15] = [
        Self::Name,
        Self::Symbol,
        Self::TotalSupply,
        Self::Decimals,
        Self::Description,
        Self::TwitterUrl,
        Self::TelegramUrl,
        Self::WebsiteUrl,
        Self::AirdropPercent,
        Self::CreatorPercent,
        Self::LiquidityPercent,
        Self::MinimumLiquidity,
        Self::HasVesting,
        Self::VestingPeriodDays,
        Self::ParticipationPeriodDays,
    ];

    /// 宿主 UI 使用的字段键（同时作为诊断键）
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::TotalSupply => "totalSupply",
            Self::Decimals => "decimals",
            Self::Description => "description",
            Self::TwitterUrl => "twitterUrl",
            Self::TelegramUrl => "telegramUrl",
            Self::WebsiteUrl => "websiteUrl",
            Self::AirdropPercent => "airdropPercent",
            Self::CreatorPercent => "creatorPercent",
            Self::LiquidityPercent => "liquidityPercent",
            Self::MinimumLiquidity => "minimumLiquidity",
            Self::HasVesting => "hasVesting",
            Self::VestingPeriodDays => "vestingPeriodDays",
            Self::ParticipationPeriodDays => "participationPeriodDays",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            Self::AirdropPercent | Self::CreatorPercent | Self::LiquidityPercent
        )
    }
}

impl fmt::Display for LaunchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 宿主传入的字段值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    fn as_text(&self) -> String {
        match self {
            Self::Flag(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => parse_leading_integer(s),
            Self::Flag(_) => None,
        }
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Integer(n) => Some(*n != 0),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Some(true),
                "false" | "0" | "off" | "no" | "" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// 解析前导整数：允许首尾空白和可选符号，忽略第一个非数字字符之后的内容（"12abc" -> 12）
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // 超出 i64 的数值按饱和处理，后续钳制会把它压回合法区间
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign.saturating_mul(value))
}

/// 百分比钳制：非数字视为 0
pub fn clamp_percent(value: &FieldValue) -> u8 {
    let n = value.as_integer().unwrap_or(0);
    n.clamp(0, 100) as u8
}

impl LaunchParameters {
    /// 按字段应用一次编辑。不做有效性门控，判断留给诊断。
    pub fn apply(&mut self, field: LaunchField, value: &FieldValue) {
        match field {
            LaunchField::Name => self.name = value.as_text(),
            LaunchField::Symbol => self.symbol = value.as_text().to_uppercase(),
            LaunchField::TotalSupply => self.total_supply = value.as_text(),
            LaunchField::Decimals => {
                if let Some(n) = value.as_integer() {
                    self.decimals = n.clamp(0, u32::MAX as i64) as u32;
                }
            }
            LaunchField::Description => self.description = value.as_text(),
            LaunchField::TwitterUrl => self.twitter_url = value.as_text(),
            LaunchField::TelegramUrl => self.telegram_url = value.as_text(),
            LaunchField::WebsiteUrl => self.website_url = value.as_text(),
            LaunchField::AirdropPercent => self.airdrop_percent = clamp_percent(value),
            LaunchField::CreatorPercent => self.creator_percent = clamp_percent(value),
            LaunchField::LiquidityPercent => self.liquidity_percent = clamp_percent(value),
            LaunchField::MinimumLiquidity => self.minimum_liquidity = value.as_text(),
            LaunchField::HasVesting => {
                if let Some(b) = value.as_flag() {
                    self.has_vesting = b;
                }
            }
            LaunchField::VestingPeriodDays => {
                if let Some(n) = value.as_integer() {
                    self.vesting_period_days = n.clamp(1, u32::MAX as i64) as u32;
                }
            }
            LaunchField::ParticipationPeriodDays => {
                self.participation_period_days = value
                    .as_integer()
                    .filter(|n| *n != 0)
                    .map(|n| n.clamp(0, u32::MAX as i64) as u32)
                    .unwrap_or(DEFAULT_PARTICIPATION_PERIOD_DAYS);
            }
        }
    }

    /// 三项分配之和（宿主显示的合计徽标）
    pub fn allocation_total(&self) -> u32 {
        self.airdrop_percent as u32 + self.creator_percent as u32 + self.liquidity_percent as u32
    }

    pub fn is_allocation_balanced(&self) -> bool {
        self.allocation_total() == 100
    }

    /// 仅在开启归属时有意义
    pub fn effective_vesting_period_days(&self) -> Option<u32> {
        self.has_vesting.then_some(self.vesting_period_days)
    }

    pub fn participation_in_recommended_range(&self) -> bool {
        PARTICIPATION_PERIOD_RANGE.contains(&self.participation_period_days)
    }
}
