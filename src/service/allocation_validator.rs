//! 分配校验器
//!
//! 纯函数：`(step, parameters) -> DiagnosticsMap`，无副作用、确定性。
//! 只产生软警告，永不阻塞向导。百分比钳制发生在编辑时，这里不再处理。

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{DiagnosticsMap, LaunchField, LaunchParameters, WizardStep};

/// 推荐的最低流动性（网络原生币）
pub const MINIMUM_LIQUIDITY_THRESHOLD: i64 = 500;

pub const ALLOCATION_KEY: &str = "allocation";

pub const WARN_NAME: &str = "Token name is recommended";
pub const WARN_SYMBOL: &str = "Symbol is recommended";
pub const WARN_TOTAL_SUPPLY: &str = "Valid total supply is recommended";
pub const WARN_DESCRIPTION: &str = "Description is recommended";
pub const WARN_ALLOCATION: &str = "Total allocation should equal 100%";
pub const WARN_MINIMUM_LIQUIDITY: &str = "Minimum 500 XLM is recommended";

/// `Decimal` 能表示的最大整数位数
const DECIMAL_MAX_INTEGER_DIGITS: usize = 28;

/// 科学计数法展开时允许的最大指数
const MAX_EXPONENT: i64 = 96;

/// 超出 `Decimal` 范围时的纯数字表示
#[derive(Debug, PartialEq, Eq)]
struct PlainAmount {
    negative: bool,
    /// 去掉前导零
    integer: String,
    /// 去掉末尾零
    fraction: String,
}

impl PlainAmount {
    fn parse(s: &str) -> Option<Self> {
        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(i) => (&s[..i], s[i + 1..].parse::<i64>().ok()?),
            None => (s, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return None;
        }

        let (negative, unsigned) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        // 移动小数点
        let digits = format!("{}{}", int_part, frac_part);
        let point = int_part.len() as i64 + exponent;
        let (integer, fraction) = if point <= 0 {
            (String::new(), format!("{}{}", "0".repeat((-point) as usize), digits))
        } else if point as usize >= digits.len() {
            (
                format!("{}{}", digits, "0".repeat(point as usize - digits.len())),
                String::new(),
            )
        } else {
            let (i, f) = digits.split_at(point as usize);
            (i.to_string(), f.to_string())
        };

        Some(Self {
            negative,
            integer: integer.trim_start_matches('0').to_string(),
            fraction: fraction.trim_end_matches('0').to_string(),
        })
    }

    fn exceeds_decimal(&self) -> bool {
        self.integer.len() > DECIMAL_MAX_INTEGER_DIGITS
    }

    fn to_canonical(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        if self.fraction.is_empty() {
            format!("{}{}", sign, self.integer)
        } else {
            format!("{}{}.{}", sign, self.integer, self.fraction)
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// 解析十进制字符串；空串或非法格式视为缺失。
/// 超出 `Decimal` 范围的合法数值饱和到 `Decimal::MAX` / `Decimal::MIN`，只用于比较。
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_decimal(s).or_else(|| {
        PlainAmount::parse(s)
            .filter(PlainAmount::exceeds_decimal)
            .map(|a| if a.negative { Decimal::MIN } else { Decimal::MAX })
    })
}

/// 金额的规范字符串（去掉多余的零）；超出 `Decimal` 范围时保留全部数字
pub fn normalize_amount(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    match parse_decimal(s) {
        Some(d) => Some(d.normalize().to_string()),
        None => PlainAmount::parse(s)
            .filter(PlainAmount::exceeds_decimal)
            .map(|a| a.to_canonical()),
    }
}

/// 计算指定步骤的诊断
pub fn validate(step: WizardStep, params: &LaunchParameters) -> DiagnosticsMap {
    let mut diagnostics = DiagnosticsMap::new();
    let mut warn = |key: &str, message: &str| {
        diagnostics.insert(key.to_string(), message.to_string());
    };

    match step {
        WizardStep::BasicInfo => {
            if params.name.trim().is_empty() {
                warn(LaunchField::Name.key(), WARN_NAME);
            }
            if params.symbol.trim().is_empty() {
                warn(LaunchField::Symbol.key(), WARN_SYMBOL);
            }
            match parse_amount(&params.total_supply) {
                Some(supply) if supply > Decimal::ZERO => {}
                _ => warn(LaunchField::TotalSupply.key(), WARN_TOTAL_SUPPLY),
            }
            if params.description.trim().is_empty() {
                warn(LaunchField::Description.key(), WARN_DESCRIPTION);
            }
        }
        WizardStep::Tokenomics => {
            // 精确整数相等，无容差
            if params.allocation_total() != 100 {
                warn(ALLOCATION_KEY, WARN_ALLOCATION);
            }
        }
        WizardStep::LaunchConfig => match parse_amount(&params.minimum_liquidity) {
            Some(amount) if amount >= Decimal::from(MINIMUM_LIQUIDITY_THRESHOLD) => {}
            _ => warn(LaunchField::MinimumLiquidity.key(), WARN_MINIMUM_LIQUIDITY),
        },
    }

    diagnostics
}
