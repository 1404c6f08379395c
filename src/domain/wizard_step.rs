//! 向导步骤与阶段

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// 字段键 -> 提示文案。软警告，从不阻塞步骤转换
pub type DiagnosticsMap = BTreeMap<String, String>;

/// 向导步骤：严格有序，不可跳步
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    BasicInfo,
    Tokenomics,
    LaunchConfig,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::Tokenomics => 2,
            Self::LaunchConfig => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::BasicInfo),
            2 => Some(Self::Tokenomics),
            3 => Some(Self::LaunchConfig),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Tokenomics => "Tokenomics",
            Self::LaunchConfig => "Launch Config",
        }
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number(), self.title())
    }
}

/// 向导整体阶段 = 步骤 ∪ {Submitting, Closed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "phase", content = "step")]
pub enum WizardPhase {
    Editing(WizardStep),
    Submitting,
    Closed,
}

impl WizardPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing(_) => "editing",
            Self::Submitting => "submitting",
            Self::Closed => "closed",
        }
    }
}
