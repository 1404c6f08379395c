//! 发行交易生命周期状态
//! 每次提交尝试一个实例：Building -> Signing -> Submitting -> Recording -> Confirmed，
//! 前四个状态任一都可进入吸收态 Failed(stage)

use std::fmt;

use serde::{Deserialize, Serialize};

/// 失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    Build,
    Sign,
    Submit,
    Record,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Sign => "sign",
            Self::Submit => "submit",
            Self::Record => "record",
        }
    }

    /// 该阶段失败时链上是否可能已有副作用
    pub fn may_have_landed(&self) -> bool {
        matches!(self, Self::Record)
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生命周期状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "stage")]
pub enum LifecycleState {
    /// 构建未签名交易
    Building,

    /// 等待钱包签名（可能无限期挂起）
    Signing,

    /// 已签名，正在广播
    Submitting,

    /// 已上链，正在写后台记录
    Recording,

    /// 终态：成功
    Confirmed,

    /// 终态：失败
    Failed(LifecycleStage),
}

impl LifecycleState {
    /// 当前状态对应的阶段；终态没有阶段
    pub fn stage(&self) -> Option<LifecycleStage> {
        match self {
            Self::Building => Some(LifecycleStage::Build),
            Self::Signing => Some(LifecycleStage::Sign),
            Self::Submitting => Some(LifecycleStage::Submit),
            Self::Recording => Some(LifecycleStage::Record),
            Self::Confirmed | Self::Failed(_) => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed(_))
    }

    /// 验证状态转换合法性
    pub fn can_transition_to(&self, target: &Self) -> bool {
        use LifecycleState::*;

        match (self, target) {
            (Building, Signing) | (Signing, Submitting) | (Submitting, Recording) => true,
            (Recording, Confirmed) => true,

            // 只能以当前阶段的名义失败
            (from, Failed(stage)) if !from.is_final() => from.stage() == Some(*stage),

            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Signing => "signing",
            Self::Submitting => "submitting",
            Self::Recording => "recording",
            Self::Confirmed => "confirmed",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(stage) => write!(f, "failed({})", stage),
            other => f.write_str(other.as_str()),
        }
    }
}
