// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 单个考核指标
///
/// `passed` 为三态：`Some(true)` 通过、`Some(false)` 未通过、`None` 未知。
/// 指标只有在名称非空且 current/required/passed 至少一项有值时才会保留。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// 指标名称
    pub name: String,
    /// 指标序号（来自"指标N"声明）
    pub index: Option<u32>,
    /// 要求值（原始文本）
    pub required: Option<String>,
    /// 当前值（原始文本）
    pub current: Option<String>,
    /// 是否通过
    pub passed: Option<bool>,
}

impl Metric {
    /// 指标是否携带有效信号
    pub fn has_signal(&self) -> bool {
        !self.name.is_empty()
            && (self.current.is_some() || self.required.is_some() || self.passed.is_some())
    }
}

/// 一次考核：名称、起止时间与指标集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// 考核名称
    pub name: String,
    /// 开始时间（原始文本）
    pub start_time: Option<String>,
    /// 结束时间（原始文本）
    pub end_time: Option<String>,
    /// 考核指标
    pub metrics: Vec<Metric>,
}

/// 考核整体状态
///
/// 未检测到考核的站点不产生结果，因此没有 unknown 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// 已通过
    Completed,
    /// 考核中
    InProgress,
    /// 未通过（已过期且有指标未达标）
    Failed,
}

/// 单站点考核结果
///
/// 每次刷新整体构建一次，构建后不再修改，只会被下一次刷新整体替换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteAssessmentResult {
    /// 站点ID
    pub site_id: i64,
    /// 站点名称
    pub site_name: String,
    /// 整体状态
    pub status: AssessmentStatus,
    /// 整体进度 0.0 ~ 1.0
    pub progress: f64,
    /// 剩余天数，负数表示已过期
    pub remaining_days: Option<i64>,
    /// 指标摘要
    pub message: String,
}
