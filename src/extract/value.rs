// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 指标值解析
//!
//! 将自由文本值归一化为带量纲的浮点数：文件大小转为字节，时间转为小时，
//! 比率和积分保持原值。状态短语不是数值，返回`None`。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::rules::Rules;
use crate::extract::status::interpret_status;

/// 比较/阈值前缀，解析数值前剥除
const VALUE_PREFIXES: &[&str] = &[
    "≥", ">=", ">", "≤", "<=", "<", "不少于", "至少", "最少", "不低于", "不少於", "不低於",
    "需要", "需達", "需达", "要求", "还需", "還需", "仍需",
];

/// 数值+单位
static NUMBER_UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d,.]+)\s*([A-Za-z\p{Han}]*)").unwrap());

/// 复合时间格式 "3天5小时"、"1周2天"
static COMPOUND_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(\d+)\s*(?:年|years?))?\s*(?:(\d+)\s*(?:个月|個月|月|months?))?\s*(?:(\d+)\s*(?:周|週|weeks?))?\s*(?:(\d+)\s*(?:天|日|days?))?\s*(?:(\d+)\s*(?:小时|小時|时|時|hours?|hrs?))?\s*(?:(\d+)\s*(?:分钟|分鐘|分|minutes?|mins?))?",
    )
    .unwrap()
});

/// 当前/要求比值 "100 GB / 500 GB"、"548 / 10000"
static RATIO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d,.]+)\s*([A-Za-z]*)\s*/\s*([\d,.]+)\s*([A-Za-z]*)").unwrap());

/// 百分比
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d.]+)\s*%").unwrap());

/// 解析指标数值，统一转换为标准单位
///
/// - 文件大小转为字节，十进制/二进制写法都按1024进制
/// - 时间转为小时（支持复合格式 "X天Y小时"）
/// - 比率/积分等无单位值保持原样
///
/// 状态文本（"已通过"等）返回`None`。
pub fn parse_metric_value(rules: &Rules, value: &str) -> Option<f64> {
    let mut value = value.trim();
    if value.is_empty() {
        return None;
    }

    // 状态文本不是数值
    if interpret_status(rules, value).is_some() {
        return None;
    }

    for prefix in VALUE_PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            value = rest.trim_start();
            break;
        }
    }

    // 复合时间格式优先
    if let Some(hours) = parse_compound_hours(value) {
        return Some(hours);
    }

    let caps = NUMBER_UNIT_RE.captures(value)?;
    let num: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    if unit.is_empty() {
        return Some(num);
    }

    let unit_upper = unit.to_uppercase();

    for (u, factor) in rules.size_units {
        if unit_upper == *u {
            return Some(num * factor);
        }
    }

    for (u, factor) in rules.time_units {
        if unit == *u || unit_upper == *u {
            return Some(num * factor);
        }
    }
    for (u, factor) in rules.time_units {
        if unit.contains(u) {
            return Some(num * factor);
        }
    }

    // 未知单位，返回原值
    Some(num)
}

/// 解析复合时间格式，返回小时数
///
/// 至少要有两个时间单位才视为复合时间（单一单位走普通的数值+单位路径）
pub fn parse_compound_hours(value: &str) -> Option<f64> {
    let caps = COMPOUND_TIME_RE.captures(value)?;

    let get = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let years = get(1);
    let months = get(2);
    let weeks = get(3);
    let days = get(4);
    let hours = get(5);
    let minutes = get(6);

    let units = [years, months, weeks, days, hours, minutes]
        .iter()
        .filter(|v| **v > 0)
        .count();
    if units < 2 {
        return None;
    }

    let total = years as f64 * 365.0 * 24.0
        + months as f64 * 30.0 * 24.0
        + weeks as f64 * 7.0 * 24.0
        + days as f64 * 24.0
        + hours as f64
        + minutes as f64 / 60.0;

    (total > 0.0).then_some(total)
}

/// 比值解析结果
#[derive(Debug, Clone)]
pub struct RatioValue {
    /// 当前值文本
    pub current: String,
    /// 要求值文本
    pub required: Option<String>,
    /// 是否通过
    pub passed: Option<bool>,
}

/// 解析"当前/要求"、百分比或状态文本
///
/// 支持 "100 GB / 500 GB"、"50%"、"已通过" 等形式
pub fn parse_ratio_value(rules: &Rules, value: &str) -> Option<RatioValue> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = RATIO_RE.captures(value) {
        let cur_val = caps.get(1).map(|m| m.as_str().replace(',', "")).unwrap_or_default();
        let cur_unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let req_val = caps.get(3).map(|m| m.as_str().replace(',', "")).unwrap_or_default();
        let req_unit = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        let current = format!("{} {}", cur_val, cur_unit).trim().to_string();
        let required = format!("{} {}", req_val, req_unit).trim().to_string();

        let passed = match (cur_val.parse::<f64>(), req_val.parse::<f64>()) {
            (Ok(c), Ok(r)) => Some(c >= r),
            _ => None,
        };

        return Some(RatioValue {
            current,
            required: Some(required),
            passed,
        });
    }

    if let Some(caps) = PERCENT_RE.captures(value) {
        if let Ok(percent) = caps[1].parse::<f64>() {
            return Some(RatioValue {
                current: format!("{}%", percent),
                required: Some("100%".to_string()),
                passed: Some(percent >= 100.0),
            });
        }
    }

    if let Some(passed) = interpret_status(rules, value) {
        return Some(RatioValue {
            current: value.to_string(),
            required: None,
            passed: Some(passed),
        });
    }

    None
}
