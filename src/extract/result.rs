// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核结果推导
//!
//! 从提取到的考核结构推导完成状态、总体进度与剩余天数，
//! 并生成一条可读的汇总消息。

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::models::{Assessment, AssessmentStatus, Metric, SiteAssessmentResult};
use crate::extract::rules::Rules;
use crate::extract::status::interpret_status;
use crate::extract::value::parse_metric_value;

/// 当前值含数字或明确状态词才算有效观测
static OBSERVED_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d|已通过|通過|合格|未通过|未通過|不合格").unwrap());

/// 占位符当前值
const PLACEHOLDER_VALUES: &[&str] = &["-", "--", "—", ""];

/// 从考核结构推导站点考核结果
///
/// 所有指标都没有有效观测值时返回`None`，防止名称误检产生空结果。
/// 观测值检查只是产出门槛，状态、进度与消息仍覆盖全部指标。
pub fn build_result(
    rules: &Rules,
    site_id: i64,
    site_name: &str,
    assessment: &Assessment,
) -> Option<SiteAssessmentResult> {
    if !assessment.metrics.iter().any(is_observed) {
        debug!(assessment = %assessment.name, "所有指标均无有效观测值，不产生结果");
        return None;
    }

    let reconciled: Vec<(String, Option<String>, Option<String>, Option<bool>)> = assessment
        .metrics
        .iter()
        .map(|m| {
            (
                m.name.clone(),
                m.required.clone(),
                m.current.clone(),
                reconcile_passed(rules, m),
            )
        })
        .collect();

    let progress = overall_progress(rules, &reconciled);
    let remaining_days = assessment
        .end_time
        .as_deref()
        .and_then(|end| remaining_days_until(rules, end));

    let all_passed = !reconciled.is_empty() && reconciled.iter().all(|(_, _, _, p)| *p == Some(true));
    let any_failed = reconciled.iter().any(|(_, _, _, p)| *p == Some(false));

    let status = if all_passed {
        AssessmentStatus::Completed
    } else if matches!(remaining_days, Some(d) if d < 0) {
        if any_failed {
            AssessmentStatus::Failed
        } else {
            AssessmentStatus::Completed
        }
    } else {
        AssessmentStatus::InProgress
    };

    let message = build_message(&assessment.name, &reconciled);

    Some(SiteAssessmentResult {
        site_id,
        site_name: site_name.to_string(),
        status,
        progress,
        remaining_days,
        message,
    })
}

/// 当前值缺失、是占位符或无数字无状态词时视为未观测
fn is_observed(metric: &Metric) -> bool {
    metric.current.as_deref().is_some_and(|current| {
        let current = current.trim();
        !PLACEHOLDER_VALUES.contains(&current) && OBSERVED_VALUE_RE.is_match(current)
    })
}

/// 校正通过状态
///
/// 已有状态优先；否则先从当前值文本解读状态，再做数值比较
fn reconcile_passed(rules: &Rules, metric: &Metric) -> Option<bool> {
    if metric.passed.is_some() {
        return metric.passed;
    }

    if let Some(current) = metric.current.as_deref() {
        if let Some(passed) = interpret_status(rules, current) {
            return Some(passed);
        }
    }

    if let (Some(current), Some(required)) = (metric.current.as_deref(), metric.required.as_deref())
    {
        if let (Some(c), Some(r)) = (
            parse_metric_value(rules, current),
            parse_metric_value(rules, required),
        ) {
            if r > 0.0 {
                return Some(c >= r);
            }
        }
    }

    None
}

/// 计算总体进度（各指标进度的算术平均）
fn overall_progress(
    rules: &Rules,
    metrics: &[(String, Option<String>, Option<String>, Option<bool>)],
) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }

    let sum: f64 = metrics
        .iter()
        .map(|(_, required, current, passed)| metric_progress(rules, required.as_deref(), current.as_deref(), *passed))
        .sum();
    sum / metrics.len() as f64
}

/// 单个指标的进度估算
///
/// 已通过按1.0；当前/要求都可解析按比例（封顶1.0）；
/// 未通过但有数据按部分进度常量；完全无法估算按0.0
fn metric_progress(
    rules: &Rules,
    required: Option<&str>,
    current: Option<&str>,
    passed: Option<bool>,
) -> f64 {
    if passed == Some(true) {
        return 1.0;
    }

    let cur = current.and_then(|v| parse_metric_value(rules, v));
    let req = required.and_then(|v| parse_metric_value(rules, v));

    if let (Some(c), Some(r)) = (cur, req) {
        if r > 0.0 {
            return (c / r).min(1.0);
        }
        return if c >= 0.0 { 1.0 } else { 0.0 };
    }

    match passed {
        Some(false) => {
            if cur.map(|c| c > 0.0).unwrap_or(false) {
                rules.partial_progress_with_data
            } else {
                rules.partial_progress_without_data
            }
        }
        _ => 0.0,
    }
}

/// 计算距截止时间的剩余天数
///
/// 不足一天按一天计；已过期返回负数。返回`None`表示时间无法解析。
pub fn remaining_days_until(rules: &Rules, end_time: &str) -> Option<i64> {
    let end = parse_local_datetime(rules, end_time)?;
    let now = Utc::now().with_timezone(&rules.timezone);

    let delta = end.signed_duration_since(now);
    let total_seconds = delta.num_seconds();
    let days = total_seconds.div_euclid(86400);
    let leftover = total_seconds.rem_euclid(86400);

    if leftover > 0 && days >= 0 {
        Some(days + 1)
    } else {
        Some(days)
    }
}

/// 按时区解析时间文本
///
/// `/`分隔统一替换为`-`后按格式表依次尝试，最后尝试纯日期
fn parse_local_datetime(rules: &Rules, text: &str) -> Option<chrono::DateTime<Tz>> {
    let normalized = text.trim().replace('/', "-");

    for format in rules.datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return resolve_local(rules.timezone, dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
            return resolve_local(rules.timezone, date.and_hms_opt(0, 0, 0)?);
        }
    }
    None
}

fn resolve_local(tz: Tz, dt: NaiveDateTime) -> Option<chrono::DateTime<Tz>> {
    tz.from_local_datetime(&dt).earliest()
}

/// 生成汇总消息："[考核名] 指标: 当前/要求 ✓ | ..."，缺失字段用"-"占位
fn build_message(
    assessment_name: &str,
    metrics: &[(String, Option<String>, Option<String>, Option<bool>)],
) -> String {
    let parts: Vec<String> = metrics
        .iter()
        .map(|(name, required, current, passed)| {
            let mark = match passed {
                Some(true) => "✓",
                Some(false) => "✗",
                None => "?",
            };
            let current = current.as_deref().unwrap_or("-");
            let required = required.as_deref().unwrap_or("-");
            format!("{}: {}/{} {}", name, current, required, mark)
        })
        .collect();

    if parts.is_empty() {
        format!("[{}]", assessment_name)
    } else {
        format!("[{}] {}", assessment_name, parts.join(" | "))
    }
}
