// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核信息提取
//!
//! 从站点首页HTML提取考核结构的完整流水线：
//! 归一化 -> 定位考核区块 -> 时间窗口 -> 行/表格指标提取 -> 合并。

pub mod line_metrics;
pub mod locator;
pub mod normalizer;
pub mod result;
pub mod rules;
pub mod status;
pub mod table_metrics;
pub mod tables;
pub mod validity;
pub mod value;

use tracing::debug;

use crate::domain::models::{Assessment, Metric};
use crate::extract::rules::Rules;

/// 考核信息提取器
///
/// 持有解析规则上下文，对单个页面HTML产出结构化考核信息
#[derive(Debug, Clone, Default)]
pub struct AssessmentExtractor {
    rules: Rules,
}

impl AssessmentExtractor {
    pub fn new(rules: Rules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// 从页面HTML提取考核信息
    ///
    /// 页面不含考核内容或提取不到任何指标时返回`None`
    pub fn extract(&self, html: &str) -> Option<Assessment> {
        // title属性和相对倒计时藏在标签里，要在去标签前提取
        let title_end_time = locator::extract_title_end_time(html);
        let relative_end_time = locator::extract_relative_end_time(&self.rules, html);

        let (_, lines) = normalizer::normalize_html(html);

        let (name, name_line) = locator::locate_assessment(&self.rules, &lines)?;
        debug!(assessment = %name, line = name_line, "定位到考核区块");

        let block_end = locator::find_block_end(&self.rules, &lines, name_line);
        let block = &lines[name_line..block_end];

        // 时间来源优先级：显式时间范围 > title属性 > 相对倒计时
        let (start_time, explicit_end) = locator::extract_time_range(block);
        let end_time = explicit_end.or(title_end_time).or(relative_end_time);

        let line_metrics = line_metrics::extract_line_metrics(&self.rules, block);
        let page_tables = tables::extract_tables(html);
        let table_metrics = table_metrics::extract_table_metrics(&self.rules, &page_tables);

        let mut metrics = if line_metrics.is_empty() && table_metrics.is_empty() {
            // 两条主路径都落空时，在区块内放宽名称要求再扫一遍
            self.generic_fallback(block)
        } else {
            table_metrics::merge_metrics(line_metrics, table_metrics)
        };
        metrics.retain(|m| m.has_signal());

        if metrics.is_empty() {
            debug!(assessment = %name, "考核区块内未提取到任何指标");
            return None;
        }

        Some(Assessment {
            name,
            start_time,
            end_time,
            metrics,
        })
    }

    /// 通用回退：宽松名称校验的"名称：值"/"名称 值"行扫描
    fn generic_fallback(&self, block: &[String]) -> Vec<Metric> {
        let mut metrics = Vec::new();

        for line in block {
            if !validity::contains_metric_keyword(&self.rules, line) {
                continue;
            }
            let Some((name, value)) = split_name_value(line) else {
                continue;
            };
            if !validity::is_metric_name(&self.rules, name, false) {
                continue;
            }
            if !validity::is_valid_metric_value(value) {
                continue;
            }

            let (required, current, passed) = match value::parse_ratio_value(&self.rules, value) {
                Some(ratio) => (ratio.required, Some(ratio.current), ratio.passed),
                None => (Some(value.to_string()), None, None),
            };

            metrics.push(Metric {
                name: name.to_string(),
                index: None,
                required,
                current,
                passed,
            });
        }
        metrics
    }
}

fn split_name_value(line: &str) -> Option<(&str, &str)> {
    let idx = line
        .find(['：', ':'])
        .or_else(|| line.find(' '))?;
    let (name, rest) = line.split_at(idx);
    let value = rest.trim_start_matches(['：', ':', ' ']).trim();
    let name = name.trim();
    (!name.is_empty() && !value.is_empty()).then_some((name, value))
}
