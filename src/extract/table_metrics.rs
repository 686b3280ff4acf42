// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 表格指标提取
//!
//! 站点常用表格布局呈现考核指标：横向表（表头+数据行）、
//! 纵向表（名称/值两列）。先判断表格是否与考核相关，
//! 再按表头关键词建立列映射，逐行生成指标。

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::models::Metric;
use crate::extract::rules::Rules;
use crate::extract::status::interpret_status;
use crate::extract::tables::TableMatrix;
use crate::extract::validity::{contains_metric_keyword, is_metric_name, is_valid_metric_value};
use crate::extract::value::{parse_metric_value, parse_ratio_value};

/// 表头列语义关键词
const NAME_HEADER_KEYWORDS: &[&str] = &[
    "指标", "指標", "项目", "項目", "名称", "名稱", "内容", "內容", "条件", "條件", "metric",
    "item", "name",
];
const REQUIRED_HEADER_KEYWORDS: &[&str] = &[
    "要求", "需要", "目标", "目標", "标准", "標準", "需达", "需達", "required", "target", "goal",
];
const CURRENT_HEADER_KEYWORDS: &[&str] = &[
    "当前", "當前", "目前", "现值", "現值", "进度", "進度", "current", "progress",
];
const STATUS_HEADER_KEYWORDS: &[&str] = &[
    "结果", "結果", "状态", "狀態", "是否", "通过", "通過", "达标", "達標", "status", "result",
];

static NORMALIZE_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s：:\-_]+").unwrap());

/// 繁简映射（指标名称常用字）
const TRAD_SIMP_PAIRS: &[(char, char)] = &[
    ('傳', '传'),
    ('種', '种'),
    ('時', '时'),
    ('間', '间'),
    ('積', '积'),
    ('數', '数'),
    ('標', '标'),
    ('達', '达'),
];

/// 列映射：各语义列的下标
#[derive(Debug, Default, Clone)]
struct ColumnMapping {
    name: Option<usize>,
    /// 名称列由表头关键词命中（而非默认第0列）
    name_from_header: bool,
    required: Option<usize>,
    current: Option<usize>,
    status: Option<usize>,
}

impl ColumnMapping {
    /// 语义列计数，默认兜底的名称列不计入
    fn concept_count(&self) -> usize {
        usize::from(self.name_from_header)
            + [self.required, self.current, self.status]
                .iter()
                .filter(|c| c.is_some())
                .count()
    }
}

/// 在页面全部表格中提取考核指标
///
/// 只处理与考核相关的表格；横向布局优先，失败后尝试纵向布局，
/// 最后退化为通用行扫描
pub fn extract_table_metrics(rules: &Rules, tables: &[TableMatrix]) -> Vec<Metric> {
    let mut metrics = Vec::new();

    for table in tables {
        if !is_assessment_table(rules, table) {
            continue;
        }

        let mut found = extract_horizontal(rules, table);
        if found.is_empty() {
            found = extract_vertical(rules, table);
        }
        if found.is_empty() {
            found = extract_generic_rows(rules, table);
        }

        debug!(rows = table.len(), metrics = found.len(), "表格指标提取完成");
        metrics.extend(found);
    }

    metrics
}

/// 判断表格是否与考核相关
///
/// 任一单元格包含考核关键词或指标关键词，或表头能映射出至少两个语义列
fn is_assessment_table(rules: &Rules, table: &TableMatrix) -> bool {
    for row in table {
        for cell in row {
            let cell_lower = cell.to_lowercase();
            for kw in rules.assessment_keywords {
                if cell_lower.contains(&kw.to_lowercase()) {
                    return true;
                }
            }
            if contains_metric_keyword(rules, cell) {
                return true;
            }
        }
    }

    table
        .first()
        .map(|header| detect_column_mapping(header).concept_count() >= 2)
        .unwrap_or(false)
}

/// 根据表头行建立列映射
///
/// 名称列找不到时默认第0列
fn detect_column_mapping(header: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for (idx, cell) in header.iter().enumerate() {
        let cell_lower = cell.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|kw| cell_lower.contains(&kw.to_lowercase()));

        if mapping.name.is_none() && hit(NAME_HEADER_KEYWORDS) {
            mapping.name = Some(idx);
            mapping.name_from_header = true;
        } else if mapping.required.is_none() && hit(REQUIRED_HEADER_KEYWORDS) {
            mapping.required = Some(idx);
        } else if mapping.current.is_none() && hit(CURRENT_HEADER_KEYWORDS) {
            mapping.current = Some(idx);
        } else if mapping.status.is_none() && hit(STATUS_HEADER_KEYWORDS) {
            mapping.status = Some(idx);
        }
    }

    if mapping.name.is_none() {
        mapping.name = Some(0);
    }
    mapping
}

/// 横向布局：首行为表头，其余为数据行
fn extract_horizontal(rules: &Rules, table: &TableMatrix) -> Vec<Metric> {
    let Some(header) = table.first() else {
        return Vec::new();
    };
    let mapping = detect_column_mapping(header);
    if mapping.concept_count() < 2 {
        return Vec::new();
    }

    table
        .iter()
        .skip(1)
        .filter_map(|row| create_metric_from_row(rules, &mapping, row))
        .collect()
}

/// 纵向布局：每行"名称 | 值"两列
///
/// 要求至少70%的行恰好两列，避免把复杂表格误判为纵向布局
fn extract_vertical(rules: &Rules, table: &TableMatrix) -> Vec<Metric> {
    if table.is_empty() {
        return Vec::new();
    }

    let two_cell_rows = table.iter().filter(|row| row.len() == 2).count();
    if (two_cell_rows as f64) < table.len() as f64 * 0.7 {
        return Vec::new();
    }

    let mut metrics = Vec::new();
    for row in table {
        if row.len() != 2 {
            continue;
        }
        let name = row[0].trim();
        let value = row[1].trim();

        if !is_metric_name(rules, name, true) {
            continue;
        }
        if !is_valid_metric_value(value) {
            continue;
        }

        if let Some(ratio) = parse_ratio_value(rules, value) {
            metrics.push(Metric {
                name: name.to_string(),
                index: None,
                required: ratio.required,
                current: Some(ratio.current),
                passed: ratio.passed,
            });
        } else {
            // 裸值按当前观测值处理，通过状态从值文本解读
            metrics.push(Metric {
                name: name.to_string(),
                index: None,
                required: None,
                current: Some(value.to_string()),
                passed: interpret_status(rules, value),
            });
        }
    }
    metrics
}

/// 通用行扫描：逐行找"有效名称 + 有效值"的单元格对
fn extract_generic_rows(rules: &Rules, table: &TableMatrix) -> Vec<Metric> {
    let mut metrics = Vec::new();

    for row in table {
        if row.len() < 2 {
            continue;
        }
        for window in row.windows(2) {
            let name = window[0].trim();
            let value = window[1].trim();
            // 无表头信息可依据，名称必须过白名单
            if !is_metric_name(rules, name, true) {
                continue;
            }
            if !is_valid_metric_value(value) {
                continue;
            }

            let (required, current, passed) = match parse_ratio_value(rules, value) {
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
            break;
        }
    }
    metrics
}

/// 从数据行生成指标
fn create_metric_from_row(rules: &Rules, mapping: &ColumnMapping, row: &[String]) -> Option<Metric> {
    let cell = |idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| row.get(i))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    };

    let name = cell(mapping.name)?;
    if !is_metric_name(rules, &name, true) {
        return None;
    }

    let mut required = cell(mapping.required);
    let mut current = cell(mapping.current);
    let status_text = cell(mapping.status);

    // 未映射为语义列的单元格中可能藏着"当前/要求"比值
    if current.is_none() {
        let mapped: Vec<usize> = [mapping.name, mapping.required, mapping.current, mapping.status]
            .iter()
            .flatten()
            .copied()
            .collect();
        for (idx, value) in row.iter().enumerate() {
            if mapped.contains(&idx) {
                continue;
            }
            if let Some(ratio) = parse_ratio_value(rules, value) {
                current = Some(ratio.current);
                if required.is_none() {
                    required = ratio.required;
                }
                break;
            }
        }
    }

    // 通过状态推断链：状态列文本 > 当前值状态文本 > 数值比较
    let mut passed = status_text.as_deref().and_then(|t| interpret_status(rules, t));
    if passed.is_none() {
        if let Some(cur) = current.as_deref() {
            passed = interpret_status(rules, cur);
        }
    }
    if passed.is_none() {
        if let (Some(cur), Some(req)) = (current.as_deref(), required.as_deref()) {
            if let (Some(c), Some(r)) = (parse_metric_value(rules, cur), parse_metric_value(rules, req)) {
                if r > 0.0 {
                    passed = Some(c >= r);
                }
            }
        }
    }

    let metric = Metric {
        name,
        index: None,
        required,
        current,
        passed,
    };
    metric.has_signal().then_some(metric)
}

/// 归一化指标名称用于合并去重
///
/// 小写、去空白与标点、繁体常用字转简体
pub fn normalize_metric_name(name: &str) -> String {
    let stripped = NORMALIZE_STRIP_RE.replace_all(name, "").to_lowercase();
    stripped
        .chars()
        .map(|c| {
            TRAD_SIMP_PAIRS
                .iter()
                .find(|(trad, _)| *trad == c)
                .map(|(_, simp)| *simp)
                .unwrap_or(c)
        })
        .collect()
}

/// 合并行提取与表格提取的结果
///
/// 同名指标优先取表格版本（结构化来源更可靠），行版本回填缺失字段
pub fn merge_metrics(line_metrics: Vec<Metric>, table_metrics: Vec<Metric>) -> Vec<Metric> {
    let mut merged: Vec<Metric> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for metric in table_metrics {
        let key = normalize_metric_name(&metric.name);
        if let Some(&pos) = index.get(&key) {
            backfill(&mut merged[pos], metric);
        } else {
            index.insert(key, merged.len());
            merged.push(metric);
        }
    }

    for metric in line_metrics {
        let key = normalize_metric_name(&metric.name);
        if let Some(&pos) = index.get(&key) {
            backfill(&mut merged[pos], metric);
        } else {
            index.insert(key, merged.len());
            merged.push(metric);
        }
    }

    merged
}

fn backfill(target: &mut Metric, source: Metric) {
    if target.required.is_none() {
        target.required = source.required;
    }
    if target.current.is_none() {
        target.current = source.current;
    }
    if target.passed.is_none() {
        target.passed = source.passed;
    }
    if target.index.is_none() {
        target.index = source.index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Rules {
        Rules::default()
    }

    fn matrix(rows: &[&[&str]]) -> TableMatrix {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_horizontal_table() {
        let r = rules();
        let table = matrix(&[
            &["指标", "要求", "当前", "结果"],
            &["魔力", "1000", "1500", "通过"],
            &["上传量", "100 GB", "50 GB", "未通过"],
        ]);
        let metrics = extract_table_metrics(&r, &[table]);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "魔力");
        assert_eq!(metrics[0].passed, Some(true));
        assert_eq!(metrics[1].passed, Some(false));
    }

    #[test]
    fn test_horizontal_numeric_inference() {
        let r = rules();
        let table = matrix(&[
            &["新手考核指标", "要求", "当前"],
            &["做种时间", "100 小时", "120 小时"],
        ]);
        let metrics = extract_table_metrics(&r, &[table]);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].passed, Some(true));
    }

    #[test]
    fn test_vertical_table() {
        let r = rules();
        let table = matrix(&[
            &["新手考核", ""],
            &["上传量", "50 GB / 100 GB"],
            &["分享率", "已通过"],
        ]);
        let metrics = extract_table_metrics(&r, &[table]);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].current.as_deref(), Some("50 GB"));
        assert_eq!(metrics[0].passed, Some(false));
        assert_eq!(metrics[1].passed, Some(true));
    }

    #[test]
    fn test_vertical_table_bare_value_is_current() {
        let r = rules();
        let table = matrix(&[
            &["新手考核", ""],
            &["上传量", "100 GB"],
            &["做种体积", "500 GB"],
        ]);
        let metrics = extract_table_metrics(&r, &[table]);
        assert_eq!(metrics.len(), 2);
        // 非比值/状态的裸值是观测值，不是要求值
        assert_eq!(metrics[0].current.as_deref(), Some("100 GB"));
        assert!(metrics[0].required.is_none());
        assert_eq!(metrics[1].current.as_deref(), Some("500 GB"));
    }

    #[test]
    fn test_two_column_header_counts_name_concept() {
        let r = rules();
        let table = matrix(&[
            &["指标", "结果"],
            &["上传量", "通过"],
        ]);
        let metrics = extract_table_metrics(&r, &[table]);
        assert_eq!(metrics.len(), 1);
        // 名称+结果两列已构成横向布局，表头行不被当作数据
        assert_eq!(metrics[0].passed, Some(true));
        assert!(metrics[0].current.is_none());
    }

    #[test]
    fn test_generic_rows_require_whitelisted_names() {
        let r = rules();
        let table = matrix(&[
            &["新手考核进度"],
            &["做种", "120 GB", "正常"],
        ]);
        // "做种"只命中类型关键词，不在白名单内，通用行扫描不得接受
        assert!(extract_table_metrics(&r, &[table]).is_empty());
    }

    #[test]
    fn test_unrelated_table_skipped() {
        let r = rules();
        let table = matrix(&[
            &["电影名", "大小"],
            &["Movie.2024.1080p.BluRay", "12 GB"],
        ]);
        assert!(extract_table_metrics(&r, &[table]).is_empty());
    }

    #[test]
    fn test_invalid_row_name_rejected() {
        let r = rules();
        let table = matrix(&[
            &["指标", "要求", "当前"],
            &["注册用户", "100,000", "52,341"],
        ]);
        assert!(extract_table_metrics(&r, &[table]).is_empty());
    }

    #[test]
    fn test_normalize_metric_name() {
        assert_eq!(normalize_metric_name("上傳量"), "上传量");
        assert_eq!(normalize_metric_name("做種 時間："), "做种时间");
        assert_eq!(normalize_metric_name("Share Ratio"), "shareratio");
    }

    #[test]
    fn test_merge_prefers_table_and_backfills() {
        let line = vec![Metric {
            name: "上传量".into(),
            index: Some(1),
            required: Some("100 GB".into()),
            current: None,
            passed: None,
        }];
        let table = vec![Metric {
            name: "上傳量".into(),
            index: None,
            required: None,
            current: Some("50 GB".into()),
            passed: Some(false),
        }];
        let merged = merge_metrics(line, table);
        assert_eq!(merged.len(), 1);
        // 表格版本在前，行版本回填要求值
        assert_eq!(merged[0].name, "上傳量");
        assert_eq!(merged[0].required.as_deref(), Some("100 GB"));
        assert_eq!(merged[0].current.as_deref(), Some("50 GB"));
        assert_eq!(merged[0].passed, Some(false));
        assert_eq!(merged[0].index, Some(1));
    }
}
