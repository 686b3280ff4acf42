// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 行级指标提取
//!
//! 在考核区块内逐行尝试五种模式，首个命中者消费该行。
//! "指标N：..."模式会打开一个累积中的指标，后续行交给详情解析器填充，
//! 直到下一个模式命中或区块结束时显式冲刷。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::Metric;
use crate::extract::rules::Rules;
use crate::extract::status::interpret_status;
use crate::extract::validity::{is_metric_name, is_valid_metric_value};
use crate::extract::value::parse_metric_value;

/// 模式3：标准格式 "指标1：上传量"
static METRIC_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?:考核)?(?:指[标標]|项目|項目|条件|條件))\s*(?P<index>\d+)?[：:]\s*(?P<name>[^,，。；;]+)")
        .unwrap()
});

/// 模式5：简单格式 "上传量：已通过"
static SIMPLE_METRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>\p{Han}{2,8})[：:]\s*(?P<value>.+)$").unwrap());

/// 模式4：列表格式 "• 上传量 100GB" / "1. 做种时间 ≥ 100小时"
static LIST_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[•·●○◆◇★☆\-\*]|\d+[\.、\)])\s*(?P<name>\p{Han}{2,8})\s*[:：]?\s*(?P<value>.+)$")
        .unwrap()
});

/// 模式1：进度格式 "上传量: 50.5GB / 100GB (50.5%)"
static PROGRESS_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<name>\p{Han}{2,8})\s*[:：]\s*(?P<current>[\d,.]+\s*[A-Za-z]*)\s*/\s*(?P<required>[\d,.]+\s*[A-Za-z]*)(?:\s*\((?P<percent>[\d.]+)\s*%\))?",
    )
    .unwrap()
});

/// 模式2：状态格式 "✓ 上传量已达标"
static STATUS_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<icon>[✓✔√☑✅✗✘×☒❌])\s*(?P<name>\p{Han}{2,8})\s*(?P<status>.*)$").unwrap()
});

/// 跳过的行：倒计时、提示、站点统计、种子标题、投票、公告等
static SKIP_RE: Lazy<Regex> = Lazy::new(|| {
    let patterns = [
        r"[离離距].+(?:考核|结束|結束)",
        r"(?:通过|透過)捐[赠贈]",
        r"温馨提示|溫馨提示",
        r"(?:如有|若有)(?:疑问|疑問)",
        r"考核(?:时间|時間|期间|期間)",
        r"注意[：:]",
        r"请保持|請保持",
        r"也可以通过|也可以透過",
        r"访问用户|訪問用戶|注册用户|註冊用戶",
        r"今日访问|本周访问|当前访问",
        r"种子总|總上传|總下载|总数据",
        r"Peasant|Power User|Elite User|Crazy User|Insane User|Veteran User|Extreme User|Ultimate User|Nexus Master",
        r"贵宾|捐赠者|被警告|被禁用户",
        r"男生|女生",
        r"断种|斷種|同伴|Tracker",
        r"版[块塊]|Feedback|Appeal|Record",
        r"问题反馈|备案",
        r"\d{4}p|BluRay|WEB-DL|REMUX|H\.26[45]",
        r"导演|主演|类别|字幕",
        r"弃权|棄權|是，|否，",
        r"招聘|解封|申诉|QQ群|TG群",
        r"开注时间|发邀时间",
    ];
    Regex::new(&format!("(?i){}", patterns.join("|"))).unwrap()
});

/// 要求/当前/结果标签片段
static REQ_CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:要求|需要|目標|目标|標準|标准)[：:]\s*(?P<value>.+)").unwrap());
static CUR_CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:当前|當前|目前)[：:]\s*(?P<value>.+)").unwrap());
static RESULT_CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:結果|结果)[：:]\s*(?P<value>.+)").unwrap());

/// 保留千分位逗号时的标签片段（值在中文逗号或下一个标签前截断）
static REQ_CHUNK_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:要求|需要|目標|目标|標準|标准)[：:]\s*(?P<value>[^，]+?)(?:\s*，\s*)?(?:(?:当前|當前|目前|結果|结果)[：:].*)?$").unwrap()
});
static CUR_CHUNK_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:当前|當前|目前)[：:]\s*(?P<value>[^，]+?)(?:\s*，\s*)?(?:(?:結果|结果|要求)[：:].*)?$").unwrap()
});
static RESULT_CHUNK_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:結果|结果)[：:]\s*(?P<value>[^，]+)").unwrap());

/// 分隔详情片段的中英文逗号、分号
static CHUNK_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[，,；;]+").unwrap());

/// 状态关键词简写
static PASSED_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"已通过|通過|合格|達標|达标").unwrap());
static NEED_MORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:还需要|還需要|仍需|需再?)\s*([\d.]+)\s*([A-Za-z]+)?").unwrap()
});
static FAILED_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"未通过|未通過|不合格|未達標|未达标").unwrap());
static RATIO_IN_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d,.]+)\s*([A-Za-z]*)\s*/\s*([\d,.]+)\s*([A-Za-z]*)").unwrap());

/// 千分位逗号需要保留的指标（大数值的时间类指标）
const PRESERVE_COMMA_KEYWORDS: &[&str] = &[
    "做种时间",
    "做種時間",
    "保种时间",
    "保種時間",
    "做种时长",
    "做種時長",
    "平均做种",
    "平均做種",
    "seed time",
    "seeding time",
    "average seed",
];

/// 在考核区块行上提取指标
///
/// 按模式优先级逐行匹配；最后过滤掉没有有效信号的指标
pub fn extract_line_metrics(rules: &Rules, lines: &[String]) -> Vec<Metric> {
    let mut metrics: Vec<Metric> = Vec::new();
    let mut open_metric: Option<Metric> = None;

    for line in lines {
        // 跳过URL与噪声行
        if line.contains("://") || line.starts_with("http") {
            continue;
        }
        if SKIP_RE.is_match(line) {
            continue;
        }

        // 1. 进度格式（最精确）
        if let Some(caps) = PROGRESS_METRIC_RE.captures(line) {
            if is_metric_name(rules, caps["name"].trim(), true) {
                flush(&mut metrics, &mut open_metric);

                let current = caps["current"].trim().to_string();
                let required = caps["required"].trim().to_string();
                let passed = match (
                    parse_metric_value(rules, &current),
                    parse_metric_value(rules, &required),
                ) {
                    (Some(c), Some(r)) if r > 0.0 => Some(c >= r),
                    _ => None,
                };

                metrics.push(Metric {
                    name: caps["name"].trim().to_string(),
                    index: None,
                    required: Some(required),
                    current: Some(current),
                    passed,
                });
                continue;
            }
        }

        // 2. 图标+状态格式
        if let Some(caps) = STATUS_METRIC_RE.captures(line) {
            if is_metric_name(rules, caps["name"].trim(), true) {
                flush(&mut metrics, &mut open_metric);

                let passed = matches!(&caps["icon"], "✓" | "✔" | "√" | "☑" | "✅");
                let status_text = caps["status"].trim();
                let current = if status_text.is_empty() {
                    if passed { "已通过" } else { "未通过" }.to_string()
                } else {
                    status_text.to_string()
                };

                metrics.push(Metric {
                    name: caps["name"].trim().to_string(),
                    index: None,
                    required: None,
                    current: Some(current),
                    passed: Some(passed),
                });
                continue;
            }
        }

        // 3. 标准格式：打开一个累积中的指标
        if let Some(caps) = METRIC_HEADER_RE.captures(line) {
            flush(&mut metrics, &mut open_metric);

            let mut metric = Metric {
                name: caps["name"].trim().to_string(),
                index: caps.name("index").and_then(|m| m.as_str().parse().ok()),
                required: None,
                current: None,
                passed: None,
            };
            let remainder = &line[caps.get(0).unwrap().end()..];
            parse_metric_details(rules, &mut metric, remainder);
            open_metric = Some(metric);
            continue;
        }

        // 4. 列表格式
        if let Some(caps) = LIST_METRIC_RE.captures(line) {
            if is_metric_name(rules, caps["name"].trim(), true) {
                flush(&mut metrics, &mut open_metric);
                if let Some(metric) =
                    parse_simple_metric(rules, caps["name"].trim(), caps["value"].trim())
                {
                    metrics.push(metric);
                }
                continue;
            }
        }

        // 5. 简单格式
        if let Some(caps) = SIMPLE_METRIC_RE.captures(line) {
            if is_metric_name(rules, caps["name"].trim(), true) {
                flush(&mut metrics, &mut open_metric);
                if let Some(metric) =
                    parse_simple_metric(rules, caps["name"].trim(), caps["value"].trim())
                {
                    metrics.push(metric);
                }
                continue;
            }
        }

        // 6. 继续填充当前打开的指标
        if let Some(metric) = open_metric.as_mut() {
            parse_metric_details(rules, metric, line);
        }
    }

    flush(&mut metrics, &mut open_metric);

    metrics
        .into_iter()
        .filter(|m| m.has_signal() && is_metric_name(rules, &m.name, true))
        .collect()
}

/// 冲刷累积中的指标
fn flush(metrics: &mut Vec<Metric>, open_metric: &mut Option<Metric>) {
    if let Some(metric) = open_metric.take() {
        metrics.push(metric);
    }
}

/// 解析简单格式指标（如"上传量：已通过"、"上传量：还需要 97.60 GB"）
pub fn parse_simple_metric(rules: &Rules, name: &str, value: &str) -> Option<Metric> {
    if !is_metric_name(rules, name, true) {
        return None;
    }
    if !is_valid_metric_value(value) {
        return None;
    }

    let mut metric = Metric {
        name: name.trim().to_string(),
        ..Default::default()
    };
    let value = value.trim();

    if PASSED_TEXT_RE.is_match(value) && !FAILED_TEXT_RE.is_match(value) {
        metric.passed = Some(true);
        metric.current = Some("已通过".to_string());
        return Some(metric);
    }

    if let Some(caps) = NEED_MORE_RE.captures(value) {
        metric.passed = Some(false);
        let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        metric.current = Some(format!("还需 {} {}", &caps[1], unit).trim().to_string());
        return Some(metric);
    }

    if FAILED_TEXT_RE.is_match(value) {
        metric.passed = Some(false);
        metric.current = Some("未通过".to_string());
        return Some(metric);
    }

    // "当前值 / 要求值" 格式，用单位换算后比较
    if let Some(caps) = RATIO_IN_VALUE_RE.captures(value) {
        let current = format!("{} {}", caps[1].replace(',', ""), &caps[2])
            .trim()
            .to_string();
        let required = format!("{} {}", caps[3].replace(',', ""), &caps[4])
            .trim()
            .to_string();

        let passed = match (
            parse_metric_value(rules, &current),
            parse_metric_value(rules, &required),
        ) {
            (Some(c), Some(r)) if r > 0.0 => Some(c >= r),
            _ => match (
                caps[1].replace(',', "").parse::<f64>(),
                caps[3].replace(',', "").parse::<f64>(),
            ) {
                (Ok(c), Ok(r)) => Some(c >= r),
                _ => None,
            },
        };

        metric.current = Some(current);
        metric.required = Some(required);
        metric.passed = passed;
        return Some(metric);
    }

    None
}

/// 判断指标值是否需要保留英文逗号（千分位）
///
/// 时间类指标常见 "3,202.78 小时" 这样的千分位数值，
/// 若按英文逗号分片会把数字截断
fn should_preserve_comma(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    PRESERVE_COMMA_KEYWORDS
        .iter()
        .any(|kw| name_lower.contains(&kw.to_lowercase()))
}

/// 解析指标详情（要求、当前值、结果）
///
/// 普通指标按中英文逗号/分号分片；时间类指标只按中文逗号分隔，
/// 保留数字内的千分位英文逗号。
pub fn parse_metric_details(rules: &Rules, metric: &mut Metric, text: &str) {
    if should_preserve_comma(&metric.name) {
        if metric.required.is_none() {
            if let Some(caps) = REQ_CHUNK_COMMA_RE.captures(text) {
                metric.required = Some(caps["value"].trim().to_string());
            }
        }
        if metric.current.is_none() {
            if let Some(caps) = CUR_CHUNK_COMMA_RE.captures(text) {
                metric.current = Some(caps["value"].trim().to_string());
            }
        }
        if metric.passed.is_none() {
            if let Some(caps) = RESULT_CHUNK_COMMA_RE.captures(text) {
                metric.passed = interpret_status(rules, caps["value"].trim());
            } else {
                metric.passed = interpret_status(rules, text);
            }
        }
        return;
    }

    for chunk in CHUNK_SPLIT_RE.split(text) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        if metric.required.is_none() {
            if let Some(caps) = REQ_CHUNK_RE.captures(chunk) {
                metric.required = Some(caps["value"].trim().to_string());
                continue;
            }
        }
        if metric.current.is_none() {
            if let Some(caps) = CUR_CHUNK_RE.captures(chunk) {
                metric.current = Some(caps["value"].trim().to_string());
                continue;
            }
        }
        if metric.passed.is_none() {
            if let Some(caps) = RESULT_CHUNK_RE.captures(chunk) {
                metric.passed = interpret_status(rules, caps["value"].trim());
                continue;
            }
        }
    }

    if metric.passed.is_none() {
        metric.passed = interpret_status(rules, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Rules {
        Rules::default()
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_structured_metric_single_line() {
        let r = rules();
        let ls = lines(&["指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.name, "上传量");
        assert_eq!(m.index, Some(1));
        assert_eq!(m.required.as_deref(), Some("100 GB"));
        assert_eq!(m.current.as_deref(), Some("50 GB"));
        assert_eq!(m.passed, Some(false));
    }

    #[test]
    fn test_structured_metric_continuation_lines() {
        let r = rules();
        let ls = lines(&["指标2：分享率", "要求：1.5", "当前：2.0", "结果：通过"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "分享率");
        assert_eq!(metrics[0].index, Some(2));
        assert_eq!(metrics[0].required.as_deref(), Some("1.5"));
        assert_eq!(metrics[0].current.as_deref(), Some("2.0"));
        assert_eq!(metrics[0].passed, Some(true));
    }

    #[test]
    fn test_progress_pattern() {
        let r = rules();
        let ls = lines(&["上传量: 50.5GB / 100GB (50.5%)"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].current.as_deref(), Some("50.5GB"));
        assert_eq!(metrics[0].required.as_deref(), Some("100GB"));
        assert_eq!(metrics[0].passed, Some(false));
    }

    #[test]
    fn test_icon_pattern() {
        let r = rules();
        let ls = lines(&["✓ 上传量已达标", "✗ 做种时间"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].passed, Some(true));
        assert_eq!(metrics[1].passed, Some(false));
        assert_eq!(metrics[1].current.as_deref(), Some("未通过"));
    }

    #[test]
    fn test_simple_pattern_with_need_more() {
        let r = rules();
        let ls = lines(&["上传量： 还需要 97.60 GB"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].passed, Some(false));
        assert_eq!(metrics[0].current.as_deref(), Some("还需 97.60 GB"));
    }

    #[test]
    fn test_list_pattern() {
        let r = rules();
        let ls = lines(&["• 上传量 0.00 KB / 100.00 GB"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].required.as_deref(), Some("100.00 GB"));
        assert_eq!(metrics[0].passed, Some(false));
    }

    #[test]
    fn test_seedtime_preserves_thousands_comma() {
        let r = rules();
        let ls = lines(&["指标3：做种时间，要求：3,000 小时，当前：3,202.78 小时，结果：通过"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].required.as_deref(), Some("3,000 小时"));
        assert_eq!(metrics[0].current.as_deref(), Some("3,202.78 小时"));
        assert_eq!(metrics[0].passed, Some(true));
    }

    #[test]
    fn test_skip_lines_discarded() {
        let r = rules();
        let ls = lines(&[
            "离考核结束还有 3 天",
            "温馨提示：请保持在线",
            "https://example.com/rules",
            "注册用户：52,341",
        ]);
        assert!(extract_line_metrics(&r, &ls).is_empty());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let r = rules();
        let ls = lines(&["注册用户： 52,341 / 100,000"]);
        assert!(extract_line_metrics(&r, &ls).is_empty());
    }

    #[test]
    fn test_open_metric_flushed_at_end() {
        let r = rules();
        let ls = lines(&["指标1：上传量", "要求：100 GB"]);
        let metrics = extract_line_metrics(&r, &ls);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].required.as_deref(), Some("100 GB"));
    }
}
