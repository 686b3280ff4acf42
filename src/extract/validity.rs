// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 指标名称与指标值的有效性过滤
//!
//! 启发式的正则分类，作为可插拔谓词暴露：严格模式走白名单，
//! 宽松模式只要求命中指标类型关键词，两者都先过黑名单。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::rules::Rules;

/// 种子标题特征（分辨率、编码、集数等）
static TITLE_PATTERN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\d{4}p|BluRay|Blu-ray|WEB-DL|REMUX|HDR|H\.26[45]|HEVC|AVC|DTS|AAC|FLAC|Atmos|导演|主演|类别|字幕|国语|國語|中字|第\d+季|全\d+集|S\d{2}|E\d{2}|\d{4}[-/]\d{2}[-/]\d{2}",
    )
    .unwrap()
});

/// 版块/帖子特征
static BOARD_PATTERN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)版[块塊]|Feedback|Appeal|Record|问题反馈|备案").unwrap());

/// 站点统计特征
static STAT_PATTERN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)访问用户|訪問用戶|注册用户|註冊用戶|今日|本周|当前|總|Peasant|User|Elite|Crazy|Insane|Veteran|Extreme|Ultimate|Master",
    )
    .unwrap()
});

/// 纯数字（允许千分位逗号）
static PURE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d,]+$").unwrap());

/// 有效指标值特征：比值、状态词、"还需"描述
static VALID_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/|已通过|通過|合格|達標|达标|未通过|未通過|不合格|未達標|未达标|还需|還需|仍需|需要|^\s*[\d,.]+\s*[A-Za-z]+\s*$")
        .unwrap()
});

/// 数值+单位（含百分号）
static NUMBER_UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d,.]+\s*[A-Za-z%]+$").unwrap());

/// 检查是否是有效的指标名称
///
/// `strict` 为真时要求名称精确匹配白名单（或以白名单项开头/结尾），
/// 为假时只要求命中任一指标类型关键词。两种模式都先检查长度与黑名单。
pub fn is_metric_name(rules: &Rules, name: &str, strict: bool) -> bool {
    if name.is_empty() {
        return false;
    }

    // 考核指标名称通常很短
    if name.chars().count() > 10 {
        return false;
    }

    let name_lower = name.to_lowercase();
    for pattern in rules.invalid_metric_patterns {
        if name_lower.contains(&pattern.to_lowercase()) {
            return false;
        }
    }

    if strict {
        let squeezed: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        for valid in rules.valid_metric_names {
            if name == *valid || squeezed == *valid {
                return true;
            }
        }
        for valid in rules.valid_metric_names {
            if name.starts_with(valid) || name.ends_with(valid) {
                return true;
            }
        }
        return false;
    }

    for (_, keywords) in rules.metric_keywords {
        for kw in *keywords {
            if name_lower.contains(&kw.to_lowercase()) {
                return true;
            }
        }
    }
    false
}

/// 检查是否是有效的指标值
///
/// 排除种子标题、版块帖子、站点统计等噪声；接受比值、状态词、
/// "还需X"描述和带单位的数值。
pub fn is_valid_metric_value(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }

    if value.chars().count() > 100 {
        return false;
    }

    if TITLE_PATTERN_RE.is_match(value) {
        return false;
    }
    if BOARD_PATTERN_RE.is_match(value) {
        return false;
    }
    if STAT_PATTERN_RE.is_match(value) {
        return false;
    }

    // 无单位的大数字通常是站点统计而非考核指标
    let squeezed: String = value.chars().filter(|c| *c != ' ').collect();
    if PURE_NUMBER_RE.is_match(&squeezed) {
        if let Ok(num) = squeezed.replace(',', "").parse::<f64>() {
            if num > 1000.0 {
                return false;
            }
        }
    }

    if VALID_VALUE_RE.is_match(value) {
        return true;
    }

    NUMBER_UNIT_RE.is_match(value.trim())
}

/// 检查文本是否包含任一指标关键词
pub fn contains_metric_keyword(rules: &Rules, text: &str) -> bool {
    let text_lower = text.to_lowercase();
    for (_, keywords) in rules.metric_keywords {
        for kw in *keywords {
            if text_lower.contains(&kw.to_lowercase()) {
                return true;
            }
        }
    }
    false
}
