// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 状态解析
//!
//! 将自由文本、图标、百分比映射为三态通过/未通过/未知。
//! 检查顺序：图标 > 百分比 > 否定词表 > 肯定词表。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::rules::Rules;

static TRAILING_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[！!。．\.]+$").unwrap());
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

/// 解析状态文本，返回是否通过
///
/// 图标最可靠，最先检查；否定词表在肯定词表之前完整检查，
/// 保证"未通过"不会被其子串"通过"误判。无法判断返回`None`。
pub fn interpret_status(rules: &Rules, text: &str) -> Option<bool> {
    if text.is_empty() {
        return None;
    }

    let cleaned = TRAILING_PUNCT_RE.replace(text.trim(), "");
    let cleaned = cleaned.as_ref();

    // 1. 图标
    for icon in rules.fail_icons {
        if cleaned.contains(*icon) {
            return Some(false);
        }
    }
    for icon in rules.pass_icons {
        if cleaned.contains(*icon) {
            return Some(true);
        }
    }

    // 2. 百分比：100%及以上表示通过，孤立的0%表示未通过
    if let Some(caps) = PERCENT_RE.captures(cleaned) {
        if let Ok(percent) = caps[1].parse::<f64>() {
            if percent >= 100.0 {
                return Some(true);
            }
            if percent == 0.0 && cleaned.trim().chars().count() < 10 {
                return Some(false);
            }
        }
    }

    // 3. 关键词：否定词表全部检查完才轮到肯定词表
    let cleaned_lower = cleaned.to_lowercase();
    for keyword in rules.negative_status_keywords {
        if keyword_hit(cleaned, &cleaned_lower, keyword) {
            return Some(false);
        }
    }
    for keyword in rules.positive_status_keywords {
        if keyword_hit(cleaned, &cleaned_lower, keyword) {
            return Some(true);
        }
    }

    None
}

/// ASCII关键词不区分大小写，CJK关键词按原文匹配
fn keyword_hit(text: &str, text_lower: &str, keyword: &str) -> bool {
    if keyword.is_ascii() {
        text_lower.contains(keyword)
    } else {
        text.contains(keyword)
    }
}
