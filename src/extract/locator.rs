// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核区块定位
//!
//! 在标准化文本行中定位考核名称与区块边界，并从多种来源提取考核的
//! 起止时间（显式时间范围、title属性、相对倒计时）。

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extract::rules::Rules;

/// 区块最大向后搜索行数
const MAX_BLOCK_LINES: usize = 50;

/// 排除模式：提示用户开启考核的文本，不是正在进行的考核
static EXCLUDE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:用户|用戶)?(?:开启|開啟|启动|啟動|进入|進入|申请|申請|参加|參加).*?考核").unwrap(),
        Regex::new(r"(?i)考核.*?(?:开启|開啟|启动|啟動|申请|申請|入口|链接|鏈接)").unwrap(),
        Regex::new(r"(?i)(?:点击|點擊|click).*?考核").unwrap(),
    ]
});

/// 模式1：标准名称声明 "名称：xxx" / "考核项目：xxx"
static NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^名[称稱][：:]\s*(?P<value>.+)").unwrap(),
        Regex::new(r"(?i)(?:考核|任[务務])?(?:名[称稱字]|项目|項目)[：:]\s*(?P<value>.+)").unwrap(),
        Regex::new(r"(?i)(?:当前|當前)?考核[：:]\s*(?P<value>.+)").unwrap(),
    ]
});

/// 模式2：倒计时 "离xxx考核结束还有"
static COUNTDOWN_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)[离離距](?P<name>.+?)考核(?:结束|結束)").unwrap(),
        Regex::new(r"(?i)[离離距](?P<name>.+?)(?:结束|結束|到期)").unwrap(),
    ]
});

/// 模式3：标题 "【xxx考核】" / "★考核信息★"
static TITLE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)[【\[「『](?P<name>[^】\]」』]*?考核[^】\]」』]*)[】\]」』]").unwrap(),
        Regex::new(r"(?i)[【\[「『](?P<name>(?:新手|新人|养成|試用|试用|观察|養成|觀察)[^】\]」』]*)[】\]」』]").unwrap(),
        Regex::new(r"(?i)[★☆▶►◆◇](?P<name>[^★☆▶►◆◇]*?考核[^★☆▶►◆◇]*)[★☆▶►◆◇]").unwrap(),
    ]
});

/// 模式4：独立考核类型 "新手考核" / "养成期"
static STANDALONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^(?P<name>(?:新手|新人|保[号號]|活[跃躍]度?|做[种種]|上[传傳]|魔力|养成|養成|试用|試用|观察|觀察)考核)(?:[：:\s]|$)").unwrap(),
        Regex::new(r"(?i)^(?P<name>(?:养成|養成|试用|試用|观察|觀察|新手|probation|trial)期?)(?:[：:\s]|$)").unwrap(),
    ]
});

/// 模式5：包含"考核"且带指标特征的行
static INDICATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)考核.{0,20}(?:指[标標]|要求|目[标標]|任[务務])").unwrap());

/// 中文考核类型短语
static CJK_ASSESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{Han}+考核)").unwrap());
static CJK_SHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Han}{2,6}(?:考核|任务|任務|期))").unwrap());

/// 新考核区块的标题特征（用于判断上一个区块已结束）
static BLOCK_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[【\[「『].*考核.*[】\]」』]").unwrap());
static BLOCK_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:新手|养成|試用|试用)").unwrap());

/// 日期范围 "2024-01-01 ~ 2024-02-01"
static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    let date = r"\d{4}[./-]\d{1,2}[./-]\d{1,2}(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?";
    Regex::new(&format!(r"({date})\s*(?:~|～|至|到|—|-)\s*({date})")).unwrap()
});

/// 时间触发关键词
static TIME_TRIGGER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^[时時][间間][：:]").unwrap(),
        Regex::new(r"(?i)(?:考核)?(?:[时時][间間]|期[間间]|周期|期限)").unwrap(),
    ]
});

/// title属性中的结束时间
static TITLE_TIME_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)(?:考核|结束|結束|還有|还有).{0,200}title\s*=\s*["'](\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})["']"#).unwrap()
});
static TITLE_TIME_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)title\s*=\s*["'](\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})["'].{0,200}(?:考核|结束|結束|還有|还有)"#).unwrap()
});
static TITLE_TIME_LOOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"title\s*=\s*["'](\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})["']"#).unwrap()
});

/// 相对时间 "还有3天5小时"
static RELATIVE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:还有|還有|剩余|剩餘|距[离離]?\S*?(?:结束|結束|到期)?\S*?(?:还有|還有)?)\s*(?:(\d+)\s*(?:年|years?))?\s*(?:(\d+)\s*(?:个月|個月|月|months?))?\s*(?:(\d+)\s*(?:周|週|weeks?))?\s*(?:(\d+)\s*(?:天|日|days?))?\s*(?:(\d+)\s*(?:小时|小時|时|時|hours?|hrs?))?\s*(?:(\d+)\s*(?:分钟|分鐘|分|minutes?|mins?))?",
    )
    .unwrap()
});

/// 提取考核名称，返回 (名称, 行索引)
///
/// 多级匹配策略按优先级逐行尝试；匹配排除模式的行整体跳过。
/// 未找到任何考核返回`None`，调用方应静默跳过该站点。
pub fn locate_assessment(rules: &Rules, lines: &[String]) -> Option<(String, usize)> {
    let excluded = |text: &str| EXCLUDE_RES.iter().any(|re| re.is_match(text));

    for (i, line) in lines.iter().enumerate() {
        if excluded(line) {
            continue;
        }

        // 1. 标准名称格式
        for re in NAME_RES.iter() {
            if let Some(caps) = re.captures(line) {
                let value = caps["value"].trim().to_string();
                if excluded(&value) {
                    continue;
                }
                return Some((value, i));
            }
        }

        // 2. 倒计时格式
        for re in COUNTDOWN_RES.iter() {
            if let Some(caps) = re.captures(line) {
                let mut name = caps["name"].trim().to_string();
                if !name.ends_with("考核")
                    && !name.ends_with("任务")
                    && !name.ends_with("任務")
                    && !name.ends_with('期')
                {
                    name.push_str("考核");
                }
                return Some((name, i));
            }
        }

        // 3. 标题格式
        for re in TITLE_RES.iter() {
            if let Some(caps) = re.captures(line) {
                let name = caps["name"].trim().to_string();
                if excluded(&name) {
                    continue;
                }
                return Some((name, i));
            }
        }

        // 4. 独立考核类型
        for re in STANDALONE_RES.iter() {
            if let Some(caps) = re.captures(line) {
                return Some((caps["name"].trim().to_string(), i));
            }
        }
    }

    // 5. 指标特征定位
    for (i, line) in lines.iter().enumerate() {
        if excluded(line) {
            continue;
        }
        if INDICATOR_RE.is_match(line) {
            if let Some(caps) = CJK_ASSESS_RE.captures(line) {
                let name = caps[1].to_string();
                if excluded(&name) {
                    continue;
                }
                return Some((name, i));
            }
            return Some(("站点考核".to_string(), i));
        }
    }

    // 6. 关键词兜底
    for (i, line) in lines.iter().enumerate() {
        if excluded(line) {
            continue;
        }
        let line_lower = line.to_lowercase();
        for keyword in rules.assessment_keywords {
            if line_lower.contains(&keyword.to_lowercase()) {
                if let Some(caps) = CJK_SHORT_RE.captures(line) {
                    return Some((caps[1].to_string(), i));
                }
                return Some(((*keyword).to_string(), i));
            }
        }
    }

    None
}

/// 查找考核区块的结束位置
///
/// 从起始行向后最多搜索50行，遇到结束标记或新的考核标题即终止
pub fn find_block_end(rules: &Rules, lines: &[String], start: usize) -> usize {
    let max_range = (start + MAX_BLOCK_LINES).min(lines.len());

    for (i, line) in lines.iter().enumerate().take(max_range).skip(start + 1) {
        for marker in rules.end_markers {
            if line.contains(marker) {
                debug!(line = i, marker, "找到考核区块结束标记");
                return i;
            }
        }

        // 新的考核标题说明上一个区块已结束
        if line.contains("考核") && i > start + 3 {
            if BLOCK_TITLE_RE.is_match(line) {
                return i;
            }
            if BLOCK_PREFIX_RE.is_match(line) {
                return i;
            }
        }
    }

    max_range
}

/// 从区块行中提取时间范围
///
/// 优先匹配带触发关键词的行，其次直接匹配日期范围
pub fn extract_time_range(lines: &[String]) -> (Option<String>, Option<String>) {
    for line in lines {
        if !TIME_TRIGGER_RES.iter().any(|re| re.is_match(line)) {
            continue;
        }
        if let Some(caps) = DATE_RANGE_RE.captures(line) {
            return (
                Some(caps[1].trim().to_string()),
                Some(caps[2].trim().to_string()),
            );
        }
    }

    for line in lines {
        if let Some(caps) = DATE_RANGE_RE.captures(line) {
            return (
                Some(caps[1].trim().to_string()),
                Some(caps[2].trim().to_string()),
            );
        }
    }

    (None, None)
}

/// 从HTML的title属性中提取结束时间
///
/// 倒计时控件常把绝对时间放在title属性里。先找关键词邻近的，
/// 再退化为任意title属性中的日期时间。
pub fn extract_title_end_time(html: &str) -> Option<String> {
    if let Some(caps) = TITLE_TIME_AFTER_RE.captures(html) {
        debug!(time = &caps[1], "从title属性提取结束时间（关键词在前）");
        return Some(caps[1].to_string());
    }
    if let Some(caps) = TITLE_TIME_BEFORE_RE.captures(html) {
        debug!(time = &caps[1], "从title属性提取结束时间（关键词在后）");
        return Some(caps[1].to_string());
    }
    if let Some(caps) = TITLE_TIME_LOOSE_RE.captures(html) {
        debug!(time = &caps[1], "从title属性提取结束时间（宽松）");
        return Some(caps[1].to_string());
    }
    None
}

/// 从HTML中提取相对时间并换算为绝对结束时间
///
/// 支持 "还有3天5小时"、"剩余10天" 等，按配置时区的当前时间推算
pub fn extract_relative_end_time(rules: &Rules, html: &str) -> Option<String> {
    let caps = RELATIVE_TIME_RE.captures(html)?;

    let get = |i: usize| -> i64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };
    let years = get(1);
    let months = get(2);
    let weeks = get(3);
    let days = get(4);
    let hours = get(5);
    let minutes = get(6);

    if years + months + weeks + days + hours + minutes == 0 {
        return None;
    }

    let now = Utc::now().with_timezone(&rules.timezone);
    let end = now
        + Duration::days(years * 365 + months * 30 + weeks * 7 + days)
        + Duration::hours(hours)
        + Duration::minutes(minutes);
    Some(end.format("%Y-%m-%d %H:%M:%S").to_string())
}
