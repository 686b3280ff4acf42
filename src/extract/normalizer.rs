// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! HTML文本标准化
//!
//! 将任意（可能破损的）HTML转为按行排列的可见纯文本。行的顺序是后续
//! 区块定位逻辑的依据，必须保持页面原始顺序。

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static NOSCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<noscript[^>]*>.*?</noscript>").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:p|div|li|tr|td|h\d)[^>]*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{3000}]+").unwrap());

/// 将HTML标准化为换行分隔的纯文本
///
/// 返回 (标准化文本, 行列表)。对破损HTML做尽力而为的提取，不会失败。
pub fn normalize_html(html: &str) -> (String, Vec<String>) {
    let text = html_escape::decode_html_entities(html);
    // 移除script、style、noscript标签及其内容
    let text = SCRIPT_RE.replace_all(&text, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = NOSCRIPT_RE.replace_all(&text, "");
    // 将各种换行标签转为换行符
    let text = BR_RE.replace_all(&text, "\n");
    let text = BLOCK_TAG_RE.replace_all(&text, "\n");
    // 移除所有剩余HTML标签
    let text = TAG_RE.replace_all(&text, "");
    // 标准化空白字符
    let text = text.replace('\u{a0}', " ");

    let mut lines = Vec::new();
    for line in text.lines() {
        let cleaned = HSPACE_RE.replace_all(line, " ");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            lines.push(cleaned.to_string());
        }
    }
    (lines.join("\n"), lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_and_style() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = "<div>fake</div>";
            alert(1);</script></head>
            <body><p>考核信息</p><noscript>请开启JS</noscript></body></html>"#;
        let (text, lines) = normalize_html(html);
        assert!(text.contains("考核信息"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color"));
        assert!(!text.contains("请开启JS"));
        assert_eq!(lines, vec!["考核信息"]);
    }

    #[test]
    fn test_block_tags_become_lines() {
        let html = "<div>名称：新手考核</div><br>指标1：上传量<li>分享率</li>";
        let (_, lines) = normalize_html(html);
        assert_eq!(lines, vec!["名称：新手考核", "指标1：上传量", "分享率"]);
    }

    #[test]
    fn test_entities_and_whitespace() {
        let html = "<p>上传量&nbsp;&ge;&nbsp;100\u{3000}\u{3000}GB</p>";
        let (_, lines) = normalize_html(html);
        assert_eq!(lines, vec!["上传量 ≥ 100 GB"]);
    }

    #[test]
    fn test_malformed_html_degrades_gracefully() {
        let html = "<div><p>上传量：50 GB<table><tr><td>残缺";
        let (_, lines) = normalize_html(html);
        assert!(lines.iter().any(|l| l.contains("上传量")));
    }

    #[test]
    fn test_empty_lines_dropped_and_order_kept() {
        let html = "<p>  </p><p>甲</p><p></p><p>乙</p>";
        let (_, lines) = normalize_html(html);
        assert_eq!(lines, vec!["甲", "乙"]);
    }
}
